use std::sync::Arc;

use sandbox_manifest::{
    DefinitionResolver,
    catalog::{ArmorSlot, Rarity},
    definitions::InventoryItemDefinition,
};

use crate::domain::{
    ArmorRowId, ItemHash, RepoCreateError, RepoError, RepoUpdateError, builder::EntityBuilder,
};

#[derive(Clone, Debug, PartialEq)]
pub struct Armor {
    pub item_hash: ItemHash,
    pub name: String,
    pub slot: ArmorSlot,
    pub rarity: Rarity,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StoredArmor {
    pub row_id: ArmorRowId,
    pub armor: Armor,
}

#[async_trait::async_trait]
pub trait ArmorRepository {
    async fn find_by_hash(&self, item_hash: ItemHash) -> Result<Option<StoredArmor>, RepoError>;
    async fn insert_armor(&self, armor: &Armor) -> Result<(), RepoCreateError>;
    async fn update_armor(&self, armor: &Armor) -> Result<(), RepoUpdateError>;
}

pub struct ArmorBuilder {
    resolver: Arc<DefinitionResolver>,
    item_hash: ItemHash,
}

impl ArmorBuilder {
    pub fn new(resolver: Arc<DefinitionResolver>, item_hash: ItemHash) -> Self {
        Self {
            resolver,
            item_hash,
        }
    }

    pub fn resolve(&self) -> Option<Armor> {
        let definition: InventoryItemDefinition = self.resolver.resolve(self.item_hash.0)?;
        let equipping = definition.equipping_block.as_ref()?;

        Some(Armor {
            item_hash: self.item_hash,
            slot: ArmorSlot::from_code(equipping.equipment_slot_type_hash)?,
            rarity: Rarity::from_tier_display_name(
                definition.item_type_and_tier_display_name.as_deref()?,
            )?,
            name: definition.display_properties.name,
        })
    }
}

#[async_trait::async_trait]
impl EntityBuilder for ArmorBuilder {
    type Output = Armor;

    async fn build(&self) -> Option<Armor> {
        let armor = self.resolve();
        if armor.is_none() {
            log::warn!("Armor {} could not be resolved", self.item_hash);
        }
        armor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ResolverFixture, armor_definition};

    #[tokio::test]
    async fn test_armor_builder_resolves_slot_and_rarity() {
        let resolver = ResolverFixture::new()
            .item(
                4_000_000_000,
                armor_definition("Celestial Nighthawk", "Exotic Helmet", 3448274439),
            )
            .build();

        let armor = ArmorBuilder::new(resolver, ItemHash(4_000_000_000))
            .build()
            .await
            .unwrap();
        assert_eq!(armor.name, "Celestial Nighthawk");
        assert_eq!(armor.slot, ArmorSlot::Helmet);
        assert_eq!(armor.rarity, Rarity::Exotic);
    }

    #[tokio::test]
    async fn test_weapon_slot_is_not_an_armor_slot() {
        let resolver = ResolverFixture::new()
            .item(77, armor_definition("Odd Piece", "Legendary Helmet", 1498876634))
            .build();
        assert!(ArmorBuilder::new(resolver, ItemHash(77)).build().await.is_none());
    }
}
