use std::sync::Arc;

use sandbox_manifest::{
    DefinitionResolver,
    catalog::{AmmoType, DamageType, Rarity, WeaponSlot, WeaponType},
    definitions::InventoryItemDefinition,
};

use crate::domain::{
    ItemHash, RepoCreateError, RepoError, RepoUpdateError, WeaponRowId, builder::EntityBuilder,
};

#[derive(Clone, Debug, PartialEq)]
pub struct Weapon {
    pub item_hash: ItemHash,
    pub name: String,
    pub weapon_type: WeaponType,
    pub ammo_type: AmmoType,
    pub slot: WeaponSlot,
    pub damage_type: DamageType,
    pub rarity: Rarity,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StoredWeapon {
    pub row_id: WeaponRowId,
    pub weapon: Weapon,
}

#[async_trait::async_trait]
pub trait WeaponRepository {
    async fn find_by_hash(&self, item_hash: ItemHash) -> Result<Option<StoredWeapon>, RepoError>;
    async fn insert_weapon(&self, weapon: &Weapon) -> Result<(), RepoCreateError>;
    async fn update_weapon(&self, weapon: &Weapon) -> Result<(), RepoUpdateError>;
}

pub struct WeaponBuilder {
    resolver: Arc<DefinitionResolver>,
    item_hash: ItemHash,
}

impl WeaponBuilder {
    pub fn new(resolver: Arc<DefinitionResolver>, item_hash: ItemHash) -> Self {
        Self {
            resolver,
            item_hash,
        }
    }

    pub fn resolve(&self) -> Option<Weapon> {
        let definition: InventoryItemDefinition = self.resolver.resolve(self.item_hash.0)?;
        let equipping = definition.equipping_block.as_ref()?;

        Some(Weapon {
            item_hash: self.item_hash,
            weapon_type: WeaponType::from_display_name(
                definition.item_type_display_name.as_deref()?,
            )?,
            ammo_type: AmmoType::from_code(equipping.ammo_type?)?,
            slot: WeaponSlot::from_code(equipping.equipment_slot_type_hash)?,
            damage_type: DamageType::from_code(*definition.damage_types.first()?)?,
            rarity: Rarity::from_tier_display_name(
                definition.item_type_and_tier_display_name.as_deref()?,
            )?,
            name: definition.display_properties.name,
        })
    }
}

#[async_trait::async_trait]
impl EntityBuilder for WeaponBuilder {
    type Output = Weapon;

    async fn build(&self) -> Option<Weapon> {
        let weapon = self.resolve();
        if weapon.is_none() {
            log::warn!("Weapon {} could not be resolved", self.item_hash);
        }
        weapon
    }
}
