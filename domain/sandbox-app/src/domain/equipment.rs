use std::sync::Arc;

use sandbox_manifest::{
    DefinitionResolver,
    catalog::{ArmorSlot, WeaponSlot},
    definitions::{
        InventoryItemDefinition, STAT_CHARGE_TIME, STAT_ROUNDS_PER_MINUTE, STAT_SWING_SPEED,
    },
};

use crate::domain::{
    ArmorRowId, CharacterId, CharacterRowId, ItemHash, RepoCreateError, RepoError, WeaponRowId,
    armor::Armor, builder::EntityBuilder, weapon::Weapon,
};

#[derive(Clone, Debug, PartialEq)]
pub struct EquippedWeapon {
    pub item_hash: ItemHash,
    pub character_id: CharacterId,
    pub slot: WeaponSlot,
    pub main_stat: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EquippedArmor {
    pub item_hash: ItemHash,
    pub character_id: CharacterId,
    pub slot: ArmorSlot,
}

#[async_trait::async_trait]
pub trait EquipmentRepository {
    async fn insert_equipped_weapon(
        &self,
        character: CharacterRowId,
        weapon: WeaponRowId,
        equipped: &EquippedWeapon,
    ) -> Result<(), RepoCreateError>;
    async fn insert_equipped_armor(
        &self,
        character: CharacterRowId,
        armor: ArmorRowId,
        equipped: &EquippedArmor,
    ) -> Result<(), RepoCreateError>;
    async fn list_equipped_weapons(
        &self,
        character: CharacterRowId,
    ) -> Result<Vec<(WeaponRowId, EquippedWeapon)>, RepoError>;
    async fn list_equipped_armor(
        &self,
        character: CharacterRowId,
    ) -> Result<Vec<(ArmorRowId, EquippedArmor)>, RepoError>;
}

/// Main stat shown for an equipped weapon. The unit depends on the weapon
/// category: charge time for fusion rifles, swing speed for swords and
/// rounds per minute for everything else.
pub fn main_stat(weapon: &Weapon, definition: &InventoryItemDefinition) -> Option<String> {
    if weapon.weapon_type.is_fusion_class() {
        Some(format!("{}ms", definition.stat_value(STAT_CHARGE_TIME)?))
    } else if weapon.weapon_type.is_sword_class() {
        Some(format!(
            "{} swing speed",
            definition.stat_value(STAT_SWING_SPEED)?
        ))
    } else {
        Some(format!(
            "{}rpm",
            definition.stat_value(STAT_ROUNDS_PER_MINUTE)?
        ))
    }
}

pub struct EquippedWeaponBuilder {
    resolver: Arc<DefinitionResolver>,
    weapon: Weapon,
    character_id: CharacterId,
}

impl EquippedWeaponBuilder {
    pub fn new(
        resolver: Arc<DefinitionResolver>,
        weapon: Weapon,
        character_id: CharacterId,
    ) -> Self {
        Self {
            resolver,
            weapon,
            character_id,
        }
    }
}

#[async_trait::async_trait]
impl EntityBuilder for EquippedWeaponBuilder {
    type Output = EquippedWeapon;

    async fn build(&self) -> Option<EquippedWeapon> {
        let definition: InventoryItemDefinition =
            self.resolver.resolve(self.weapon.item_hash.0)?;
        let slot_hash = definition.equipping_block.as_ref()?.equipment_slot_type_hash;
        let slot = WeaponSlot::from_code(slot_hash)?;
        let Some(main_stat) = main_stat(&self.weapon, &definition) else {
            log::warn!(
                "Weapon {} has no main stat for {}",
                self.weapon.item_hash,
                self.weapon.weapon_type
            );
            return None;
        };

        Some(EquippedWeapon {
            item_hash: self.weapon.item_hash,
            character_id: self.character_id,
            slot,
            main_stat,
        })
    }
}

pub struct EquippedArmorBuilder {
    resolver: Arc<DefinitionResolver>,
    armor: Armor,
    character_id: CharacterId,
}

impl EquippedArmorBuilder {
    pub fn new(resolver: Arc<DefinitionResolver>, armor: Armor, character_id: CharacterId) -> Self {
        Self {
            resolver,
            armor,
            character_id,
        }
    }
}

#[async_trait::async_trait]
impl EntityBuilder for EquippedArmorBuilder {
    type Output = EquippedArmor;

    async fn build(&self) -> Option<EquippedArmor> {
        let definition: InventoryItemDefinition = self.resolver.resolve(self.armor.item_hash.0)?;
        Some(EquippedArmor {
            item_hash: self.armor.item_hash,
            character_id: self.character_id,
            slot: ArmorSlot::from_code(definition.equipping_block?.equipment_slot_type_hash)?,
        })
    }
}
