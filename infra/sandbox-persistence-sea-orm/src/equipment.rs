use sandbox_app::domain::{
    ArmorRowId, CharacterId, CharacterRowId, ItemHash, RepoCreateError, RepoError, WeaponRowId,
    equipment::{EquipmentRepository, EquippedArmor, EquippedWeapon},
};
use sandbox_manifest::catalog::{ArmorSlot, WeaponSlot};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::{
    commands::{InsertCommand, SelectCommand},
    entity::{armor, character, equipped_armor, equipped_weapon, weapon},
    stored_hash, stored_name,
};

/// Rows of `equipped_weapons` and `equipped_armor`. Both are unique on
/// (character row, item row).
pub struct EquipmentRepositoryImpl {
    db: DatabaseConnection,
}

impl EquipmentRepositoryImpl {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn character_id(&self, character: CharacterRowId) -> Result<CharacterId, RepoError> {
        SelectCommand::<character::Entity>::new()
            .filter_eq(character::Column::CharacterId, character.0)
            .first(&self.db)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))?
            .map(|model| CharacterId(model.bng_character_id))
            .ok_or_else(|| RepoError::StorageError(format!("No character row {}", character.0)))
    }
}

#[async_trait::async_trait]
impl EquipmentRepository for EquipmentRepositoryImpl {
    async fn insert_equipped_weapon(
        &self,
        character: CharacterRowId,
        weapon: WeaponRowId,
        equipped: &EquippedWeapon,
    ) -> Result<(), RepoCreateError> {
        let model = equipped_weapon::ActiveModel {
            character_id: Set(character.0),
            weapon_id: Set(weapon.0),
            slot_type: Set(equipped.slot.name().to_string()),
            main_stat: Set(equipped.main_stat.clone()),
            ..Default::default()
        };
        let inserted = InsertCommand::new(model)
            .unique_on([
                equipped_weapon::Column::CharacterId,
                equipped_weapon::Column::WeaponId,
            ])
            .execute(&self.db)
            .await
            .map_err(|e| RepoCreateError::StorageError(e.to_string()))?;
        if !inserted {
            return Err(RepoCreateError::Conflict);
        }
        Ok(())
    }

    async fn insert_equipped_armor(
        &self,
        character: CharacterRowId,
        armor: ArmorRowId,
        equipped: &EquippedArmor,
    ) -> Result<(), RepoCreateError> {
        let model = equipped_armor::ActiveModel {
            character_id: Set(character.0),
            armor_id: Set(armor.0),
            slot_type: Set(equipped.slot.name().to_string()),
            ..Default::default()
        };
        let inserted = InsertCommand::new(model)
            .unique_on([
                equipped_armor::Column::CharacterId,
                equipped_armor::Column::ArmorId,
            ])
            .execute(&self.db)
            .await
            .map_err(|e| RepoCreateError::StorageError(e.to_string()))?;
        if !inserted {
            return Err(RepoCreateError::Conflict);
        }
        Ok(())
    }

    async fn list_equipped_weapons(
        &self,
        character: CharacterRowId,
    ) -> Result<Vec<(WeaponRowId, EquippedWeapon)>, RepoError> {
        let character_id = self.character_id(character).await?;
        let rows = equipped_weapon::Entity::find()
            .filter(equipped_weapon::Column::CharacterId.eq(character.0))
            .find_also_related(weapon::Entity)
            .all(&self.db)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))?;
        rows.into_iter()
            .map(|(equipped, weapon)| {
                let weapon = weapon.ok_or_else(|| {
                    RepoError::StorageError(format!("No weapon row {}", equipped.weapon_id))
                })?;
                Ok((
                    WeaponRowId(weapon.weapon_id),
                    EquippedWeapon {
                        item_hash: ItemHash(stored_hash(weapon.bng_weapon_id)?),
                        character_id,
                        slot: stored_name(
                            WeaponSlot::from_name(&equipped.slot_type),
                            "slot",
                            &equipped.slot_type,
                        )?,
                        main_stat: equipped.main_stat,
                    },
                ))
            })
            .collect()
    }

    async fn list_equipped_armor(
        &self,
        character: CharacterRowId,
    ) -> Result<Vec<(ArmorRowId, EquippedArmor)>, RepoError> {
        let character_id = self.character_id(character).await?;
        let rows = equipped_armor::Entity::find()
            .filter(equipped_armor::Column::CharacterId.eq(character.0))
            .find_also_related(armor::Entity)
            .all(&self.db)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))?;
        rows.into_iter()
            .map(|(equipped, armor)| {
                let armor = armor.ok_or_else(|| {
                    RepoError::StorageError(format!("No armor row {}", equipped.armor_id))
                })?;
                Ok((
                    ArmorRowId(armor.armor_id),
                    EquippedArmor {
                        item_hash: ItemHash(stored_hash(armor.bng_armor_id)?),
                        character_id,
                        slot: stored_name(
                            ArmorSlot::from_name(&equipped.slot_type),
                            "slot",
                            &equipped.slot_type,
                        )?,
                    },
                ))
            })
            .collect()
    }
}
