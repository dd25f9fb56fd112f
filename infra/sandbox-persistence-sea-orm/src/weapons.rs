use sandbox_app::domain::{
    ItemHash, RepoCreateError, RepoError, RepoUpdateError, WeaponRowId,
    weapon::{StoredWeapon, Weapon, WeaponRepository},
};
use sandbox_manifest::catalog::{AmmoType, DamageType, Rarity, WeaponSlot, WeaponType};
use sea_orm::{DatabaseConnection, Set};

use crate::{
    commands::{InsertCommand, SelectCommand, UpdateCommand},
    entity::weapon,
    stored_hash, stored_name,
};

pub struct WeaponRepositoryImpl {
    db: DatabaseConnection,
    weapons_cache: moka::future::Cache<ItemHash, StoredWeapon>,
}

impl WeaponRepositoryImpl {
    pub fn new(db: DatabaseConnection) -> Self {
        let weapons_cache = moka::future::Cache::builder()
            .max_capacity(10_000)
            .time_to_live(std::time::Duration::from_secs(60 * 60))
            .build();
        Self { db, weapons_cache }
    }

    fn model_to_weapon(model: weapon::Model) -> Result<StoredWeapon, RepoError> {
        Ok(StoredWeapon {
            row_id: WeaponRowId(model.weapon_id),
            weapon: Weapon {
                item_hash: ItemHash(stored_hash(model.bng_weapon_id)?),
                weapon_type: stored_name(
                    WeaponType::from_name(&model.weapon_type),
                    "weapon type",
                    &model.weapon_type,
                )?,
                ammo_type: stored_name(
                    AmmoType::from_name(&model.ammo_type),
                    "ammo type",
                    &model.ammo_type,
                )?,
                slot: stored_name(WeaponSlot::from_name(&model.slot), "slot", &model.slot)?,
                damage_type: stored_name(
                    DamageType::from_name(&model.damage_type),
                    "damage type",
                    &model.damage_type,
                )?,
                rarity: stored_name(Rarity::from_name(&model.rarity), "rarity", &model.rarity)?,
                name: model.weapon_name,
            },
        })
    }

    fn weapon_to_model(weapon: &Weapon) -> weapon::ActiveModel {
        weapon::ActiveModel {
            bng_weapon_id: Set(i64::from(weapon.item_hash.0)),
            weapon_name: Set(weapon.name.clone()),
            weapon_type: Set(weapon.weapon_type.name().to_string()),
            ammo_type: Set(weapon.ammo_type.name().to_string()),
            slot: Set(weapon.slot.name().to_string()),
            damage_type: Set(weapon.damage_type.name().to_string()),
            rarity: Set(weapon.rarity.name().to_string()),
            ..Default::default()
        }
    }
}

#[async_trait::async_trait]
impl WeaponRepository for WeaponRepositoryImpl {
    async fn find_by_hash(&self, item_hash: ItemHash) -> Result<Option<StoredWeapon>, RepoError> {
        if let Some(cached) = self.weapons_cache.get(&item_hash).await {
            return Ok(Some(cached));
        }
        let model = SelectCommand::<weapon::Entity>::new()
            .filter_eq(weapon::Column::BngWeaponId, i64::from(item_hash.0))
            .first(&self.db)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))?;
        let Some(model) = model else {
            return Ok(None);
        };
        let stored = Self::model_to_weapon(model)?;
        self.weapons_cache.insert(item_hash, stored.clone()).await;
        Ok(Some(stored))
    }

    async fn insert_weapon(&self, weapon: &Weapon) -> Result<(), RepoCreateError> {
        let inserted = InsertCommand::new(Self::weapon_to_model(weapon))
            .unique_on([weapon::Column::BngWeaponId])
            .execute(&self.db)
            .await
            .map_err(|e| RepoCreateError::StorageError(e.to_string()))?;
        if !inserted {
            return Err(RepoCreateError::Conflict);
        }
        log::debug!("Inserted weapon {} ({})", weapon.item_hash, weapon.name);
        Ok(())
    }

    async fn update_weapon(&self, weapon: &Weapon) -> Result<(), RepoUpdateError> {
        let existing = self
            .find_by_hash(weapon.item_hash)
            .await
            .map_err(|RepoError::StorageError(e)| RepoUpdateError::StorageError(e))?;
        if existing.is_none() {
            return Err(RepoUpdateError::NotFound);
        }
        UpdateCommand::<weapon::Entity>::new()
            .set(weapon::Column::WeaponName, weapon.name.clone())
            .set(weapon::Column::WeaponType, weapon.weapon_type.name())
            .set(weapon::Column::AmmoType, weapon.ammo_type.name())
            .set(weapon::Column::Slot, weapon.slot.name())
            .set(weapon::Column::DamageType, weapon.damage_type.name())
            .set(weapon::Column::Rarity, weapon.rarity.name())
            .filter_eq(weapon::Column::BngWeaponId, i64::from(weapon.item_hash.0))
            .execute(&self.db)
            .await
            .map_err(|e| RepoUpdateError::StorageError(e.to_string()))?;
        self.weapons_cache.invalidate(&weapon.item_hash).await;
        Ok(())
    }
}
