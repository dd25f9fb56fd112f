use sandbox_app::domain::{
    ArmorRowId, ItemHash, RepoCreateError, RepoError, RepoUpdateError,
    armor::{Armor, ArmorRepository, StoredArmor},
};
use sandbox_manifest::catalog::{ArmorSlot, Rarity};
use sea_orm::{DatabaseConnection, Set};

use crate::{
    commands::{InsertCommand, SelectCommand, UpdateCommand},
    entity::armor,
    stored_hash, stored_name,
};

pub struct ArmorRepositoryImpl {
    db: DatabaseConnection,
    armor_cache: moka::future::Cache<ItemHash, StoredArmor>,
}

impl ArmorRepositoryImpl {
    pub fn new(db: DatabaseConnection) -> Self {
        let armor_cache = moka::future::Cache::builder()
            .max_capacity(10_000)
            .time_to_live(std::time::Duration::from_secs(60 * 60))
            .build();
        Self { db, armor_cache }
    }

    fn model_to_armor(model: armor::Model) -> Result<StoredArmor, RepoError> {
        Ok(StoredArmor {
            row_id: ArmorRowId(model.armor_id),
            armor: Armor {
                item_hash: ItemHash(stored_hash(model.bng_armor_id)?),
                slot: stored_name(ArmorSlot::from_name(&model.slot), "slot", &model.slot)?,
                rarity: stored_name(Rarity::from_name(&model.rarity), "rarity", &model.rarity)?,
                name: model.armor_name,
            },
        })
    }
}

#[async_trait::async_trait]
impl ArmorRepository for ArmorRepositoryImpl {
    async fn find_by_hash(&self, item_hash: ItemHash) -> Result<Option<StoredArmor>, RepoError> {
        if let Some(cached) = self.armor_cache.get(&item_hash).await {
            return Ok(Some(cached));
        }
        let model = SelectCommand::<armor::Entity>::new()
            .filter_eq(armor::Column::BngArmorId, i64::from(item_hash.0))
            .first(&self.db)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))?;
        match model {
            Some(model) => {
                let stored = Self::model_to_armor(model)?;
                self.armor_cache.insert(item_hash, stored.clone()).await;
                Ok(Some(stored))
            }
            None => Ok(None),
        }
    }

    async fn insert_armor(&self, armor: &Armor) -> Result<(), RepoCreateError> {
        let model = armor::ActiveModel {
            bng_armor_id: Set(i64::from(armor.item_hash.0)),
            armor_name: Set(armor.name.clone()),
            slot: Set(armor.slot.name().to_string()),
            rarity: Set(armor.rarity.name().to_string()),
            ..Default::default()
        };
        let inserted = InsertCommand::new(model)
            .unique_on([armor::Column::BngArmorId])
            .execute(&self.db)
            .await
            .map_err(|e| RepoCreateError::StorageError(e.to_string()))?;
        if !inserted {
            return Err(RepoCreateError::Conflict);
        }
        Ok(())
    }

    async fn update_armor(&self, armor: &Armor) -> Result<(), RepoUpdateError> {
        let existing = self
            .find_by_hash(armor.item_hash)
            .await
            .map_err(|RepoError::StorageError(e)| RepoUpdateError::StorageError(e))?;
        if existing.is_none() {
            return Err(RepoUpdateError::NotFound);
        }
        UpdateCommand::<armor::Entity>::new()
            .set(armor::Column::ArmorName, armor.name.clone())
            .set(armor::Column::Slot, armor.slot.name())
            .set(armor::Column::Rarity, armor.rarity.name())
            .filter_eq(armor::Column::BngArmorId, i64::from(armor.item_hash.0))
            .execute(&self.db)
            .await
            .map_err(|e| RepoUpdateError::StorageError(e.to_string()))?;
        self.armor_cache.invalidate(&armor.item_hash).await;
        Ok(())
    }
}
