use sandbox_app::domain::{
    ActivityRowId, CharacterRowId, InstanceId, RepoCreateError, RepoError, WeaponRowId,
    stats::{MatchStatRecord, StatRowKeys, StatsRepository, StoredStat},
};
use sea_orm::{DatabaseConnection, Set};

use crate::{
    commands::{DeleteCommand, InsertCommand, SelectCommand},
    entity::activity_stats,
};

/// Stat rows are written once and never cached; the composite unique key
/// (character, match, weapon) is the duplicate check of last resort.
pub struct StatsRepositoryImpl {
    db: DatabaseConnection,
}

impl StatsRepositoryImpl {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn model_to_stat(model: activity_stats::Model) -> Result<StoredStat, RepoError> {
        let count = |value: i64| {
            u32::try_from(value).map_err(|_| {
                RepoError::StorageError(format!(
                    "Count {} out of range in stat row {}",
                    value, model.activity_stats_id
                ))
            })
        };
        Ok(StoredStat {
            row_id: model.activity_stats_id,
            keys: StatRowKeys {
                character: CharacterRowId(model.character_id),
                activity: ActivityRowId(model.activity_id),
                weapon: WeaponRowId(model.weapon_id),
            },
            instance_id: InstanceId(model.instance_id),
            kills: count(model.kills)?,
            precision_kills: count(model.precision_kills)?,
            precision_kills_percent: model.precision_kills_percent,
            weapon_name: model.weapon_name,
            activity_name: model.activity_name,
            character_class: model.character_class,
        })
    }

    fn record_to_model(keys: StatRowKeys, record: &MatchStatRecord) -> activity_stats::ActiveModel {
        activity_stats::ActiveModel {
            character_id: Set(keys.character.0),
            activity_id: Set(keys.activity.0),
            weapon_id: Set(keys.weapon.0),
            instance_id: Set(record.instance_id.0),
            kills: Set(i64::from(record.kills)),
            precision_kills: Set(i64::from(record.precision_kills)),
            precision_kills_percent: Set(record.precision_kills_percent),
            weapon_name: Set(record.weapon_name.clone()),
            activity_name: Set(record.activity_name.clone()),
            character_class: Set(record.character_class.clone()),
            ..Default::default()
        }
    }
}

#[async_trait::async_trait]
impl StatsRepository for StatsRepositoryImpl {
    async fn insert_stat(
        &self,
        keys: StatRowKeys,
        record: &MatchStatRecord,
    ) -> Result<StoredStat, RepoCreateError> {
        let inserted = InsertCommand::new(Self::record_to_model(keys, record))
            .unique_on([
                activity_stats::Column::CharacterId,
                activity_stats::Column::InstanceId,
                activity_stats::Column::WeaponId,
            ])
            .execute(&self.db)
            .await
            .map_err(|e| RepoCreateError::StorageError(e.to_string()))?;
        if !inserted {
            log::debug!(
                "Stat row for character {} match {} weapon {} exists",
                record.character_id,
                record.instance_id,
                record.weapon_hash
            );
            return Err(RepoCreateError::Conflict);
        }

        let model = SelectCommand::<activity_stats::Entity>::new()
            .filter_eq(activity_stats::Column::CharacterId, keys.character.0)
            .filter_eq(activity_stats::Column::InstanceId, record.instance_id.0)
            .filter_eq(activity_stats::Column::WeaponId, keys.weapon.0)
            .first(&self.db)
            .await
            .map_err(|e| RepoCreateError::StorageError(e.to_string()))?
            .ok_or_else(|| {
                RepoCreateError::StorageError("Inserted stat row not readable".to_string())
            })?;
        Self::model_to_stat(model).map_err(|RepoError::StorageError(e)| {
            RepoCreateError::StorageError(e)
        })
    }

    async fn find_by_character_instance(
        &self,
        character: CharacterRowId,
        instance_id: InstanceId,
    ) -> Result<Vec<StoredStat>, RepoError> {
        let models = SelectCommand::<activity_stats::Entity>::new()
            .filter_eq(activity_stats::Column::CharacterId, character.0)
            .filter_eq(activity_stats::Column::InstanceId, instance_id.0)
            .execute(&self.db)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))?;
        models.into_iter().map(Self::model_to_stat).collect()
    }

    async fn delete_by_character_instance(
        &self,
        character: CharacterRowId,
        instance_id: InstanceId,
    ) -> Result<u64, RepoError> {
        DeleteCommand::<activity_stats::Entity>::new()
            .filter_eq(activity_stats::Column::CharacterId, character.0)
            .filter_eq(activity_stats::Column::InstanceId, instance_id.0)
            .execute(&self.db)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))
    }
}
