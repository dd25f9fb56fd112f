use sandbox_app::domain::{
    ActivityHash, ActivityRowId, RepoCreateError, RepoError,
    activity::{Activity, ActivityRepository, StoredActivity},
};
use sea_orm::{DatabaseConnection, Set};

use crate::{
    commands::{InsertCommand, SelectCommand},
    entity::activity,
    stored_hash,
};

pub struct ActivityRepositoryImpl {
    db: DatabaseConnection,
    activities_cache: moka::future::Cache<ActivityHash, StoredActivity>,
}

impl ActivityRepositoryImpl {
    pub fn new(db: DatabaseConnection) -> Self {
        let activities_cache = moka::future::Cache::builder()
            .max_capacity(10_000)
            .time_to_live(std::time::Duration::from_secs(60 * 60))
            .build();
        Self {
            db,
            activities_cache,
        }
    }

    fn model_to_activity(model: activity::Model) -> Result<StoredActivity, RepoError> {
        Ok(StoredActivity {
            row_id: ActivityRowId(model.activity_id),
            activity: Activity {
                activity_hash: ActivityHash(stored_hash(model.bng_activity_id)?),
                name: model.activity_name,
                activity_type: model.activity_type,
                max_fireteam_size: u32::try_from(model.max_fireteam_size).unwrap_or(0),
                modifiers: model.modifiers,
            },
        })
    }

    fn activity_to_model(activity: &Activity) -> activity::ActiveModel {
        activity::ActiveModel {
            bng_activity_id: Set(i64::from(activity.activity_hash.0)),
            activity_name: Set(activity.name.clone()),
            activity_type: Set(activity.activity_type.clone()),
            max_fireteam_size: Set(i32::try_from(activity.max_fireteam_size).unwrap_or(i32::MAX)),
            modifiers: Set(activity.modifiers.clone()),
            ..Default::default()
        }
    }
}

#[async_trait::async_trait]
impl ActivityRepository for ActivityRepositoryImpl {
    async fn find_by_hash(
        &self,
        activity_hash: ActivityHash,
    ) -> Result<Option<StoredActivity>, RepoError> {
        if let Some(cached) = self.activities_cache.get(&activity_hash).await {
            return Ok(Some(cached));
        }
        let model = SelectCommand::<activity::Entity>::new()
            .filter_eq(activity::Column::BngActivityId, i64::from(activity_hash.0))
            .first(&self.db)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))?;
        let Some(model) = model else {
            return Ok(None);
        };
        let stored = Self::model_to_activity(model)?;
        self.activities_cache
            .insert(activity_hash, stored.clone())
            .await;
        Ok(Some(stored))
    }

    async fn insert_activity(&self, activity: &Activity) -> Result<(), RepoCreateError> {
        let inserted = InsertCommand::new(Self::activity_to_model(activity))
            .unique_on([activity::Column::BngActivityId])
            .execute(&self.db)
            .await
            .map_err(|e| RepoCreateError::StorageError(e.to_string()))?;
        if !inserted {
            return Err(RepoCreateError::Conflict);
        }
        log::debug!("Inserted activity {} ({})", activity.activity_hash, activity.name);
        Ok(())
    }
}
