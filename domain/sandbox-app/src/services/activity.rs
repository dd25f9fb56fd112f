use std::sync::Arc;

use dashmap::DashMap;
use sandbox_manifest::DefinitionResolver;

use crate::{
    domain::{
        ActivityHash, ActivityRowId,
        activity::{Activity, ActivityBuilder, ActivityRepository},
        builder::EntityBuilder,
    },
    services::{EnsureError, keyed_lock::KeyedLocks, tolerate_conflict},
};

#[async_trait::async_trait]
pub trait ActivityManager {
    async fn add_new(&self, activity_hash: ActivityHash) -> Result<Activity, EnsureError>;
    async fn ensure(&self, activity_hash: ActivityHash) -> Result<ActivityRowId, EnsureError>;
    fn cached(&self, activity_hash: ActivityHash) -> Option<Activity>;
}

pub struct ActivityManagerImpl<R: ActivityRepository> {
    resolver: Arc<DefinitionResolver>,
    repository: Arc<R>,
    activities: DashMap<ActivityHash, Activity>,
    locks: KeyedLocks<ActivityHash>,
}

impl<R: ActivityRepository> ActivityManagerImpl<R> {
    pub fn new(resolver: Arc<DefinitionResolver>, repository: Arc<R>) -> Self {
        Self {
            resolver,
            repository,
            activities: DashMap::new(),
            locks: KeyedLocks::new(),
        }
    }
}

impl<R: ActivityRepository + Send + Sync + 'static> ActivityManagerImpl<R> {
    async fn build_and_store(&self, activity_hash: ActivityHash) -> Result<Activity, EnsureError> {
        let activity = ActivityBuilder::new(self.resolver.clone(), activity_hash)
            .build()
            .await
            .ok_or(EnsureError::NotResolved)?;
        self.activities
            .entry(activity_hash)
            .or_insert_with(|| activity.clone());
        tolerate_conflict(self.repository.insert_activity(&activity).await)?;
        Ok(activity)
    }
}

#[async_trait::async_trait]
impl<R: ActivityRepository + Send + Sync + 'static> ActivityManager for ActivityManagerImpl<R> {
    async fn add_new(&self, activity_hash: ActivityHash) -> Result<Activity, EnsureError> {
        let _guard = self.locks.lock(&activity_hash).await;
        self.build_and_store(activity_hash).await
    }

    async fn ensure(&self, activity_hash: ActivityHash) -> Result<ActivityRowId, EnsureError> {
        let _guard = self.locks.lock(&activity_hash).await;
        if let Some(stored) = self.repository.find_by_hash(activity_hash).await? {
            return Ok(stored.row_id);
        }
        self.build_and_store(activity_hash).await?;
        match self.repository.find_by_hash(activity_hash).await? {
            Some(stored) => Ok(stored.row_id),
            None => Err(EnsureError::StorageError(format!(
                "activity {} missing after insert",
                activity_hash
            ))),
        }
    }

    fn cached(&self, activity_hash: ActivityHash) -> Option<Activity> {
        self.activities.get(&activity_hash).map(|a| a.clone())
    }
}
