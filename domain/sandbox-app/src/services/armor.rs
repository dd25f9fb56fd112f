use std::sync::Arc;

use dashmap::DashMap;
use sandbox_manifest::DefinitionResolver;

use crate::{
    domain::{
        ArmorRowId, ItemHash, RepoUpdateError,
        armor::{Armor, ArmorBuilder, ArmorRepository},
        builder::EntityBuilder,
    },
    services::{EnsureError, keyed_lock::KeyedLocks, tolerate_conflict},
};

#[async_trait::async_trait]
pub trait ArmorManager {
    async fn add_new(&self, item_hash: ItemHash) -> Result<Armor, EnsureError>;
    async fn ensure(&self, item_hash: ItemHash) -> Result<ArmorRowId, EnsureError>;
    /// Re-resolves the armor piece from the manifest and rewrites its stored row.
    async fn refresh(&self, item_hash: ItemHash) -> Result<Armor, EnsureError>;
    fn cached(&self, item_hash: ItemHash) -> Option<Armor>;
}

pub struct ArmorManagerImpl<R: ArmorRepository> {
    resolver: Arc<DefinitionResolver>,
    repository: Arc<R>,
    armor: DashMap<ItemHash, Armor>,
    locks: KeyedLocks<ItemHash>,
}

impl<R: ArmorRepository> ArmorManagerImpl<R> {
    pub fn new(resolver: Arc<DefinitionResolver>, repository: Arc<R>) -> Self {
        Self {
            resolver,
            repository,
            armor: DashMap::new(),
            locks: KeyedLocks::new(),
        }
    }
}

impl<R: ArmorRepository + Send + Sync + 'static> ArmorManagerImpl<R> {
    async fn build_and_store(&self, item_hash: ItemHash) -> Result<Armor, EnsureError> {
        let armor = ArmorBuilder::new(self.resolver.clone(), item_hash)
            .build()
            .await
            .ok_or(EnsureError::NotResolved)?;
        self.armor.entry(item_hash).or_insert_with(|| armor.clone());
        tolerate_conflict(self.repository.insert_armor(&armor).await)?;
        Ok(armor)
    }
}

#[async_trait::async_trait]
impl<R: ArmorRepository + Send + Sync + 'static> ArmorManager for ArmorManagerImpl<R> {
    async fn add_new(&self, item_hash: ItemHash) -> Result<Armor, EnsureError> {
        let _guard = self.locks.lock(&item_hash).await;
        self.build_and_store(item_hash).await
    }

    async fn ensure(&self, item_hash: ItemHash) -> Result<ArmorRowId, EnsureError> {
        let _guard = self.locks.lock(&item_hash).await;
        if let Some(stored) = self.repository.find_by_hash(item_hash).await? {
            return Ok(stored.row_id);
        }
        self.build_and_store(item_hash).await?;
        match self.repository.find_by_hash(item_hash).await? {
            Some(stored) => Ok(stored.row_id),
            None => Err(EnsureError::StorageError(format!(
                "armor {} missing after insert",
                item_hash
            ))),
        }
    }

    async fn refresh(&self, item_hash: ItemHash) -> Result<Armor, EnsureError> {
        let _guard = self.locks.lock(&item_hash).await;
        let armor = ArmorBuilder::new(self.resolver.clone(), item_hash)
            .build()
            .await
            .ok_or(EnsureError::NotResolved)?;
        match self.repository.update_armor(&armor).await {
            Ok(()) => {}
            Err(RepoUpdateError::NotFound) => return Err(EnsureError::NotResolved),
            Err(RepoUpdateError::StorageError(e)) => return Err(EnsureError::StorageError(e)),
        }
        self.armor.insert(item_hash, armor.clone());
        Ok(armor)
    }

    fn cached(&self, item_hash: ItemHash) -> Option<Armor> {
        self.armor.get(&item_hash).map(|a| a.clone())
    }
}
