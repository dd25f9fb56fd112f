use std::sync::Arc;

use dashmap::DashMap;
use sandbox_manifest::DefinitionResolver;

use crate::{
    domain::{
        ItemHash, RepoUpdateError, WeaponRowId,
        builder::EntityBuilder,
        weapon::{Weapon, WeaponBuilder, WeaponRepository},
    },
    services::{EnsureError, keyed_lock::KeyedLocks, tolerate_conflict},
};

#[async_trait::async_trait]
pub trait WeaponManager {
    async fn add_new(&self, item_hash: ItemHash) -> Result<Weapon, EnsureError>;
    async fn ensure(&self, item_hash: ItemHash) -> Result<WeaponRowId, EnsureError>;
    /// Re-resolves the weapon from the manifest and rewrites its stored row.
    async fn refresh(&self, item_hash: ItemHash) -> Result<Weapon, EnsureError>;
    fn cached(&self, item_hash: ItemHash) -> Option<Weapon>;
}

pub struct WeaponManagerImpl<R: WeaponRepository> {
    resolver: Arc<DefinitionResolver>,
    repository: Arc<R>,
    weapons: DashMap<ItemHash, Weapon>,
    locks: KeyedLocks<ItemHash>,
}

impl<R: WeaponRepository> WeaponManagerImpl<R> {
    pub fn new(resolver: Arc<DefinitionResolver>, repository: Arc<R>) -> Self {
        Self {
            resolver,
            repository,
            weapons: DashMap::new(),
            locks: KeyedLocks::new(),
        }
    }
}

impl<R: WeaponRepository + Send + Sync + 'static> WeaponManagerImpl<R> {
    async fn build_and_store(&self, item_hash: ItemHash) -> Result<Weapon, EnsureError> {
        let weapon = WeaponBuilder::new(self.resolver.clone(), item_hash)
            .build()
            .await
            .ok_or(EnsureError::NotResolved)?;
        self.weapons
            .entry(item_hash)
            .or_insert_with(|| weapon.clone());
        tolerate_conflict(self.repository.insert_weapon(&weapon).await)?;
        Ok(weapon)
    }
}

#[async_trait::async_trait]
impl<R: WeaponRepository + Send + Sync + 'static> WeaponManager for WeaponManagerImpl<R> {
    async fn add_new(&self, item_hash: ItemHash) -> Result<Weapon, EnsureError> {
        let _guard = self.locks.lock(&item_hash).await;
        self.build_and_store(item_hash).await
    }

    async fn ensure(&self, item_hash: ItemHash) -> Result<WeaponRowId, EnsureError> {
        let _guard = self.locks.lock(&item_hash).await;
        if let Some(stored) = self.repository.find_by_hash(item_hash).await? {
            return Ok(stored.row_id);
        }
        self.build_and_store(item_hash).await?;
        match self.repository.find_by_hash(item_hash).await? {
            Some(stored) => Ok(stored.row_id),
            None => Err(EnsureError::StorageError(format!(
                "weapon {} missing after insert",
                item_hash
            ))),
        }
    }

    async fn refresh(&self, item_hash: ItemHash) -> Result<Weapon, EnsureError> {
        let _guard = self.locks.lock(&item_hash).await;
        let weapon = WeaponBuilder::new(self.resolver.clone(), item_hash)
            .build()
            .await
            .ok_or(EnsureError::NotResolved)?;
        match self.repository.update_weapon(&weapon).await {
            Ok(()) => {}
            Err(RepoUpdateError::NotFound) => return Err(EnsureError::NotResolved),
            Err(RepoUpdateError::StorageError(e)) => return Err(EnsureError::StorageError(e)),
        }
        self.weapons.insert(item_hash, weapon.clone());
        Ok(weapon)
    }

    fn cached(&self, item_hash: ItemHash) -> Option<Weapon> {
        self.weapons.get(&item_hash).map(|w| w.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{InMemoryStore, ResolverFixture, weapon_definition};

    #[tokio::test]
    async fn test_ensure_is_idempotent() {
        let resolver = ResolverFixture::new()
            .item(1666, weapon_definition("Ace of Spades", "Exotic Hand Cannon", 1, 1498876634, 1))
            .build();
        let store = Arc::new(InMemoryStore::new());
        let weapons = WeaponManagerImpl::new(resolver, store.clone());

        let first = weapons.ensure(ItemHash(1666)).await.unwrap();
        let second = weapons.ensure(ItemHash(1666)).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(store.weapon_count(), 1);
        assert_eq!(weapons.cached(ItemHash(1666)).unwrap().name, "Ace of Spades");
    }

    #[tokio::test]
    async fn test_unknown_weapon_is_not_stored() {
        let store = Arc::new(InMemoryStore::new());
        let weapons = WeaponManagerImpl::new(ResolverFixture::new().build(), store.clone());

        assert_eq!(weapons.ensure(ItemHash(1)).await, Err(EnsureError::NotResolved));
        assert_eq!(store.weapon_count(), 0);
    }

    #[tokio::test]
    async fn test_refresh_rewrites_stored_row() {
        let store = Arc::new(InMemoryStore::new());
        let old = ResolverFixture::new()
            .item(
                1666,
                weapon_definition("Ace of Spades", "Legendary Hand Cannon", 1, 1498876634, 1),
            )
            .build();
        WeaponManagerImpl::new(old, store.clone())
            .ensure(ItemHash(1666))
            .await
            .unwrap();

        let new = ResolverFixture::new()
            .item(1666, weapon_definition("Ace of Spades", "Exotic Hand Cannon", 1, 1498876634, 1))
            .build();
        let weapons = WeaponManagerImpl::new(new, store.clone());
        let refreshed = weapons.refresh(ItemHash(1666)).await.unwrap();

        assert_eq!(refreshed.rarity, sandbox_manifest::catalog::Rarity::Exotic);
        assert_eq!(
            store.weapon(ItemHash(1666)).unwrap().rarity,
            sandbox_manifest::catalog::Rarity::Exotic
        );
    }
}
