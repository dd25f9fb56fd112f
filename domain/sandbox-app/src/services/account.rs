use std::sync::Arc;

use dashmap::DashMap;
use sandbox_manifest::catalog::Platform;

use crate::{
    domain::{
        AccountRowId, CharacterId, DestinyId, RepoError, RepoUpdateError,
        account::{
            Account, AccountBuilder, AccountRepository, StoredAccount, fetch_profile,
            split_bungie_name,
        },
        builder::EntityBuilder,
        payload::{UserInfoCard, decode},
    },
    ports::bungie::{BungieApiPort, endpoints},
    services::{EnsureError, keyed_lock::KeyedLocks, tolerate_conflict},
};

#[async_trait::async_trait]
pub trait AccountManager {
    /// Builds the account and stores it; an existing row is left alone.
    async fn add_new(
        &self,
        destiny_id: DestinyId,
        platform: Platform,
    ) -> Result<Account, EnsureError>;
    /// Returns the stored row for the account, building it first if needed.
    async fn ensure(
        &self,
        destiny_id: DestinyId,
        platform: Platform,
    ) -> Result<AccountRowId, EnsureError>;
    /// Finds an account by its "Name#1234" bungie name and stores it.
    async fn onboard(&self, bungie_name: &str, platform: Platform) -> Option<StoredAccount>;
    async fn refresh_last_played(
        &self,
        destiny_id: DestinyId,
        platform: Platform,
    ) -> Result<(), EnsureError>;
    /// Warms the cache with every stored account.
    async fn load_existing(&self) -> Result<usize, RepoError>;
    async fn character_and_account_ids(
        &self,
        destiny_id: DestinyId,
    ) -> Result<Option<(Vec<CharacterId>, AccountRowId)>, RepoError>;
    fn cached(&self, destiny_id: DestinyId) -> Option<Account>;
}

pub struct AccountManagerImpl<A: BungieApiPort, R: AccountRepository> {
    api: Arc<A>,
    repository: Arc<R>,
    accounts: DashMap<DestinyId, Account>,
    locks: KeyedLocks<DestinyId>,
}

impl<A: BungieApiPort, R: AccountRepository> AccountManagerImpl<A, R> {
    pub fn new(api: Arc<A>, repository: Arc<R>) -> Self {
        Self {
            api,
            repository,
            accounts: DashMap::new(),
            locks: KeyedLocks::new(),
        }
    }
}

impl<A: BungieApiPort + Send + Sync + 'static, R: AccountRepository + Send + Sync + 'static>
    AccountManagerImpl<A, R>
{
    async fn build_and_store(
        &self,
        destiny_id: DestinyId,
        platform: Platform,
    ) -> Result<Account, EnsureError> {
        let Some(account) = AccountBuilder::new(self.api.clone(), destiny_id, platform)
            .build()
            .await
        else {
            log::warn!("Account {} on {} could not be resolved", destiny_id, platform);
            return Err(EnsureError::NotResolved);
        };
        self.accounts
            .entry(destiny_id)
            .or_insert_with(|| account.clone());
        tolerate_conflict(self.repository.insert_account(&account).await)?;
        Ok(account)
    }

    async fn search(
        &self,
        display_name: &str,
        code: u16,
        platform: Platform,
    ) -> Option<UserInfoCard> {
        let payload = self
            .api
            .fetch_json(endpoints::search_by_bungie_name(platform, display_name, code))
            .await?;
        let cards: Vec<UserInfoCard> = decode(payload, "player search")?;
        cards.into_iter().next()
    }
}

#[async_trait::async_trait]
impl<A: BungieApiPort + Send + Sync + 'static, R: AccountRepository + Send + Sync + 'static>
    AccountManager for AccountManagerImpl<A, R>
{
    async fn add_new(
        &self,
        destiny_id: DestinyId,
        platform: Platform,
    ) -> Result<Account, EnsureError> {
        let _guard = self.locks.lock(&destiny_id).await;
        self.build_and_store(destiny_id, platform).await
    }

    async fn ensure(
        &self,
        destiny_id: DestinyId,
        platform: Platform,
    ) -> Result<AccountRowId, EnsureError> {
        let _guard = self.locks.lock(&destiny_id).await;
        if let Some(stored) = self.repository.find_by_destiny_id(destiny_id).await? {
            return Ok(stored.row_id);
        }
        self.build_and_store(destiny_id, platform).await?;
        match self.repository.find_by_destiny_id(destiny_id).await? {
            Some(stored) => Ok(stored.row_id),
            None => Err(EnsureError::StorageError(format!(
                "account {} missing after insert",
                destiny_id
            ))),
        }
    }

    async fn onboard(&self, bungie_name: &str, platform: Platform) -> Option<StoredAccount> {
        let Some((display_name, code)) = split_bungie_name(bungie_name) else {
            log::info!("Rejecting malformed bungie name {:?}", bungie_name);
            return None;
        };
        let Some(card) = self.search(display_name, code, platform).await else {
            log::info!("No account found for {}", bungie_name);
            return None;
        };
        let Some(platform) = Platform::from_code(card.membership_type) else {
            log::warn!("Unknown membership type {} for {}", card.membership_type, bungie_name);
            return None;
        };

        let destiny_id = DestinyId(card.membership_id);
        if let Err(e) = self.ensure(destiny_id, platform).await {
            log::error!("Failed to onboard {}: {}", bungie_name, e);
            return None;
        }
        match self.repository.find_by_destiny_id(destiny_id).await {
            Ok(stored) => stored,
            Err(e) => {
                log::error!("Failed to read onboarded account {}: {}", destiny_id, e);
                None
            }
        }
    }

    async fn refresh_last_played(
        &self,
        destiny_id: DestinyId,
        platform: Platform,
    ) -> Result<(), EnsureError> {
        let _guard = self.locks.lock(&destiny_id).await;
        let profile = fetch_profile(self.api.as_ref(), destiny_id, platform)
            .await
            .ok_or(EnsureError::NotResolved)?;
        match self
            .repository
            .update_last_played(destiny_id, profile.date_last_played, &profile.character_ids)
            .await
        {
            Ok(()) => {}
            Err(RepoUpdateError::NotFound) => return Err(EnsureError::NotResolved),
            Err(RepoUpdateError::StorageError(e)) => return Err(EnsureError::StorageError(e)),
        }
        if let Some(mut account) = self.accounts.get_mut(&destiny_id) {
            account.date_last_played = profile.date_last_played;
            account.character_ids = profile.character_ids;
        }
        Ok(())
    }

    async fn load_existing(&self) -> Result<usize, RepoError> {
        let stored = self.repository.list_accounts().await?;
        let count = stored.len();
        for StoredAccount { account, .. } in stored {
            self.accounts.insert(account.destiny_id, account);
        }
        log::info!("Loaded {} stored accounts", count);
        Ok(count)
    }

    async fn character_and_account_ids(
        &self,
        destiny_id: DestinyId,
    ) -> Result<Option<(Vec<CharacterId>, AccountRowId)>, RepoError> {
        Ok(self
            .repository
            .find_by_destiny_id(destiny_id)
            .await?
            .map(|stored| (stored.account.character_ids, stored.row_id)))
    }

    fn cached(&self, destiny_id: DestinyId) -> Option<Account> {
        self.accounts.get(&destiny_id).map(|a| a.clone())
    }
}
