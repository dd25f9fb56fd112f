use std::sync::Arc;

use dashmap::DashMap;
use sandbox_manifest::catalog::{ActivityMode, Platform};

use crate::{
    domain::{
        AccountRowId, CharacterId, CharacterRowId, DestinyId, InstanceId, RepoCreateError,
        RepoError, RepoUpdateError,
        builder::EntityBuilder,
        character::{Character, CharacterBuilder, CharacterRepository, Equipment, StoredCharacter},
        payload::{ActivityHistoryPayload, decode},
    },
    ports::bungie::{BungieApiPort, endpoints},
    services::{EnsureError, keyed_lock::KeyedLocks},
};

#[async_trait::async_trait]
pub trait CharacterManager {
    async fn add_new(
        &self,
        destiny_id: DestinyId,
        platform: Platform,
        character_id: CharacterId,
        account_row_id: AccountRowId,
    ) -> Result<Character, EnsureError>;
    async fn ensure(
        &self,
        destiny_id: DestinyId,
        platform: Platform,
        character_id: CharacterId,
        account_row_id: AccountRowId,
    ) -> Result<CharacterRowId, EnsureError>;
    async fn find_stored(
        &self,
        character_id: CharacterId,
    ) -> Result<Option<StoredCharacter>, RepoError>;
    /// Recent match ids of a character built by this manager. Unknown
    /// characters have no history.
    async fn activity_history(
        &self,
        character_id: CharacterId,
        mode: ActivityMode,
        count: u32,
    ) -> Vec<InstanceId>;
    /// Equipment seen when the character was last built.
    fn equipment(&self, character_id: CharacterId) -> Option<Equipment>;
    fn cached(&self, character_id: CharacterId) -> Option<Character>;
}

pub struct CharacterManagerImpl<A: BungieApiPort, R: CharacterRepository> {
    api: Arc<A>,
    repository: Arc<R>,
    characters: DashMap<CharacterId, Character>,
    equipment: DashMap<CharacterId, Equipment>,
    locks: KeyedLocks<CharacterId>,
}

impl<A: BungieApiPort, R: CharacterRepository> CharacterManagerImpl<A, R> {
    pub fn new(api: Arc<A>, repository: Arc<R>) -> Self {
        Self {
            api,
            repository,
            characters: DashMap::new(),
            equipment: DashMap::new(),
            locks: KeyedLocks::new(),
        }
    }
}

impl<A: BungieApiPort + Send + Sync + 'static, R: CharacterRepository + Send + Sync + 'static>
    CharacterManagerImpl<A, R>
{
    async fn build_and_store(
        &self,
        destiny_id: DestinyId,
        platform: Platform,
        character_id: CharacterId,
        account_row_id: AccountRowId,
    ) -> Result<Character, EnsureError> {
        let builder = CharacterBuilder::new(
            self.api.clone(),
            destiny_id,
            platform,
            character_id,
            account_row_id,
        );
        let Some(built) = builder.build().await else {
            log::warn!("Character {} could not be resolved", character_id);
            return Err(EnsureError::NotResolved);
        };
        self.characters
            .insert(character_id, built.character.clone());
        self.equipment.insert(character_id, built.equipment);
        match self.repository.insert_character(&built.character).await {
            Ok(()) => {}
            // an existing row only carries a stale last played date
            Err(RepoCreateError::Conflict) => {
                match self
                    .repository
                    .update_last_played(character_id, built.character.date_last_played)
                    .await
                {
                    Ok(()) | Err(RepoUpdateError::NotFound) => {}
                    Err(RepoUpdateError::StorageError(e)) => {
                        return Err(EnsureError::StorageError(e));
                    }
                }
            }
            Err(RepoCreateError::StorageError(e)) => return Err(EnsureError::StorageError(e)),
        }
        Ok(built.character)
    }
}

#[async_trait::async_trait]
impl<A: BungieApiPort + Send + Sync + 'static, R: CharacterRepository + Send + Sync + 'static>
    CharacterManager for CharacterManagerImpl<A, R>
{
    async fn add_new(
        &self,
        destiny_id: DestinyId,
        platform: Platform,
        character_id: CharacterId,
        account_row_id: AccountRowId,
    ) -> Result<Character, EnsureError> {
        let _guard = self.locks.lock(&character_id).await;
        self.build_and_store(destiny_id, platform, character_id, account_row_id)
            .await
    }

    async fn ensure(
        &self,
        destiny_id: DestinyId,
        platform: Platform,
        character_id: CharacterId,
        account_row_id: AccountRowId,
    ) -> Result<CharacterRowId, EnsureError> {
        let _guard = self.locks.lock(&character_id).await;
        if let Some(stored) = self.repository.find_by_character_id(character_id).await? {
            return Ok(stored.row_id);
        }
        self.build_and_store(destiny_id, platform, character_id, account_row_id)
            .await?;
        match self.repository.find_by_character_id(character_id).await? {
            Some(stored) => Ok(stored.row_id),
            None => Err(EnsureError::StorageError(format!(
                "character {} missing after insert",
                character_id
            ))),
        }
    }

    async fn find_stored(
        &self,
        character_id: CharacterId,
    ) -> Result<Option<StoredCharacter>, RepoError> {
        self.repository.find_by_character_id(character_id).await
    }

    async fn activity_history(
        &self,
        character_id: CharacterId,
        mode: ActivityMode,
        count: u32,
    ) -> Vec<InstanceId> {
        let Some(character) = self.cached(character_id) else {
            log::debug!("No history for unknown character {}", character_id);
            return Vec::new();
        };
        let request = endpoints::activity_history(
            character.destiny_id,
            character.platform,
            character_id,
            mode,
            count,
        );
        let Some(payload) = self.api.fetch_json(request).await else {
            return Vec::new();
        };
        decode::<ActivityHistoryPayload>(payload, "activity history")
            .map(|history| {
                history
                    .activities
                    .into_iter()
                    .map(|entry| InstanceId(entry.activity_details.instance_id))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn equipment(&self, character_id: CharacterId) -> Option<Equipment> {
        self.equipment.get(&character_id).map(|e| e.clone())
    }

    fn cached(&self, character_id: CharacterId) -> Option<Character> {
        self.characters.get(&character_id).map(|c| c.clone())
    }
}
