use chrono::NaiveDate;
use sandbox_app::domain::{
    AccountRowId, CharacterId, CharacterRowId, DestinyId, RepoCreateError, RepoError,
    RepoUpdateError,
    character::{Character, CharacterRepository, StoredCharacter},
};
use sandbox_manifest::catalog::{ClassType, Platform};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::{
    commands::{InsertCommand, UpdateCommand},
    entity::{character, player},
};

pub struct CharacterRepositoryImpl {
    db: DatabaseConnection,
    characters_cache: moka::future::Cache<CharacterId, StoredCharacter>,
}

impl CharacterRepositoryImpl {
    pub fn new(db: DatabaseConnection) -> Self {
        let characters_cache = moka::future::Cache::builder()
            .max_capacity(10_000)
            .time_to_live(std::time::Duration::from_secs(60 * 60))
            .build();
        Self {
            db,
            characters_cache,
        }
    }

    /// The owning player row supplies the destiny id and platform.
    fn model_to_character(
        model: character::Model,
        owner: player::Model,
    ) -> Result<StoredCharacter, RepoError> {
        let class = ClassType::from_name(&model.class).ok_or_else(|| {
            RepoError::StorageError(format!(
                "Unknown class {} for character {}",
                model.class, model.bng_character_id
            ))
        })?;
        let platform = Platform::from_name(&owner.platform).ok_or_else(|| {
            RepoError::StorageError(format!(
                "Unknown platform {} for player {}",
                owner.platform, owner.player_id
            ))
        })?;
        Ok(StoredCharacter {
            row_id: CharacterRowId(model.character_id),
            character: Character {
                character_id: CharacterId(model.bng_character_id),
                destiny_id: DestinyId(owner.destiny_id),
                platform,
                account_row_id: AccountRowId(model.player_id),
                class,
                date_last_played: model.date_last_played,
            },
        })
    }

    fn character_to_model(character: &Character) -> character::ActiveModel {
        character::ActiveModel {
            bng_character_id: Set(character.character_id.0),
            player_id: Set(character.account_row_id.0),
            class: Set(character.class.name().to_string()),
            date_last_played: Set(character.date_last_played),
            ..Default::default()
        }
    }
}

#[async_trait::async_trait]
impl CharacterRepository for CharacterRepositoryImpl {
    async fn find_by_character_id(
        &self,
        character_id: CharacterId,
    ) -> Result<Option<StoredCharacter>, RepoError> {
        if let Some(cached) = self.characters_cache.get(&character_id).await {
            return Ok(Some(cached));
        }
        let row = character::Entity::find()
            .filter(character::Column::BngCharacterId.eq(character_id.0))
            .find_also_related(player::Entity)
            .one(&self.db)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))?;
        let Some((model, owner)) = row else {
            return Ok(None);
        };
        let owner = owner.ok_or_else(|| {
            RepoError::StorageError(format!("Character {} has no player row", character_id))
        })?;
        let stored = Self::model_to_character(model, owner)?;
        self.characters_cache
            .insert(character_id, stored.clone())
            .await;
        Ok(Some(stored))
    }

    async fn insert_character(&self, character: &Character) -> Result<(), RepoCreateError> {
        let inserted = InsertCommand::new(Self::character_to_model(character))
            .unique_on([character::Column::BngCharacterId])
            .execute(&self.db)
            .await
            .map_err(|e| RepoCreateError::StorageError(e.to_string()))?;
        if !inserted {
            return Err(RepoCreateError::Conflict);
        }
        log::debug!(
            "Inserted character {} for player row {}",
            character.character_id,
            character.account_row_id.0
        );
        Ok(())
    }

    async fn update_last_played(
        &self,
        character_id: CharacterId,
        date_last_played: NaiveDate,
    ) -> Result<(), RepoUpdateError> {
        let rows = UpdateCommand::<character::Entity>::new()
            .set(character::Column::DateLastPlayed, date_last_played)
            .filter_eq(character::Column::BngCharacterId, character_id.0)
            .execute(&self.db)
            .await
            .map_err(|e| RepoUpdateError::StorageError(e.to_string()))?;
        self.characters_cache.invalidate(&character_id).await;
        if rows == 0 {
            let exists = self
                .find_by_character_id(character_id)
                .await
                .map_err(|RepoError::StorageError(e)| RepoUpdateError::StorageError(e))?;
            if exists.is_none() {
                return Err(RepoUpdateError::NotFound);
            }
        }
        Ok(())
    }
}
