use chrono::NaiveDate;
use sandbox_app::domain::{
    AccountRowId, CharacterId, DestinyId, RepoCreateError, RepoError, RepoUpdateError,
    account::{Account, AccountRepository, StoredAccount},
};
use sandbox_manifest::catalog::Platform;
use sea_orm::{DatabaseConnection, Set};

use crate::{
    commands::{InsertCommand, SelectCommand, UpdateCommand},
    entity::player,
};

pub struct AccountRepositoryImpl {
    db: DatabaseConnection,
    accounts_cache: moka::future::Cache<DestinyId, StoredAccount>,
}

impl AccountRepositoryImpl {
    pub fn new(db: DatabaseConnection) -> Self {
        let accounts_cache = moka::future::Cache::builder()
            .max_capacity(10_000)
            .time_to_live(std::time::Duration::from_secs(60 * 60))
            .build();
        Self { db, accounts_cache }
    }

    fn character_ids_to_json(character_ids: &[CharacterId]) -> serde_json::Value {
        serde_json::Value::Array(
            character_ids
                .iter()
                .map(|id| serde_json::Value::String(id.0.to_string()))
                .collect(),
        )
    }

    fn character_ids_from_json(value: serde_json::Value) -> Vec<CharacterId> {
        serde_json::from_value::<Vec<String>>(value)
            .unwrap_or_default()
            .iter()
            .filter_map(|id| id.parse().ok().map(CharacterId))
            .collect()
    }

    fn model_to_account(model: player::Model) -> Result<StoredAccount, RepoError> {
        let platform = Platform::from_name(&model.platform).ok_or_else(|| {
            RepoError::StorageError(format!(
                "Unknown platform {} for player {}",
                model.platform, model.player_id
            ))
        })?;
        Ok(StoredAccount {
            row_id: AccountRowId(model.player_id),
            account: Account {
                destiny_id: DestinyId(model.destiny_id),
                platform,
                bng_id: model.bng_id,
                bng_username: model.bng_username,
                date_created: model.date_created,
                date_last_played: model.date_last_played,
                character_ids: Self::character_ids_from_json(model.character_ids),
            },
        })
    }

    fn account_to_model(account: &Account) -> player::ActiveModel {
        player::ActiveModel {
            destiny_id: Set(account.destiny_id.0),
            bng_id: Set(account.bng_id),
            bng_username: Set(account.bng_username.clone()),
            date_created: Set(account.date_created),
            date_last_played: Set(account.date_last_played),
            platform: Set(account.platform.name().to_string()),
            character_ids: Set(Self::character_ids_to_json(&account.character_ids)),
            ..Default::default()
        }
    }
}

#[async_trait::async_trait]
impl AccountRepository for AccountRepositoryImpl {
    async fn find_by_destiny_id(
        &self,
        destiny_id: DestinyId,
    ) -> Result<Option<StoredAccount>, RepoError> {
        if let Some(cached) = self.accounts_cache.get(&destiny_id).await {
            return Ok(Some(cached));
        }
        let model = SelectCommand::<player::Entity>::new()
            .filter_eq(player::Column::DestinyId, destiny_id.0)
            .first(&self.db)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))?;
        let Some(model) = model else {
            return Ok(None);
        };
        let stored = Self::model_to_account(model)?;
        self.accounts_cache
            .insert(destiny_id, stored.clone())
            .await;
        Ok(Some(stored))
    }

    async fn insert_account(&self, account: &Account) -> Result<(), RepoCreateError> {
        let inserted = InsertCommand::new(Self::account_to_model(account))
            .unique_on([player::Column::DestinyId])
            .execute(&self.db)
            .await
            .map_err(|e| RepoCreateError::StorageError(e.to_string()))?;
        if !inserted {
            return Err(RepoCreateError::Conflict);
        }
        log::debug!("Inserted player {}", account.destiny_id);
        Ok(())
    }

    async fn update_last_played(
        &self,
        destiny_id: DestinyId,
        date_last_played: NaiveDate,
        character_ids: &[CharacterId],
    ) -> Result<(), RepoUpdateError> {
        let rows = UpdateCommand::<player::Entity>::new()
            .set(player::Column::DateLastPlayed, date_last_played)
            .set(
                player::Column::CharacterIds,
                Self::character_ids_to_json(character_ids),
            )
            .filter_eq(player::Column::DestinyId, destiny_id.0)
            .execute(&self.db)
            .await
            .map_err(|e| RepoUpdateError::StorageError(e.to_string()))?;
        self.accounts_cache.invalidate(&destiny_id).await;
        if rows == 0 {
            // an unchanged row may report zero affected rows
            let exists = self
                .find_by_destiny_id(destiny_id)
                .await
                .map_err(|RepoError::StorageError(e)| RepoUpdateError::StorageError(e))?;
            if exists.is_none() {
                return Err(RepoUpdateError::NotFound);
            }
        }
        Ok(())
    }

    async fn list_accounts(&self) -> Result<Vec<StoredAccount>, RepoError> {
        let models = SelectCommand::<player::Entity>::new()
            .execute(&self.db)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))?;
        models.into_iter().map(Self::model_to_account).collect()
    }
}
