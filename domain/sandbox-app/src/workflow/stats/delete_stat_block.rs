use std::sync::Arc;

use crate::{
    domain::{
        CharacterId, InstanceId,
        character::CharacterRepository,
        stats::{StatsRepository, StoredStat},
    },
    services::stat_cache::StatBlockCache,
};

#[derive(Clone, Debug, PartialEq)]
pub enum DeleteStatBlockOutcome {
    Deleted(Vec<StoredStat>),
    NotFound,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeleteStatBlockError {
    StorageError(String),
}

impl std::fmt::Display for DeleteStatBlockError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeleteStatBlockError::StorageError(e) => write!(f, "Storage error: {}", e),
        }
    }
}

#[async_trait::async_trait]
pub trait DeleteStatBlockWorkflow {
    async fn delete_stat_block(
        &self,
        character_id: CharacterId,
        instance_id: InstanceId,
    ) -> Result<DeleteStatBlockOutcome, DeleteStatBlockError>;
}

pub struct DeleteStatBlockWorkflowImpl<
    C: CharacterRepository,
    S: StatsRepository,
    SC: StatBlockCache,
> {
    character_repository: Arc<C>,
    stats_repository: Arc<S>,
    stat_cache: Arc<SC>,
}

impl<C: CharacterRepository, S: StatsRepository, SC: StatBlockCache>
    DeleteStatBlockWorkflowImpl<C, S, SC>
{
    pub fn new(
        character_repository: Arc<C>,
        stats_repository: Arc<S>,
        stat_cache: Arc<SC>,
    ) -> Self {
        Self {
            character_repository,
            stats_repository,
            stat_cache,
        }
    }
}

#[async_trait::async_trait]
impl<
    C: CharacterRepository + Send + Sync + 'static,
    S: StatsRepository + Send + Sync + 'static,
    SC: StatBlockCache + Send + Sync + 'static,
> DeleteStatBlockWorkflow for DeleteStatBlockWorkflowImpl<C, S, SC>
{
    async fn delete_stat_block(
        &self,
        character_id: CharacterId,
        instance_id: InstanceId,
    ) -> Result<DeleteStatBlockOutcome, DeleteStatBlockError> {
        let storage_error = |e: crate::domain::RepoError| {
            log::error!(
                "Failed to delete stats of character {} in match {}: {}",
                character_id,
                instance_id,
                e
            );
            DeleteStatBlockError::StorageError(e.to_string())
        };

        let Some(character) = self
            .character_repository
            .find_by_character_id(character_id)
            .await
            .map_err(storage_error)?
        else {
            return Ok(DeleteStatBlockOutcome::NotFound);
        };
        let rows = self
            .stats_repository
            .find_by_character_instance(character.row_id, instance_id)
            .await
            .map_err(storage_error)?;
        if rows.is_empty() {
            return Ok(DeleteStatBlockOutcome::NotFound);
        }

        self.stats_repository
            .delete_by_character_instance(character.row_id, instance_id)
            .await
            .map_err(storage_error)?;
        self.stat_cache.remove(character.row_id, instance_id);

        log::info!(
            "Deleted {} stat rows of character {} in match {}",
            rows.len(),
            character_id,
            instance_id
        );
        Ok(DeleteStatBlockOutcome::Deleted(rows))
    }
}
