use std::{collections::HashSet, sync::Arc};

use sandbox_manifest::DefinitionResolver;

use crate::{
    domain::{
        CharacterId, InstanceId, RepoCreateError,
        report::MatchStatExtractor,
        stats::{MatchStatRecord, StatRowKeys, StatsRepository, StoredStat},
    },
    ports::bungie::BungieApiPort,
    services::{
        EnsureError, account::AccountManager, activity::ActivityManager,
        character::CharacterManager, stat_cache::StatBlockCache, weapon::WeaponManager,
    },
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub created: usize,
    pub duplicates: usize,
    pub dropped: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub enum AddStatBlockOutcome {
    /// A scoped call wrote this row.
    Created(StoredStat),
    /// An unscoped call went through every participant of the match.
    CreatedBatch(BatchSummary),
    Duplicate,
    NotFound,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AddStatBlockError {
    StorageError(String),
}

impl std::fmt::Display for AddStatBlockError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AddStatBlockError::StorageError(e) => write!(f, "Storage error: {}", e),
        }
    }
}

#[async_trait::async_trait]
pub trait AddStatBlockWorkflow {
    /// Stores the stats of one match. With a scope character only that
    /// character's stats are stored, and a match already stored for it is
    /// reported as a duplicate before anything is fetched.
    async fn add_stat_block(
        &self,
        instance_id: InstanceId,
        scope: Option<CharacterId>,
    ) -> Result<AddStatBlockOutcome, AddStatBlockError>;
}

enum RecordWrite {
    Written(StoredStat),
    Duplicate,
    Dropped,
}

pub struct AddStatBlockWorkflowImpl<
    B: BungieApiPort,
    S: StatsRepository,
    AC: ActivityManager,
    W: WeaponManager,
    P: AccountManager,
    C: CharacterManager,
    SC: StatBlockCache,
> {
    extractor: MatchStatExtractor<B>,
    stats_repository: Arc<S>,
    activity_manager: Arc<AC>,
    weapon_manager: Arc<W>,
    account_manager: Arc<P>,
    character_manager: Arc<C>,
    stat_cache: Arc<SC>,
}

impl<
    B: BungieApiPort + Send + Sync + 'static,
    S: StatsRepository,
    AC: ActivityManager,
    W: WeaponManager,
    P: AccountManager,
    C: CharacterManager,
    SC: StatBlockCache,
> AddStatBlockWorkflowImpl<B, S, AC, W, P, C, SC>
{
    pub fn new(
        bungie_api: Arc<B>,
        resolver: Arc<DefinitionResolver>,
        stats_repository: Arc<S>,
        activity_manager: Arc<AC>,
        weapon_manager: Arc<W>,
        account_manager: Arc<P>,
        character_manager: Arc<C>,
        stat_cache: Arc<SC>,
    ) -> Self {
        Self {
            extractor: MatchStatExtractor::new(bungie_api, resolver),
            stats_repository,
            activity_manager,
            weapon_manager,
            account_manager,
            character_manager,
            stat_cache,
        }
    }
}

impl<
    B: BungieApiPort + Send + Sync + 'static,
    S: StatsRepository + Send + Sync + 'static,
    AC: ActivityManager + Send + Sync + 'static,
    W: WeaponManager + Send + Sync + 'static,
    P: AccountManager + Send + Sync + 'static,
    C: CharacterManager + Send + Sync + 'static,
    SC: StatBlockCache + Send + Sync + 'static,
> AddStatBlockWorkflowImpl<B, S, AC, W, P, C, SC>
{
    /// Rows of this match already stored for the character, found through
    /// stored natural keys only.
    async fn stored_block(
        &self,
        character_id: CharacterId,
        instance_id: InstanceId,
    ) -> Result<Vec<StoredStat>, AddStatBlockError> {
        let character = self
            .character_manager
            .find_stored(character_id)
            .await
            .map_err(|e| AddStatBlockError::StorageError(e.to_string()))?;
        let Some(character) = character else {
            return Ok(Vec::new());
        };
        self.stats_repository
            .find_by_character_instance(character.row_id, instance_id)
            .await
            .map_err(|e| AddStatBlockError::StorageError(e.to_string()))
    }

    async fn resolve_keys(&self, record: &MatchStatRecord) -> Result<StatRowKeys, EnsureError> {
        let participant = record.participant;
        let activity = self.activity_manager.ensure(record.activity_hash).await?;
        let weapon = self.weapon_manager.ensure(record.weapon_hash).await?;
        let account = self
            .account_manager
            .ensure(participant.destiny_id, participant.platform)
            .await?;
        let character = self
            .character_manager
            .ensure(
                participant.destiny_id,
                participant.platform,
                record.character_id,
                account,
            )
            .await?;
        Ok(StatRowKeys {
            character,
            activity,
            weapon,
        })
    }

    async fn write_record(&self, record: &MatchStatRecord) -> RecordWrite {
        let keys = match self.resolve_keys(record).await {
            Ok(keys) => keys,
            Err(e) => {
                log::warn!(
                    "Dropping stats of character {} weapon {} in match {}: {}",
                    record.character_id,
                    record.weapon_hash,
                    record.instance_id,
                    e
                );
                return RecordWrite::Dropped;
            }
        };
        match self.stats_repository.insert_stat(keys, record).await {
            Ok(stored) => {
                self.stat_cache.record(stored.clone());
                RecordWrite::Written(stored)
            }
            Err(RepoCreateError::Conflict) => RecordWrite::Duplicate,
            Err(RepoCreateError::StorageError(e)) => {
                log::error!(
                    "Failed to store stats of character {} weapon {} in match {}: {}",
                    record.character_id,
                    record.weapon_hash,
                    record.instance_id,
                    e
                );
                RecordWrite::Dropped
            }
        }
    }

    async fn add_scoped(
        &self,
        instance_id: InstanceId,
        scope: CharacterId,
    ) -> Result<AddStatBlockOutcome, AddStatBlockError> {
        if !self.stored_block(scope, instance_id).await?.is_empty() {
            return Ok(AddStatBlockOutcome::Duplicate);
        }
        let Some(instance) = self.extractor.fetch_instance(instance_id).await else {
            return Ok(AddStatBlockOutcome::NotFound);
        };
        let records = self.extractor.create_stat_records(Arc::new(instance)).await;

        for record in records.iter().filter(|r| r.character_id == scope) {
            match self.write_record(record).await {
                RecordWrite::Written(stored) => return Ok(AddStatBlockOutcome::Created(stored)),
                RecordWrite::Duplicate => return Ok(AddStatBlockOutcome::Duplicate),
                RecordWrite::Dropped => {}
            }
        }
        Ok(AddStatBlockOutcome::NotFound)
    }

    async fn add_unscoped(
        &self,
        instance_id: InstanceId,
    ) -> Result<AddStatBlockOutcome, AddStatBlockError> {
        let Some(instance) = self.extractor.fetch_instance(instance_id).await else {
            return Ok(AddStatBlockOutcome::NotFound);
        };
        let records = self.extractor.create_stat_records(Arc::new(instance)).await;

        let mut summary = BatchSummary::default();
        let mut written: HashSet<CharacterId> = HashSet::new();
        let mut already_stored: HashSet<CharacterId> = HashSet::new();

        for record in &records {
            if already_stored.contains(&record.character_id) {
                summary.duplicates += 1;
                continue;
            }
            if !written.contains(&record.character_id) {
                match self.stored_block(record.character_id, instance_id).await {
                    Ok(block) if !block.is_empty() => {
                        already_stored.insert(record.character_id);
                        summary.duplicates += 1;
                        continue;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        log::error!(
                            "Failed to check stored stats of character {} in match {}: {}",
                            record.character_id,
                            instance_id,
                            e
                        );
                        summary.dropped += 1;
                        continue;
                    }
                }
            }
            match self.write_record(record).await {
                RecordWrite::Written(_) => {
                    written.insert(record.character_id);
                    summary.created += 1;
                }
                RecordWrite::Duplicate => summary.duplicates += 1,
                RecordWrite::Dropped => summary.dropped += 1,
            }
        }
        Ok(AddStatBlockOutcome::CreatedBatch(summary))
    }
}

#[async_trait::async_trait]
impl<
    B: BungieApiPort + Send + Sync + 'static,
    S: StatsRepository + Send + Sync + 'static,
    AC: ActivityManager + Send + Sync + 'static,
    W: WeaponManager + Send + Sync + 'static,
    P: AccountManager + Send + Sync + 'static,
    C: CharacterManager + Send + Sync + 'static,
    SC: StatBlockCache + Send + Sync + 'static,
> AddStatBlockWorkflow for AddStatBlockWorkflowImpl<B, S, AC, W, P, C, SC>
{
    async fn add_stat_block(
        &self,
        instance_id: InstanceId,
        scope: Option<CharacterId>,
    ) -> Result<AddStatBlockOutcome, AddStatBlockError> {
        let outcome = match scope {
            Some(character_id) => self.add_scoped(instance_id, character_id).await?,
            None => self.add_unscoped(instance_id).await?,
        };
        match &outcome {
            AddStatBlockOutcome::Created(stored) => log::info!(
                "Stored stats of match {} for character row {}",
                instance_id,
                stored.keys.character.0
            ),
            AddStatBlockOutcome::CreatedBatch(summary) => log::info!(
                "Stored match {}: {} created, {} duplicate, {} dropped",
                instance_id,
                summary.created,
                summary.duplicates,
                summary.dropped
            ),
            AddStatBlockOutcome::Duplicate => log::info!("Match {} already stored", instance_id),
            AddStatBlockOutcome::NotFound => log::info!("Match {} yielded no stats", instance_id),
        }
        Ok(outcome)
    }
}
