use std::{collections::HashSet, sync::Arc};

use sandbox_manifest::catalog::{ActivityMode, Platform};

use crate::{
    domain::{DestinyId, InstanceId},
    services::{
        EnsureError, account::AccountManager, character::CharacterManager,
        equipment::EquipmentManager,
    },
    workflow::stats::add_stat_block::{AddStatBlockOutcome, AddStatBlockWorkflow},
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub characters: usize,
    pub equipped_items: usize,
    pub matches: usize,
    pub matches_missing: usize,
    pub stats_created: usize,
    pub stats_duplicate: usize,
    pub stats_dropped: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SyncAccountError {
    AccountUnavailable(EnsureError),
    StorageError(String),
}

impl std::fmt::Display for SyncAccountError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncAccountError::AccountUnavailable(e) => write!(f, "Account unavailable: {}", e),
            SyncAccountError::StorageError(e) => write!(f, "Storage error: {}", e),
        }
    }
}

#[async_trait::async_trait]
pub trait SyncAccountWorkflow {
    /// Pulls an account, its characters and their equipment, then stores the
    /// stats of every match in the requested history.
    async fn sync(
        &self,
        destiny_id: DestinyId,
        platform: Platform,
        modes: &[ActivityMode],
        count: u32,
    ) -> Result<SyncSummary, SyncAccountError>;
}

pub struct SyncAccountWorkflowImpl<
    P: AccountManager,
    C: CharacterManager,
    E: EquipmentManager,
    S: AddStatBlockWorkflow,
> {
    account_manager: Arc<P>,
    character_manager: Arc<C>,
    equipment_manager: Arc<E>,
    add_stat_block: Arc<S>,
}

impl<P: AccountManager, C: CharacterManager, E: EquipmentManager, S: AddStatBlockWorkflow>
    SyncAccountWorkflowImpl<P, C, E, S>
{
    pub fn new(
        account_manager: Arc<P>,
        character_manager: Arc<C>,
        equipment_manager: Arc<E>,
        add_stat_block: Arc<S>,
    ) -> Self {
        Self {
            account_manager,
            character_manager,
            equipment_manager,
            add_stat_block,
        }
    }
}

impl<
    P: AccountManager + Send + Sync + 'static,
    C: CharacterManager + Send + Sync + 'static,
    E: EquipmentManager + Send + Sync + 'static,
    S: AddStatBlockWorkflow + Send + Sync + 'static,
> SyncAccountWorkflowImpl<P, C, E, S>
{
    async fn ingest_match(&self, instance_id: InstanceId, summary: &mut SyncSummary) {
        summary.matches += 1;
        match self.add_stat_block.add_stat_block(instance_id, None).await {
            Ok(AddStatBlockOutcome::CreatedBatch(batch)) => {
                summary.stats_created += batch.created;
                summary.stats_duplicate += batch.duplicates;
                summary.stats_dropped += batch.dropped;
            }
            Ok(AddStatBlockOutcome::Created(_)) => summary.stats_created += 1,
            Ok(AddStatBlockOutcome::Duplicate) => summary.stats_duplicate += 1,
            Ok(AddStatBlockOutcome::NotFound) => summary.matches_missing += 1,
            Err(e) => {
                log::error!("Failed to ingest match {}: {}", instance_id, e);
                summary.matches_missing += 1;
            }
        }
    }
}

#[async_trait::async_trait]
impl<
    P: AccountManager + Send + Sync + 'static,
    C: CharacterManager + Send + Sync + 'static,
    E: EquipmentManager + Send + Sync + 'static,
    S: AddStatBlockWorkflow + Send + Sync + 'static,
> SyncAccountWorkflow for SyncAccountWorkflowImpl<P, C, E, S>
{
    async fn sync(
        &self,
        destiny_id: DestinyId,
        platform: Platform,
        modes: &[ActivityMode],
        count: u32,
    ) -> Result<SyncSummary, SyncAccountError> {
        let known = self.account_manager.cached(destiny_id).is_some();
        let account_row = self
            .account_manager
            .ensure(destiny_id, platform)
            .await
            .map_err(SyncAccountError::AccountUnavailable)?;
        if known {
            if let Err(e) = self
                .account_manager
                .refresh_last_played(destiny_id, platform)
                .await
            {
                log::warn!("Could not refresh account {}: {}", destiny_id, e);
            }
        }
        let character_ids = self
            .account_manager
            .character_and_account_ids(destiny_id)
            .await
            .map_err(|e| SyncAccountError::StorageError(e.to_string()))?
            .map(|(character_ids, _)| character_ids)
            .unwrap_or_default();

        let mut summary = SyncSummary::default();
        let mut seen = HashSet::new();
        for character_id in character_ids {
            if let Err(e) = self
                .character_manager
                .add_new(destiny_id, platform, character_id, account_row)
                .await
            {
                log::warn!("Skipping character {} of {}: {}", character_id, destiny_id, e);
                continue;
            }
            summary.characters += 1;

            match self
                .equipment_manager
                .add_character_equipment(character_id)
                .await
            {
                Ok(equipment) => summary.equipped_items += equipment.weapons + equipment.armor,
                Err(e) => log::warn!("No equipment stored for character {}: {}", character_id, e),
            }

            for mode in modes {
                let history = self
                    .character_manager
                    .activity_history(character_id, *mode, count)
                    .await;
                for instance_id in history {
                    if seen.insert(instance_id) {
                        self.ingest_match(instance_id, &mut summary).await;
                    }
                }
            }
        }

        log::info!(
            "Synced account {}: {} characters, {} matches, {} stats created",
            destiny_id,
            summary.characters,
            summary.matches,
            summary.stats_created
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{
        domain::CharacterId,
        ports::bungie::endpoints,
        testing::{ReportFixture, TestApp, account_fixture, character_fixture},
    };

    #[tokio::test]
    async fn test_sync_stores_equipment_and_history() {
        let app = TestApp::new();
        account_fixture(&app.api, DestinyId(4611), Platform::Steam, &[1102]);
        character_fixture(
            &app.api,
            DestinyId(4611),
            Platform::Steam,
            CharacterId(1102),
            &[1666, 1777, 1888, 7, 8, 9, 10, 11],
        );
        app.api.respond(
            endpoints::activity_history(
                DestinyId(4611),
                Platform::Steam,
                CharacterId(1102),
                ActivityMode::AllPvP,
                5,
            ),
            json!({"activities": [
                {"activityDetails": {"instanceId": "555"}},
                {"activityDetails": {"instanceId": "404"}}
            ]}),
        );
        ReportFixture::new(555, 2693136600)
            .participant(1102, 4611, 3, 671679327)
            .weapon(1102, 1666, 10.0, 3.0)
            .install(&app.api);

        let summary = app
            .sync
            .sync(DestinyId(4611), Platform::Steam, &[ActivityMode::AllPvP], 5)
            .await
            .unwrap();

        assert_eq!(summary.characters, 1);
        assert_eq!(summary.matches, 2);
        assert_eq!(summary.matches_missing, 1);
        assert_eq!(summary.stats_created, 1);
        // 1888 and the armor hashes past 7 are not in the manifest fixture.
        assert_eq!(summary.equipped_items, 3);
        assert_eq!(app.store.equipped_weapon_count(), 2);
        assert_eq!(app.store.equipped_armor_count(), 1);
    }

    #[tokio::test]
    async fn test_sync_unknown_account() {
        let app = TestApp::new();
        let result = app
            .sync
            .sync(DestinyId(1), Platform::Steam, &[ActivityMode::AllPvP], 5)
            .await;
        assert_eq!(
            result,
            Err(SyncAccountError::AccountUnavailable(EnsureError::NotResolved))
        );
    }
}
