use std::sync::Arc;

use sandbox_manifest::DefinitionResolver;

use crate::{
    domain::{
        account::AccountRepository, activity::ActivityRepository, armor::ArmorRepository,
        character::CharacterRepository, equipment::EquipmentRepository, stats::StatsRepository,
        weapon::WeaponRepository,
    },
    ports::bungie::BungieApiPort,
    services::{
        account::{AccountManager, AccountManagerImpl},
        activity::ActivityManagerImpl,
        armor::{ArmorManager, ArmorManagerImpl},
        character::{CharacterManager, CharacterManagerImpl},
        equipment::{EquipmentManager, EquipmentManagerImpl},
        stat_cache::StatBlockCacheImpl,
        weapon::{WeaponManager, WeaponManagerImpl},
    },
    workflow::{
        account::sync::{SyncAccountWorkflow, SyncAccountWorkflowImpl},
        stats::{
            add_stat_block::{AddStatBlockWorkflow, AddStatBlockWorkflowImpl},
            delete_stat_block::{DeleteStatBlockWorkflow, DeleteStatBlockWorkflowImpl},
        },
    },
};

pub mod domain;
pub mod ports;
pub mod services;
pub mod workflow;

#[cfg(test)]
mod testing;

pub struct Application {
    pub add_stat_block_workflow: Arc<dyn AddStatBlockWorkflow + Send + Sync>,
    pub delete_stat_block_workflow: Box<dyn DeleteStatBlockWorkflow + Send + Sync>,
    pub sync_account_workflow: Box<dyn SyncAccountWorkflow + Send + Sync>,

    pub account_manager: Arc<dyn AccountManager + Send + Sync>,
    pub character_manager: Arc<dyn CharacterManager + Send + Sync>,
    pub weapon_manager: Arc<dyn WeaponManager + Send + Sync>,
    pub armor_manager: Arc<dyn ArmorManager + Send + Sync>,
    pub equipment_manager: Arc<dyn EquipmentManager + Send + Sync>,
}

pub fn build_application<
    B: BungieApiPort + Send + Sync + 'static,
    P: AccountRepository + Send + Sync + 'static,
    C: CharacterRepository + Send + Sync + 'static,
    W: WeaponRepository + Send + Sync + 'static,
    AR: ArmorRepository + Send + Sync + 'static,
    AC: ActivityRepository + Send + Sync + 'static,
    E: EquipmentRepository + Send + Sync + 'static,
    S: StatsRepository + Send + Sync + 'static,
>(
    bungie_api: Arc<B>,
    resolver: Arc<DefinitionResolver>,
    account_repository: Arc<P>,
    character_repository: Arc<C>,
    weapon_repository: Arc<W>,
    armor_repository: Arc<AR>,
    activity_repository: Arc<AC>,
    equipment_repository: Arc<E>,
    stats_repository: Arc<S>,
) -> Application {
    let stat_cache = Arc::new(StatBlockCacheImpl::new());

    let account_manager = Arc::new(AccountManagerImpl::new(
        bungie_api.clone(),
        account_repository,
    ));
    let character_manager = Arc::new(CharacterManagerImpl::new(
        bungie_api.clone(),
        character_repository.clone(),
    ));
    let weapon_manager = Arc::new(WeaponManagerImpl::new(resolver.clone(), weapon_repository));
    let armor_manager = Arc::new(ArmorManagerImpl::new(resolver.clone(), armor_repository));
    let activity_manager = Arc::new(ActivityManagerImpl::new(
        resolver.clone(),
        activity_repository,
    ));
    let equipment_manager = Arc::new(EquipmentManagerImpl::new(
        resolver.clone(),
        character_manager.clone(),
        weapon_manager.clone(),
        armor_manager.clone(),
        equipment_repository,
    ));

    let add_stat_block_workflow = Arc::new(AddStatBlockWorkflowImpl::new(
        bungie_api,
        resolver,
        stats_repository.clone(),
        activity_manager,
        weapon_manager.clone(),
        account_manager.clone(),
        character_manager.clone(),
        stat_cache.clone(),
    ));

    Application {
        delete_stat_block_workflow: Box::new(DeleteStatBlockWorkflowImpl::new(
            character_repository,
            stats_repository,
            stat_cache,
        )),
        sync_account_workflow: Box::new(SyncAccountWorkflowImpl::new(
            account_manager.clone(),
            character_manager.clone(),
            equipment_manager.clone(),
            add_stat_block_workflow.clone(),
        )),
        add_stat_block_workflow,
        account_manager,
        character_manager,
        weapon_manager,
        armor_manager,
        equipment_manager,
    }
}
