use std::sync::Arc;

use log::info;
use sandbox_app::{Application, build_application};
use sandbox_bungie_reqwest::{BungieHttpClient, ManifestDownloader};
use sandbox_manifest::{cache::ManifestCache, source::load_resolver};
use sandbox_persistence_sea_orm::{
    accounts::AccountRepositoryImpl, activities::ActivityRepositoryImpl, armor::ArmorRepositoryImpl,
    characters::CharacterRepositoryImpl, create_db_pool, equipment::EquipmentRepositoryImpl,
    schema::create_schema, stats::StatsRepositoryImpl, weapons::WeaponRepositoryImpl,
};

use crate::config::{Config, SyncMember};

mod config;
mod logs;

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received. Abandoning remaining sync work...");
}

async fn sync_member(app: Arc<Application>, config: Arc<Config>, member: SyncMember) {
    let result = app
        .sync_account_workflow
        .sync(
            member.destiny_id,
            member.platform,
            &config.sync_modes,
            config.sync_history_count,
        )
        .await;
    match result {
        Ok(summary) => info!(
            "Synced account {}: {} characters, {} equipped items, {} matches ({} missing), \
             {} stats created, {} duplicate, {} dropped",
            member.destiny_id,
            summary.characters,
            summary.equipped_items,
            summary.matches,
            summary.matches_missing,
            summary.stats_created,
            summary.stats_duplicate,
            summary.stats_dropped
        ),
        Err(e) => log::error!("Failed to sync account {}: {}", member.destiny_id, e),
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = Arc::new(Config::from_env().expect("Invalid configuration"));

    logs::init_logger(&config.log_file_path, &config.log_archive_pattern);

    let bungie_api = Arc::new(
        BungieHttpClient::new(
            config.bungie_api_root.clone(),
            config.bungie_api_key.clone(),
            config.bungie_timeout,
        )
        .expect("Failed to build HTTP client"),
    );

    let downloader = ManifestDownloader::new(
        bungie_api.as_ref().clone(),
        config.bungie_content_root.clone(),
        "en",
        config.manifest_timeout,
    )
    .expect("Failed to build manifest download client");
    let manifest_cache = ManifestCache::new(config.manifest_cache_path.clone());
    let resolver = Arc::new(
        load_resolver(&downloader, &manifest_cache)
            .await
            .expect("Failed to load manifest definitions"),
    );

    let db = create_db_pool(&config.database_url).await;
    create_schema(&db)
        .await
        .expect("Failed to create database schema");

    let app = Arc::new(build_application(
        bungie_api,
        resolver,
        Arc::new(AccountRepositoryImpl::new(db.clone())),
        Arc::new(CharacterRepositoryImpl::new(db.clone())),
        Arc::new(WeaponRepositoryImpl::new(db.clone())),
        Arc::new(ArmorRepositoryImpl::new(db.clone())),
        Arc::new(ActivityRepositoryImpl::new(db.clone())),
        Arc::new(EquipmentRepositoryImpl::new(db.clone())),
        Arc::new(StatsRepositoryImpl::new(db)),
    ));

    match app.account_manager.load_existing().await {
        Ok(count) => info!("Preloaded {} stored accounts", count),
        Err(e) => log::error!("Failed to preload stored accounts: {}", e),
    }

    info!(
        "Starting sync of {} accounts over modes {:?}",
        config.sync_members.len(),
        config.sync_modes
    );

    let tasks: Vec<_> = config
        .sync_members
        .iter()
        .map(|member| tokio::spawn(sync_member(app.clone(), config.clone(), *member)))
        .collect();

    tokio::select! {
        results = futures_util::future::join_all(tasks) => {
            for result in results {
                if let Err(e) = result {
                    log::error!("Sync task failed: {}", e);
                }
            }
            info!("Sync finished");
        }
        _ = shutdown_signal() => {}
    }
}
