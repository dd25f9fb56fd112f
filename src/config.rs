use std::{path::PathBuf, time::Duration};

use sandbox_app::domain::DestinyId;
use sandbox_manifest::catalog::{ActivityMode, Platform};
use thiserror::Error;

const DEFAULT_API_ROOT: &str = "https://www.bungie.net/Platform";
const DEFAULT_CONTENT_ROOT: &str = "https://www.bungie.net";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_MANIFEST_TIMEOUT_SECS: u64 = 600;
const DEFAULT_MANIFEST_CACHE_PATH: &str = "manifest-cache.json";
const DEFAULT_HISTORY_COUNT: u32 = 25;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// An account the sync job keeps up to date.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SyncMember {
    pub destiny_id: DestinyId,
    pub platform: Platform,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub bungie_api_key: String,
    pub bungie_api_root: String,
    pub bungie_content_root: String,
    pub bungie_timeout: Duration,
    /// Bounds each whole definition table download.
    pub manifest_timeout: Duration,
    pub manifest_cache_path: PathBuf,
    pub database_url: String,
    pub log_file_path: String,
    pub log_archive_pattern: String,
    pub sync_members: Vec<SyncMember>,
    pub sync_modes: Vec<ActivityMode>,
    pub sync_history_count: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| lookup(name).ok_or(ConfigError::Missing(name));
        let or_default = |name: &str, default: &str| lookup(name).unwrap_or(default.to_string());

        let bungie_timeout = match lookup("BUNGIE_TIMEOUT_SECS") {
            Some(value) => Duration::from_secs(parse("BUNGIE_TIMEOUT_SECS", &value)?),
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };
        let manifest_timeout = match lookup("MANIFEST_TIMEOUT_SECS") {
            Some(value) => Duration::from_secs(parse("MANIFEST_TIMEOUT_SECS", &value)?),
            None => Duration::from_secs(DEFAULT_MANIFEST_TIMEOUT_SECS),
        };
        let sync_history_count = match lookup("SYNC_HISTORY_COUNT") {
            Some(value) => parse("SYNC_HISTORY_COUNT", &value)?,
            None => DEFAULT_HISTORY_COUNT,
        };
        let sync_members = match lookup("SYNC_MEMBERS") {
            Some(value) => parse_members(&value)?,
            None => Vec::new(),
        };
        let sync_modes = match lookup("SYNC_MODES") {
            Some(value) => parse_modes(&value)?,
            None => vec![ActivityMode::AllPvE, ActivityMode::AllPvP],
        };

        Ok(Config {
            bungie_api_key: required("BUNGIE_API_KEY")?,
            bungie_api_root: or_default("BUNGIE_API_ROOT", DEFAULT_API_ROOT),
            bungie_content_root: or_default("BUNGIE_CONTENT_ROOT", DEFAULT_CONTENT_ROOT),
            bungie_timeout,
            manifest_timeout,
            manifest_cache_path: PathBuf::from(or_default(
                "MANIFEST_CACHE_PATH",
                DEFAULT_MANIFEST_CACHE_PATH,
            )),
            database_url: sandbox_persistence_sea_orm::database_url(&lookup)
                .map_err(ConfigError::Missing)?,
            log_file_path: required("LOG_FILE_PATH")?,
            log_archive_pattern: required("LOG_ARCHIVE_PATTERN")?,
            sync_members,
            sync_modes,
            sync_history_count,
        })
    }
}

fn parse<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: value.to_string(),
    })
}

/// `membershipId:platform` pairs, comma separated. The platform is either its
/// numeric code or its name.
fn parse_members(value: &str) -> Result<Vec<SyncMember>, ConfigError> {
    let invalid = || ConfigError::Invalid {
        name: "SYNC_MEMBERS",
        value: value.to_string(),
    };
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (id, platform) = entry.split_once(':').ok_or_else(invalid)?;
            let destiny_id = DestinyId(id.trim().parse().map_err(|_| invalid())?);
            let platform = platform.trim();
            let platform = match platform.parse::<u32>() {
                Ok(code) => Platform::from_code(code),
                Err(_) => Platform::from_name(&platform.to_uppercase()),
            }
            .ok_or_else(invalid)?;
            Ok(SyncMember {
                destiny_id,
                platform,
            })
        })
        .collect()
}

fn parse_modes(value: &str) -> Result<Vec<ActivityMode>, ConfigError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(|code| {
            code.parse::<u32>()
                .ok()
                .and_then(ActivityMode::from_code)
                .ok_or_else(|| ConfigError::Invalid {
                    name: "SYNC_MODES",
                    value: code.to_string(),
                })
        })
        .collect()
}
