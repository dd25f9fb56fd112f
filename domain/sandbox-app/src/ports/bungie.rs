use sandbox_manifest::catalog::{ActivityMode, Platform};
use serde_json::Value;

use crate::domain::{CharacterId, DestinyId, InstanceId};

#[derive(Clone, Debug, PartialEq)]
pub enum BungieRequest {
    Get { path: String },
    Post { path: String, body: Value },
}

impl BungieRequest {
    pub fn get(path: impl Into<String>) -> Self {
        BungieRequest::Get { path: path.into() }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        BungieRequest::Post {
            path: path.into(),
            body,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            BungieRequest::Get { path } | BungieRequest::Post { path, .. } => path,
        }
    }
}

/// Outbound port to the platform API.
///
/// Implementations unwrap the response envelope and return its `Response`
/// member. Transport errors, non-success status codes and non-success
/// envelopes all collapse to `None`.
#[async_trait::async_trait]
pub trait BungieApiPort {
    async fn fetch_json(&self, request: BungieRequest) -> Option<Value>;
}

pub mod endpoints {
    use super::*;

    pub fn memberships(destiny_id: DestinyId, platform: Platform) -> BungieRequest {
        BungieRequest::get(format!(
            "/User/GetMembershipsById/{}/{}/",
            destiny_id,
            platform.code()
        ))
    }

    pub fn profile(destiny_id: DestinyId, platform: Platform) -> BungieRequest {
        BungieRequest::get(format!(
            "/Destiny2/{}/Profile/{}/?components=100",
            platform.code(),
            destiny_id
        ))
    }

    pub fn character(
        destiny_id: DestinyId,
        platform: Platform,
        character_id: CharacterId,
    ) -> BungieRequest {
        BungieRequest::get(format!(
            "/Destiny2/{}/Profile/{}/Character/{}/?components=Characters",
            platform.code(),
            destiny_id,
            character_id
        ))
    }

    pub fn equipment(
        destiny_id: DestinyId,
        platform: Platform,
        character_id: CharacterId,
    ) -> BungieRequest {
        BungieRequest::get(format!(
            "/Destiny2/{}/Profile/{}/Character/{}/?components=CharacterEquipment",
            platform.code(),
            destiny_id,
            character_id
        ))
    }

    pub fn activity_history(
        destiny_id: DestinyId,
        platform: Platform,
        character_id: CharacterId,
        mode: ActivityMode,
        count: u32,
    ) -> BungieRequest {
        BungieRequest::get(format!(
            "/Destiny2/{}/Account/{}/Character/{}/Stats/Activities/?count={}&mode={}&page=1",
            platform.code(),
            destiny_id,
            character_id,
            count,
            mode.code()
        ))
    }

    pub fn carnage_report(instance_id: InstanceId) -> BungieRequest {
        BungieRequest::get(format!(
            "/Destiny2/Stats/PostGameCarnageReport/{}/",
            instance_id
        ))
    }

    pub fn search_by_bungie_name(
        platform: Platform,
        display_name: &str,
        display_name_code: u16,
    ) -> BungieRequest {
        BungieRequest::post(
            format!(
                "/Destiny2/SearchDestinyPlayerByBungieName/{}/",
                platform.code()
            ),
            serde_json::json!({
                "displayName": display_name,
                "displayNameCode": display_name_code,
            }),
        )
    }
}
