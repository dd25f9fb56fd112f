//! Shapes of the upstream JSON payloads this crate reads.
//!
//! Only the fields the builders need are modelled. Ids arrive as decimal
//! strings upstream, so they are parsed through [`id_from_value`].

use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;

/// Accepts an id encoded either as a JSON string or as a JSON integer.
pub fn id_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_i64(),
        _ => None,
    }
}

fn de_id<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    id_from_value(&value).ok_or_else(|| serde::de::Error::custom(format!("invalid id {}", value)))
}

fn de_ids<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<Vec<i64>, D::Error> {
    let values = Vec::<Value>::deserialize(deserializer)?;
    values
        .iter()
        .map(|v| {
            id_from_value(v)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid id {}", v)))
        })
        .collect()
}

/// Decodes a payload, logging and discarding it when its shape is off.
pub fn decode<T: DeserializeOwned>(value: Value, what: &str) -> Option<T> {
    match serde_json::from_value(value) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            log::warn!("Malformed {} payload: {}", what, e);
            None
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipPayload {
    pub bungie_net_user: BungieNetUser,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BungieNetUser {
    #[serde(deserialize_with = "de_id")]
    pub membership_id: i64,
    pub unique_name: String,
    pub first_access: String,
}

#[derive(Debug, Deserialize)]
pub struct ProfilePayload {
    pub profile: ProfileComponent,
}

#[derive(Debug, Deserialize)]
pub struct ProfileComponent {
    pub data: ProfileData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileData {
    pub date_last_played: String,
    #[serde(deserialize_with = "de_ids")]
    pub character_ids: Vec<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CharacterPayload {
    pub character: CharacterComponent,
}

#[derive(Debug, Deserialize)]
pub struct CharacterComponent {
    pub data: CharacterData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterData {
    pub class_type: u32,
    pub date_last_played: String,
}

#[derive(Debug, Deserialize)]
pub struct EquipmentPayload {
    pub equipment: EquipmentComponent,
}

#[derive(Debug, Deserialize)]
pub struct EquipmentComponent {
    pub data: EquipmentData,
}

#[derive(Debug, Deserialize)]
pub struct EquipmentData {
    #[serde(default)]
    pub items: Vec<Value>,
}

impl EquipmentData {
    /// Item hashes in slot order, up to the first entry without one.
    pub fn item_hashes(&self) -> Vec<u32> {
        self.items
            .iter()
            .map_while(|item| {
                item.get("itemHash")
                    .and_then(Value::as_u64)
                    .and_then(|h| u32::try_from(h).ok())
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct ActivityHistoryPayload {
    #[serde(default)]
    pub activities: Vec<HistoryEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub activity_details: HistoryActivityDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryActivityDetails {
    #[serde(deserialize_with = "de_id")]
    pub instance_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfoCard {
    #[serde(deserialize_with = "de_id")]
    pub membership_id: i64,
    pub membership_type: u32,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarnageReport {
    pub activity_details: ReportActivityDetails,
    #[serde(default)]
    pub entries: Vec<Value>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportActivityDetails {
    pub director_activity_hash: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPlayer {
    pub destiny_user_info: DestinyUserInfo,
    pub class_hash: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinyUserInfo {
    #[serde(deserialize_with = "de_id")]
    pub membership_id: i64,
    pub membership_type: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeaponUsage {
    pub reference_id: u32,
    pub values: WeaponUsageValues,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeaponUsageValues {
    pub unique_weapon_kills: ReportValue,
    pub unique_weapon_precision_kills: ReportValue,
}

#[derive(Debug, Deserialize)]
pub struct ReportValue {
    pub basic: BasicValue,
}

#[derive(Debug, Deserialize)]
pub struct BasicValue {
    pub value: f64,
}

impl ReportValue {
    /// Counts are reported as floats; anything that is not a whole,
    /// non-negative number is rejected.
    pub fn as_count(&self) -> Option<u32> {
        let value = self.basic.value;
        if !value.is_finite()
            || value < 0.0
            || value.fract() != 0.0
            || value > f64::from(u32::MAX)
        {
            return None;
        }
        Some(value as u32)
    }
}
