use sandbox_manifest::catalog::Platform;

use crate::domain::{
    ActivityHash, ActivityRowId, CharacterId, CharacterRowId, DestinyId, InstanceId, ItemHash,
    RepoCreateError, RepoError, WeaponRowId,
};

/// Identity of the account a match participant plays on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Participant {
    pub destiny_id: DestinyId,
    pub platform: Platform,
}

/// Performance of one character with one weapon in one match.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchStatRecord {
    pub instance_id: InstanceId,
    pub activity_hash: ActivityHash,
    pub character_id: CharacterId,
    pub weapon_hash: ItemHash,
    pub participant: Participant,
    pub kills: u32,
    pub precision_kills: u32,
    pub precision_kills_percent: f64,
    pub weapon_name: String,
    pub activity_name: String,
    pub character_class: String,
}

/// Foreign keys a stat row needs before it can be written.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatRowKeys {
    pub character: CharacterRowId,
    pub activity: ActivityRowId,
    pub weapon: WeaponRowId,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StoredStat {
    pub row_id: i64,
    pub keys: StatRowKeys,
    pub instance_id: InstanceId,
    pub kills: u32,
    pub precision_kills: u32,
    pub precision_kills_percent: f64,
    pub weapon_name: String,
    pub activity_name: String,
    pub character_class: String,
}

#[async_trait::async_trait]
pub trait StatsRepository {
    /// Fails with `Conflict` when the (character, match, weapon) row exists.
    async fn insert_stat(
        &self,
        keys: StatRowKeys,
        record: &MatchStatRecord,
    ) -> Result<StoredStat, RepoCreateError>;
    async fn find_by_character_instance(
        &self,
        character: CharacterRowId,
        instance_id: InstanceId,
    ) -> Result<Vec<StoredStat>, RepoError>;
    async fn delete_by_character_instance(
        &self,
        character: CharacterRowId,
        instance_id: InstanceId,
    ) -> Result<u64, RepoError>;
}

/// Percentage of kills that were precision kills, rounded to two decimals.
pub fn precision_kills_percent(kills: u32, precision_kills: u32) -> f64 {
    if kills == 0 {
        return 0.0;
    }
    let percent = f64::from(precision_kills) / f64::from(kills) * 100.0;
    (percent * 100.0).round() / 100.0
}
