//! Match reports and their fan-out into per-weapon stat records.

use std::{collections::BTreeMap, sync::Arc};

use sandbox_manifest::{
    DefinitionResolver,
    catalog::Platform,
    definitions::{ActivityDefinition, ClassDefinition, InventoryItemDefinition},
};
use serde_json::Value;

use crate::{
    domain::{
        ActivityHash, CharacterId, DestinyId, InstanceId, ItemHash,
        builder::EntityBuilder,
        payload::{CarnageReport, ReportPlayer, WeaponUsage, decode, id_from_value},
        stats::{MatchStatRecord, Participant, precision_kills_percent},
    },
    ports::bungie::{BungieApiPort, endpoints},
};

/// One fetched match report together with the weapons each participating
/// character used.
#[derive(Clone, Debug)]
pub struct MatchInstance {
    pub instance_id: InstanceId,
    pub activity_hash: ActivityHash,
    pub participants: BTreeMap<CharacterId, Vec<ItemHash>>,
    report: CarnageReport,
}

impl MatchInstance {
    pub fn from_report(instance_id: InstanceId, report: CarnageReport) -> Self {
        Self {
            instance_id,
            activity_hash: ActivityHash(report.activity_details.director_activity_hash),
            participants: define_participants(&report),
            report,
        }
    }

    fn entry(&self, character_id: CharacterId) -> Option<&Value> {
        self.report
            .entries
            .iter()
            .find(|entry| entry_character_id(entry) == Some(character_id))
    }
}

fn entry_character_id(entry: &Value) -> Option<CharacterId> {
    entry.get("characterId").and_then(id_from_value).map(CharacterId)
}

fn entry_weapons(entry: &Value) -> &[Value] {
    entry
        .pointer("/extended/weapons")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Maps each participating character to the weapons it used. Entries whose
/// character id is not numeric are skipped; an entry without weapon data
/// still takes part, with no weapons.
pub fn define_participants(report: &CarnageReport) -> BTreeMap<CharacterId, Vec<ItemHash>> {
    let mut participants = BTreeMap::new();
    for entry in &report.entries {
        let Some(character_id) = entry_character_id(entry) else {
            continue;
        };
        let weapons = entry_weapons(entry)
            .iter()
            .filter_map(|weapon| weapon.get("referenceId")?.as_u64())
            .filter_map(|hash| u32::try_from(hash).ok())
            .map(ItemHash)
            .collect();
        participants.entry(character_id).or_insert(weapons);
    }
    participants
}

pub struct MatchInstanceBuilder<A: BungieApiPort> {
    api: Arc<A>,
    instance_id: InstanceId,
}

impl<A: BungieApiPort> MatchInstanceBuilder<A> {
    pub fn new(api: Arc<A>, instance_id: InstanceId) -> Self {
        Self { api, instance_id }
    }
}

#[async_trait::async_trait]
impl<A: BungieApiPort + Send + Sync> EntityBuilder for MatchInstanceBuilder<A> {
    type Output = MatchInstance;

    async fn build(&self) -> Option<MatchInstance> {
        let payload = self
            .api
            .fetch_json(endpoints::carnage_report(self.instance_id))
            .await?;
        let report: CarnageReport = decode(payload, "carnage report")?;
        Some(MatchInstance::from_report(self.instance_id, report))
    }
}

pub struct MatchStatRecordBuilder {
    resolver: Arc<DefinitionResolver>,
    instance: Arc<MatchInstance>,
    character_id: CharacterId,
    weapon_hash: ItemHash,
}

impl MatchStatRecordBuilder {
    pub fn new(
        resolver: Arc<DefinitionResolver>,
        instance: Arc<MatchInstance>,
        character_id: CharacterId,
        weapon_hash: ItemHash,
    ) -> Self {
        Self {
            resolver,
            instance,
            character_id,
            weapon_hash,
        }
    }

    fn weapon_usage(&self, entry: &Value) -> Option<WeaponUsage> {
        entry_weapons(entry)
            .iter()
            .filter_map(|weapon| serde_json::from_value::<WeaponUsage>(weapon.clone()).ok())
            .find(|usage| usage.reference_id == self.weapon_hash.0)
    }

    fn resolve(&self) -> Option<MatchStatRecord> {
        let entry = self.instance.entry(self.character_id)?;
        let usage = self.weapon_usage(entry)?;
        let player: ReportPlayer = serde_json::from_value(entry.get("player")?.clone()).ok()?;

        let kills = usage.values.unique_weapon_kills.as_count()?;
        let precision_kills = usage.values.unique_weapon_precision_kills.as_count()?;

        let weapon: InventoryItemDefinition = self.resolver.resolve(self.weapon_hash.0)?;
        let activity: ActivityDefinition = self.resolver.resolve(self.instance.activity_hash.0)?;
        let class: ClassDefinition = self.resolver.resolve(player.class_hash)?;

        Some(MatchStatRecord {
            instance_id: self.instance.instance_id,
            activity_hash: self.instance.activity_hash,
            character_id: self.character_id,
            weapon_hash: self.weapon_hash,
            participant: Participant {
                destiny_id: DestinyId(player.destiny_user_info.membership_id),
                platform: Platform::from_code(player.destiny_user_info.membership_type)?,
            },
            kills,
            precision_kills,
            precision_kills_percent: precision_kills_percent(kills, precision_kills),
            weapon_name: weapon.display_properties.name,
            activity_name: activity.display_properties.name,
            character_class: class.display_properties.name,
        })
    }
}

#[async_trait::async_trait]
impl EntityBuilder for MatchStatRecordBuilder {
    type Output = MatchStatRecord;

    async fn build(&self) -> Option<MatchStatRecord> {
        self.resolve()
    }
}

/// Fetches a match report once and derives one stat record per
/// (character, weapon) pair from it.
pub struct MatchStatExtractor<A: BungieApiPort> {
    api: Arc<A>,
    resolver: Arc<DefinitionResolver>,
}

impl<A: BungieApiPort + Send + Sync> MatchStatExtractor<A> {
    pub fn new(api: Arc<A>, resolver: Arc<DefinitionResolver>) -> Self {
        Self { api, resolver }
    }

    pub async fn fetch_instance(&self, instance_id: InstanceId) -> Option<MatchInstance> {
        let instance = MatchInstanceBuilder::new(self.api.clone(), instance_id)
            .build()
            .await;
        if instance.is_none() {
            log::warn!("Match report {} is unavailable", instance_id);
        }
        instance
    }

    /// Records that fail to resolve are dropped; the rest of the match is
    /// still returned.
    pub async fn create_stat_records(&self, instance: Arc<MatchInstance>) -> Vec<MatchStatRecord> {
        let mut records = Vec::new();
        for (character_id, weapons) in &instance.participants {
            for weapon_hash in weapons {
                let builder = MatchStatRecordBuilder::new(
                    self.resolver.clone(),
                    instance.clone(),
                    *character_id,
                    *weapon_hash,
                );
                match builder.build().await {
                    Some(record) => records.push(record),
                    None => log::warn!(
                        "Dropping stat record for character {} weapon {} in match {}",
                        character_id,
                        weapon_hash,
                        instance.instance_id
                    ),
                }
            }
        }
        records
    }
}
