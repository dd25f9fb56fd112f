//! Typed views over the manifest tables. Only the fields the ingestion pipeline
//! reads are modelled; everything else in a definition is ignored.

use std::collections::HashMap;

use serde::{Deserialize, de::DeserializeOwned};

use crate::DefinitionTable;

pub trait Definition: DeserializeOwned {
    const TABLE: DefinitionTable;
}

/// Charge time of fusion-class weapons, in milliseconds.
pub const STAT_CHARGE_TIME: u32 = 2961396640;
pub const STAT_SWING_SPEED: u32 = 2837207746;
pub const STAT_ROUNDS_PER_MINUTE: u32 = 4284893193;

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayProperties {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItemDefinition {
    pub display_properties: DisplayProperties,
    pub item_type_display_name: Option<String>,
    pub item_type_and_tier_display_name: Option<String>,
    pub equipping_block: Option<EquippingBlock>,
    #[serde(default)]
    pub damage_types: Vec<u32>,
    pub stats: Option<ItemStatBlock>,
}

impl InventoryItemDefinition {
    pub fn stat_value(&self, stat_hash: u32) -> Option<i64> {
        self.stats
            .as_ref()?
            .stats
            .get(&stat_hash.to_string())
            .map(|stat| stat.value)
    }
}

impl Definition for InventoryItemDefinition {
    const TABLE: DefinitionTable = DefinitionTable::InventoryItem;
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquippingBlock {
    pub ammo_type: Option<u32>,
    pub equipment_slot_type_hash: u32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ItemStatBlock {
    #[serde(default)]
    pub stats: HashMap<String, ItemStat>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ItemStat {
    pub value: i64,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDefinition {
    pub display_properties: DisplayProperties,
    pub activity_type_hash: Option<u32>,
    pub matchmaking: Option<Matchmaking>,
    #[serde(default)]
    pub modifiers: Vec<ActivityModifierReference>,
}

impl Definition for ActivityDefinition {
    const TABLE: DefinitionTable = DefinitionTable::Activity;
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Matchmaking {
    pub max_players: u32,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityModifierReference {
    pub activity_modifier_hash: u32,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityTypeDefinition {
    pub display_properties: DisplayProperties,
}

impl Definition for ActivityTypeDefinition {
    const TABLE: DefinitionTable = DefinitionTable::ActivityType;
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityModifierDefinition {
    pub display_properties: DisplayProperties,
}

impl Definition for ActivityModifierDefinition {
    const TABLE: DefinitionTable = DefinitionTable::ActivityModifier;
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityModeDefinition {
    pub display_properties: DisplayProperties,
    pub mode_type: Option<u32>,
}

impl Definition for ActivityModeDefinition {
    const TABLE: DefinitionTable = DefinitionTable::ActivityMode;
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassDefinition {
    pub display_properties: DisplayProperties,
    pub class_type: Option<u32>,
}

impl Definition for ClassDefinition {
    const TABLE: DefinitionTable = DefinitionTable::Class;
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatDefinition {
    pub display_properties: DisplayProperties,
}

impl Definition for StatDefinition {
    const TABLE: DefinitionTable = DefinitionTable::Stat;
}
