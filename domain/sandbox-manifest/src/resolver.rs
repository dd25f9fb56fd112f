use std::collections::HashMap;

use serde_json::Value;

use crate::{DefinitionHash, definitions::Definition};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DefinitionTable {
    InventoryItem,
    Activity,
    ActivityType,
    ActivityModifier,
    ActivityMode,
    Class,
    Stat,
}

impl DefinitionTable {
    pub const ALL: [DefinitionTable; 7] = [
        DefinitionTable::InventoryItem,
        DefinitionTable::Activity,
        DefinitionTable::ActivityType,
        DefinitionTable::ActivityModifier,
        DefinitionTable::ActivityMode,
        DefinitionTable::Class,
        DefinitionTable::Stat,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DefinitionTable::InventoryItem => "DestinyInventoryItemDefinition",
            DefinitionTable::Activity => "DestinyActivityDefinition",
            DefinitionTable::ActivityType => "DestinyActivityTypeDefinition",
            DefinitionTable::ActivityModifier => "DestinyActivityModifierDefinition",
            DefinitionTable::ActivityMode => "DestinyActivityModeDefinition",
            DefinitionTable::Class => "DestinyClassDefinition",
            DefinitionTable::Stat => "DestinyStatDefinition",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        DefinitionTable::ALL
            .iter()
            .copied()
            .find(|table| table.name() == name)
    }
}

impl std::fmt::Display for DefinitionTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

pub type DefinitionTables = HashMap<DefinitionTable, HashMap<DefinitionHash, Value>>;

/// Read-only lookup of manifest definitions, built once per process.
pub struct DefinitionResolver {
    tables: DefinitionTables,
}

impl DefinitionResolver {
    pub fn new(tables: DefinitionTables) -> Self {
        Self { tables }
    }

    pub fn resolve_raw(
        &self,
        table: DefinitionTable,
        hash: impl Into<DefinitionHash>,
    ) -> Option<&Value> {
        self.tables.get(&table)?.get(&hash.into())
    }

    /// Looks up a definition and reads it as `D`. A definition that lacks a field
    /// `D` requires is reported as absent.
    pub fn resolve<D: Definition>(&self, hash: impl Into<DefinitionHash>) -> Option<D> {
        let hash = hash.into();
        let raw = self.resolve_raw(D::TABLE, hash)?;
        match D::deserialize(raw) {
            Ok(definition) => Some(definition),
            Err(e) => {
                log::debug!("Definition {} in {} is malformed: {}", hash, D::TABLE, e);
                None
            }
        }
    }

    pub fn contains(&self, table: DefinitionTable, hash: impl Into<DefinitionHash>) -> bool {
        self.resolve_raw(table, hash).is_some()
    }

    pub fn table_len(&self, table: DefinitionTable) -> usize {
        self.tables.get(&table).map_or(0, |t| t.len())
    }

    pub fn tables(&self) -> &DefinitionTables {
        &self.tables
    }
}
