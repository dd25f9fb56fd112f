use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{DefinitionHash, DefinitionTable, DefinitionTables, ManifestError};

/// Local snapshot of the definition tables, so a restart skips the download.
pub struct ManifestCache {
    path: PathBuf,
}

#[derive(Serialize, Deserialize)]
struct Snapshot {
    tables: HashMap<String, HashMap<DefinitionHash, Value>>,
}

impl ManifestCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when no snapshot has been written yet.
    pub fn load(&self) -> Result<Option<DefinitionTables>, ManifestError> {
        if !self.path.is_file() {
            return Ok(None);
        }
        let text = fs::read_to_string(&self.path)?;
        let snapshot: Snapshot = serde_json::from_str(&text)?;

        let mut tables = DefinitionTables::new();
        for (name, definitions) in snapshot.tables {
            match DefinitionTable::from_name(&name) {
                Some(table) => {
                    tables.insert(table, definitions);
                }
                None => log::warn!("Ignoring unknown manifest table {} in cache", name),
            }
        }
        Ok(Some(tables))
    }

    pub fn store(&self, tables: &DefinitionTables) -> Result<(), ManifestError> {
        let snapshot = Snapshot {
            tables: tables
                .iter()
                .map(|(table, definitions)| (table.name().to_string(), definitions.clone()))
                .collect(),
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string(&snapshot)?;
        fs::write(&self.path, text)?;
        Ok(())
    }
}
