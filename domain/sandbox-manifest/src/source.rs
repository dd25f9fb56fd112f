use crate::{
    DefinitionResolver, DefinitionTable, DefinitionTables, ManifestError, cache::ManifestCache,
};

/// Bulk provider of manifest definitions, e.g. the published manifest download.
#[async_trait::async_trait]
pub trait DefinitionSource {
    async fn load_definitions(
        &self,
        tables: &[DefinitionTable],
    ) -> Result<DefinitionTables, ManifestError>;
}

/// Builds the resolver from the local snapshot, falling back to the bulk source
/// when the snapshot is absent, incomplete or unreadable. Failing to fetch from
/// the source is fatal for the caller.
pub async fn load_resolver<S>(
    source: &S,
    cache: &ManifestCache,
) -> Result<DefinitionResolver, ManifestError>
where
    S: DefinitionSource + Send + Sync + ?Sized,
{
    match cache.load() {
        Ok(Some(tables)) if has_all_tables(&tables) => {
            log::info!("Loaded manifest from {}", cache.path().display());
            return Ok(DefinitionResolver::new(tables));
        }
        Ok(Some(_)) => log::warn!("Manifest cache is incomplete, downloading again"),
        Ok(None) => log::info!("No manifest cache found, downloading"),
        Err(e) => log::warn!("Failed to read manifest cache: {}", e),
    }

    let tables = source.load_definitions(&DefinitionTable::ALL).await?;
    if let Some(missing) = DefinitionTable::ALL
        .iter()
        .find(|table| !tables.contains_key(table))
    {
        return Err(ManifestError::MissingTable(missing.name().to_string()));
    }

    if let Err(e) = cache.store(&tables) {
        log::warn!(
            "Failed to write manifest cache to {}: {}",
            cache.path().display(),
            e
        );
    }
    Ok(DefinitionResolver::new(tables))
}

fn has_all_tables(tables: &DefinitionTables) -> bool {
    DefinitionTable::ALL
        .iter()
        .all(|table| tables.contains_key(table))
}
