use std::{collections::HashMap, time::Duration};

use sandbox_app::ports::bungie::BungieRequest;
use sandbox_manifest::{
    DefinitionHash, DefinitionTable, DefinitionTables, ManifestError, source::DefinitionSource,
};
use serde_json::Value;

use crate::{BungieClientError, BungieHttpClient};

/// Downloads definition tables from the published per-table JSON manifest.
///
/// The manifest lookup goes through the API client. Table bodies are fetched
/// with a separate client bounded by `download_timeout`, since a single table
/// can take far longer than any API call.
pub struct ManifestDownloader {
    api: BungieHttpClient,
    download_client: reqwest::Client,
    content_root: String,
    language: String,
}

impl ManifestDownloader {
    /// `content_root` is the host serving the content paths listed in the manifest.
    pub fn new(
        api: BungieHttpClient,
        content_root: impl Into<String>,
        language: impl Into<String>,
        download_timeout: Duration,
    ) -> Result<Self, BungieClientError> {
        let download_client = reqwest::Client::builder()
            .timeout(download_timeout)
            .build()?;
        Ok(Self {
            api,
            download_client,
            content_root: content_root.into().trim_end_matches('/').to_string(),
            language: language.into(),
        })
    }

    async fn content_paths(&self) -> Result<HashMap<String, String>, BungieClientError> {
        let manifest = self
            .api
            .request(&BungieRequest::get("/Destiny2/Manifest/"))
            .await?;
        let paths = manifest
            .get("jsonWorldComponentContentPaths")
            .and_then(|paths| paths.get(&self.language))
            .cloned()
            .unwrap_or(Value::Null);
        Ok(serde_json::from_value(paths)?)
    }

    async fn download_table(
        &self,
        path: &str,
    ) -> Result<HashMap<DefinitionHash, Value>, BungieClientError> {
        let url = format!("{}{}", self.content_root, path);
        let resp = self.download_client.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(BungieClientError::Status(resp.status().as_u16()));
        }
        let table: HashMap<String, Value> = resp.json().await?;
        Ok(fold_keys(table))
    }
}

/// Table keys are decimal hashes; anything else is skipped.
fn fold_keys(table: HashMap<String, Value>) -> HashMap<DefinitionHash, Value> {
    table
        .into_iter()
        .filter_map(|(key, definition)| match key.parse::<DefinitionHash>() {
            Ok(hash) => Some((hash, definition)),
            Err(e) => {
                log::debug!("Skipping manifest key {}: {}", key, e);
                None
            }
        })
        .collect()
}

#[async_trait::async_trait]
impl DefinitionSource for ManifestDownloader {
    async fn load_definitions(
        &self,
        tables: &[DefinitionTable],
    ) -> Result<DefinitionTables, ManifestError> {
        let unavailable = |e: BungieClientError| ManifestError::SourceUnavailable(e.to_string());
        let paths = self.content_paths().await.map_err(unavailable)?;

        let mut definitions = DefinitionTables::new();
        for table in tables {
            let path = paths
                .get(table.name())
                .ok_or_else(|| BungieClientError::MissingContentPath(table.name().to_string()))
                .map_err(unavailable)?;
            let entries = self.download_table(path).await.map_err(unavailable)?;
            log::info!("Downloaded {} definitions of {}", entries.len(), table);
            definitions.insert(*table, entries);
        }
        Ok(definitions)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::{Json, Router, routing::get};
    use tokio::time::sleep;
    use serde_json::json;

    use super::*;
    use crate::testing::serve;

    fn manifest_router() -> Router {
        Router::new()
            .route(
                "/Platform/Destiny2/Manifest/",
                get(|| async {
                    Json(json!({
                        "Response": {
                            "jsonWorldComponentContentPaths": {
                                "en": {
                                    "DestinyInventoryItemDefinition": "/content/items.json",
                                    "DestinyClassDefinition": "/content/classes.json",
                                }
                            }
                        },
                        "ErrorCode": 1,
                        "ErrorStatus": "Success",
                        "Message": "Ok",
                    }))
                }),
            )
            .route(
                "/content/items.json",
                get(|| async {
                    Json(json!({
                        "1666": { "displayProperties": { "name": "Ace of Spades" } },
                        "3000000000": { "displayProperties": { "name": "Lorentz Driver" } },
                    }))
                }),
            )
            .route(
                "/content/classes.json",
                get(|| async {
                    sleep(Duration::from_millis(300)).await;
                    Json(json!({ "671679327": { "displayProperties": { "name": "Hunter" } } }))
                }),
            )
    }

    async fn downloader_with(
        api_timeout: Duration,
        download_timeout: Duration,
    ) -> ManifestDownloader {
        let root = serve(manifest_router()).await;
        let client =
            BungieHttpClient::new(format!("{root}/Platform"), "key", api_timeout).unwrap();
        ManifestDownloader::new(client, root, "en", download_timeout).unwrap()
    }

    async fn downloader() -> ManifestDownloader {
        downloader_with(Duration::from_secs(5), Duration::from_secs(5)).await
    }

    #[tokio::test]
    async fn test_downloads_requested_tables_with_folded_keys() {
        let source = downloader().await;
        let tables = source
            .load_definitions(&[DefinitionTable::InventoryItem, DefinitionTable::Class])
            .await
            .unwrap();

        let items = &tables[&DefinitionTable::InventoryItem];
        assert_eq!(items.len(), 2);
        assert_eq!(
            items[&DefinitionHash::from_unsigned(3_000_000_000)]["displayProperties"]["name"],
            "Lorentz Driver"
        );
        assert!(items.contains_key(&DefinitionHash::from_signed(-1_294_967_296)));
        assert_eq!(tables[&DefinitionTable::Class].len(), 1);
    }

    #[tokio::test]
    async fn test_table_without_content_path_fails() {
        let source = downloader().await;
        let err = source
            .load_definitions(&[DefinitionTable::Stat])
            .await
            .unwrap_err();
        assert!(matches!(err, ManifestError::SourceUnavailable(_)));
    }

    #[tokio::test]
    async fn test_table_slower_than_api_timeout_still_downloads() {
        let source = downloader_with(Duration::from_millis(100), Duration::from_secs(5)).await;
        let tables = source
            .load_definitions(&[DefinitionTable::Class])
            .await
            .unwrap();
        assert_eq!(tables[&DefinitionTable::Class].len(), 1);
    }

    #[tokio::test]
    async fn test_table_slower_than_download_timeout_fails() {
        let source = downloader_with(Duration::from_secs(5), Duration::from_millis(100)).await;
        let err = source
            .load_definitions(&[DefinitionTable::Class])
            .await
            .unwrap_err();
        assert!(matches!(err, ManifestError::SourceUnavailable(_)));
    }

    #[test]
    fn test_fold_keys_skips_non_numeric_keys() {
        let table = HashMap::from([
            ("7".to_string(), json!({})),
            ("version".to_string(), json!("1")),
        ]);
        let folded = fold_keys(table);
        assert_eq!(folded.len(), 1);
        assert!(folded.contains_key(&DefinitionHash::from_unsigned(7)));
    }
}
