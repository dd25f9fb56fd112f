use std::time::Duration;

use sandbox_app::ports::bungie::{BungieApiPort, BungieRequest};
use serde::Deserialize;
use serde_json::Value;

use crate::BungieClientError;

const SUCCESS_CODE: i64 = 1;

/// Wrapper every platform API response arrives in.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Envelope {
    response: Option<Value>,
    error_code: i64,
    #[serde(default)]
    error_status: String,
    #[serde(default)]
    message: String,
}

impl Envelope {
    fn into_response(self) -> Result<Value, BungieClientError> {
        if self.error_code != SUCCESS_CODE {
            return Err(BungieClientError::Api {
                code: self.error_code,
                status: self.error_status,
                message: self.message,
            });
        }
        self.response.ok_or(BungieClientError::MissingResponse)
    }
}

#[derive(Clone)]
pub struct BungieHttpClient {
    http_client: reqwest::Client,
    api_root: String,
    api_key: String,
}

impl BungieHttpClient {
    /// Every request, including reads of the response body, is bounded by `timeout`.
    pub fn new(
        api_root: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, BungieClientError> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            api_root: api_root.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    pub async fn request(&self, request: &BungieRequest) -> Result<Value, BungieClientError> {
        let url = format!("{}{}", self.api_root, request.path());
        let builder = match request {
            BungieRequest::Get { .. } => self.http_client.get(&url),
            BungieRequest::Post { body, .. } => self.http_client.post(&url).json(body),
        };
        let resp = builder.header("X-API-Key", &self.api_key).send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        // error responses usually still carry an envelope with the reason
        match serde_json::from_str::<Envelope>(&body) {
            Ok(envelope) => envelope.into_response(),
            Err(_) if !status.is_success() => Err(BungieClientError::Status(status.as_u16())),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait::async_trait]
impl BungieApiPort for BungieHttpClient {
    async fn fetch_json(&self, request: BungieRequest) -> Option<Value> {
        match self.request(&request).await {
            Ok(value) => {
                log::debug!("Fetched {}", request.path());
                Some(value)
            }
            Err(e) => {
                log::warn!("Request to {} failed: {}", request.path(), e);
                None
            }
        }
    }
}
