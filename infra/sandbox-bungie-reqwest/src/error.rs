use thiserror::Error;

#[derive(Debug, Error)]
pub enum BungieClientError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Failed to deserialize response: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Unexpected HTTP status {0}")]
    Status(u16),

    #[error("API error {code} ({status}): {message}")]
    Api {
        code: i64,
        status: String,
        message: String,
    },

    #[error("Envelope has no Response member")]
    MissingResponse,

    #[error("Manifest has no content path for {0}")]
    MissingContentPath(String),
}
