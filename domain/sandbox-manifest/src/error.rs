use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("manifest source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("manifest table missing: {0}")]
    MissingTable(String),

    #[error("manifest cache io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("manifest cache is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}
