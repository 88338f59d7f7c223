use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("conversion API returned status {status:?}")]
    Api { status: String },
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("config directory unavailable")]
    ConfigDir,
}
