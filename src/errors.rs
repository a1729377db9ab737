use thiserror::Error;
use uuid::Uuid;

/// Error type that captures record store failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Duplicate record id: {0}")]
    DuplicateId(Uuid),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}
