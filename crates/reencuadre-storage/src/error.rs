use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Sled(#[from] sled::Error),

    #[error("Stored record could not be (de)serialized: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Stored identity is not valid UTF-8")]
    InvalidIdentity,
}
