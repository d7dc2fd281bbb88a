use thiserror::Error;

/// Failures reported by a [`Storage`](super::Storage) backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No backing store exists in this environment (e.g. localStorage is
    /// disabled or there is no window).
    #[error("storage is unavailable")]
    Unavailable,

    /// The backend rejected the operation.
    #[error("storage backend error: {0}")]
    Backend(String),

    /// A value could not be encoded for storage.
    #[error("failed to serialize value: {0}")]
    Serialize(#[source] serde_json::Error),

    /// A stored value could not be decoded.
    #[error("failed to deserialize stored value: {0}")]
    Deserialize(#[source] serde_json::Error),
}
