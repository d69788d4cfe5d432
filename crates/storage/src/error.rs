//! Storage error types.

use thiserror::Error;

/// Storage operation errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object not found: {0}")]
    NotFound(String),

    #[error("object already exists: {0}")]
    AlreadyExists(String),

    /// Permanent storage never removes or rewrites an object.
    #[error("object is immutable and cannot be deleted: {0}")]
    Immutable(String),

    #[error("invalid object id: {0}")]
    InvalidId(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("metadata serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("storage rejected the upload: {0}")]
    Rejected(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;
