//! Error types shared by the board services and their adapters.

use thiserror::Error;

/// Document store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store connection failed: {0}")]
    Connection(String),

    #[error("Store request failed: {0}")]
    Query(String),

    #[error("Document not found")]
    NotFound,

    #[error("Document serialization failed: {0}")]
    Serialization(String),
}

/// Profile storage errors (the local key-value entries).
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O failed: {0}")]
    Io(String),

    #[error("Storage serialization failed: {0}")]
    Serialization(String),

    #[error("Storage operation failed: {0}")]
    Operation(String),
}

/// Board service errors.
///
/// Only write paths surface these. Read paths log and degrade.
#[derive(Debug, Error)]
pub enum BoardError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Malformed document: {0}")]
    Decode(#[from] serde_json::Error),
}
