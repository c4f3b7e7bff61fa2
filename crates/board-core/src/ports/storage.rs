use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ProfileId;
use crate::error::StorageError;

/// Profile storage - the per-profile key-value entries a browser would keep
/// in local storage (display name, moderation flag, offline posts).
#[async_trait]
pub trait ProfileStorage: Send + Sync {
    /// Read an entry. Unreadable entries are reported as absent.
    async fn get(&self, key: &str) -> Option<String>;

    /// Write an entry, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove an entry.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Hands out the storage of one profile among many, so each caller keeps
/// its own display name and moderation flag.
#[async_trait]
pub trait ProfileDirectory: Send + Sync {
    /// Open `profile`, creating it empty on first use. Opening the same id
    /// twice yields views over the same entries.
    async fn open(&self, profile: &ProfileId) -> Result<Arc<dyn ProfileStorage>, StorageError>;
}
