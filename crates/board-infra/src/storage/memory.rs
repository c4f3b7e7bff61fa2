//! In-memory profile storage - throwaway profiles, lost on restart.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use board_core::StorageError;
use board_core::domain::ProfileId;
use board_core::ports::{ProfileDirectory, ProfileStorage};

/// In-memory profile storage using a HashMap with async RwLock.
///
/// Note: Data is lost on process restart.
pub struct InMemoryProfileStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryProfileStorage {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryProfileStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProfileStorage for InMemoryProfileStorage {
    async fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().await;
        entries.get(key).cloned()
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().await;
        entries.remove(key);
        Ok(())
    }
}

/// Every profile the process has seen, each kept in memory.
#[derive(Default)]
pub struct InMemoryProfileDirectory {
    profiles: RwLock<HashMap<ProfileId, Arc<InMemoryProfileStorage>>>,
}

impl InMemoryProfileDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileDirectory for InMemoryProfileDirectory {
    async fn open(&self, profile: &ProfileId) -> Result<Arc<dyn ProfileStorage>, StorageError> {
        let mut profiles = self.profiles.write().await;
        let storage: Arc<dyn ProfileStorage> = profiles
            .entry(profile.clone())
            .or_insert_with(|| Arc::new(InMemoryProfileStorage::new()))
            .clone();
        Ok(storage)
    }
}
