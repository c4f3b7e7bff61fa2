//! File-backed profile storage - the on-disk counterpart of a browser's
//! local storage.
//!
//! All entries live in one JSON object. The file is read once on open and
//! rewritten in full on every change.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use board_core::StorageError;
use board_core::domain::ProfileId;
use board_core::ports::{ProfileDirectory, ProfileStorage};

pub struct FileProfileStorage {
    path: PathBuf,
    entries: RwLock<HashMap<String, String>>,
}

impl FileProfileStorage {
    /// Open the profile at `path`. A missing file is an empty profile.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let entries = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| StorageError::Serialization(format!("{}: {}", path.display(), e)))?,
            Err(e) if e.kind() == ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(StorageError::Io(format!("{}: {}", path.display(), e))),
        };

        tracing::info!(path = %path.display(), entries = entries.len(), "Profile storage opened");
        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write through a sibling temp file so a crash never leaves half a file.
    async fn persist(&self, entries: &HashMap<String, String>) -> Result<(), StorageError> {
        let bytes =
            serde_json::to_vec_pretty(entries).map_err(|e| StorageError::Serialization(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::Io(e.to_string()))?;
        }

        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl ProfileStorage for FileProfileStorage {
    async fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().await;
        entries.get(key).cloned()
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        // Hold the write lock across the file write so writers never interleave.
        let mut entries = self.entries.write().await;
        let previous = entries.insert(key.to_string(), value.to_string());

        if let Err(e) = self.persist(&entries).await {
            match previous {
                Some(previous) => entries.insert(key.to_string(), previous),
                None => entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().await;
        let Some(previous) = entries.remove(key) else {
            return Ok(());
        };

        if let Err(e) = self.persist(&entries).await {
            entries.insert(key.to_string(), previous);
            return Err(e);
        }
        Ok(())
    }
}

/// One profile file per caller, `<root>/<profile>.json`.
///
/// Open profiles stay cached so every request for the same profile shares
/// one lock over its file.
pub struct FileProfileDirectory {
    root: PathBuf,
    open: RwLock<HashMap<ProfileId, Arc<FileProfileStorage>>>,
}

impl FileProfileDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            open: RwLock::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ProfileDirectory for FileProfileDirectory {
    async fn open(&self, profile: &ProfileId) -> Result<Arc<dyn ProfileStorage>, StorageError> {
        // Held across the file read; a profile is opened at most once.
        let mut open = self.open.write().await;
        if let Some(storage) = open.get(profile) {
            let storage: Arc<dyn ProfileStorage> = storage.clone();
            return Ok(storage);
        }

        let path = self.root.join(format!("{profile}.json"));
        let storage = Arc::new(FileProfileStorage::open(path).await?);
        open.insert(profile.clone(), storage.clone());
        tracing::debug!(profile = %profile, "Profile opened");

        let storage: Arc<dyn ProfileStorage> = storage;
        Ok(storage)
    }
}
