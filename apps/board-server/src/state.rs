//! Application state - shared across all handlers.

use std::sync::Arc;

use board_core::StorageError;
use board_core::board::{CounterMode, Identity, Moderation, NormalizedBoard};
use board_core::domain::ProfileId;
use board_core::ports::{DocumentStore, ProfileDirectory};
use board_infra::{FileProfileDirectory, InMemoryDocumentStore, InMemoryProfileDirectory};

use crate::config::{AppConfig, ProfileBackend, StoreBackend};

/// Shared application state.
///
/// Posts live in one store for everyone; each caller brings its own
/// profile, so the board is assembled per request.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn DocumentStore>,
    profiles: Arc<dyn ProfileDirectory>,
    counter_mode: CounterMode,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let store = document_store(config.store_backend).await;
        let profiles = profile_directory(config).await;

        tracing::info!(counter_mode = ?config.counter_mode, "Application state initialized");
        Self::from_parts(store, profiles, config.counter_mode)
    }

    pub fn from_parts(
        store: Arc<dyn DocumentStore>,
        profiles: Arc<dyn ProfileDirectory>,
        counter_mode: CounterMode,
    ) -> Self {
        Self {
            store,
            profiles,
            counter_mode,
        }
    }

    /// The board as seen by `profile`: its display name and its
    /// moderation flag.
    pub async fn board_for(&self, profile: &ProfileId) -> Result<NormalizedBoard, StorageError> {
        let storage = self.profiles.open(profile).await?;
        let board = NormalizedBoard::new(
            self.store.clone(),
            Identity::new(storage.clone()),
            Moderation::new(storage),
        )
        .with_counter_mode(self.counter_mode);

        Ok(board)
    }
}

async fn document_store(backend: StoreBackend) -> Arc<dyn DocumentStore> {
    match backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory document store. Posts are lost on restart.");
            Arc::new(InMemoryDocumentStore::new())
        }
        #[cfg(feature = "redis")]
        StoreBackend::Redis => match board_infra::RedisDocumentStore::from_env().await {
            Ok(store) => Arc::new(store),
            Err(e) => {
                tracing::error!("Failed to connect to Redis: {}. Using in-memory fallback.", e);
                Arc::new(InMemoryDocumentStore::new())
            }
        },
        #[cfg(not(feature = "redis"))]
        StoreBackend::Redis => {
            tracing::warn!("Built without redis feature - using in-memory document store");
            Arc::new(InMemoryDocumentStore::new())
        }
    }
}

async fn profile_directory(config: &AppConfig) -> Arc<dyn ProfileDirectory> {
    match config.profile_backend {
        ProfileBackend::Memory => Arc::new(InMemoryProfileDirectory::new()),
        ProfileBackend::File => {
            tracing::info!(root = %config.profile_dir.display(), "Using file profile storage");
            Arc::new(FileProfileDirectory::new(&config.profile_dir))
        }
        #[cfg(feature = "redis")]
        ProfileBackend::Redis => match board_infra::RedisProfileDirectory::from_env().await {
            Ok(profiles) => Arc::new(profiles),
            Err(e) => {
                tracing::error!("Failed to connect to Redis: {}. Using in-memory profiles.", e);
                Arc::new(InMemoryProfileDirectory::new())
            }
        },
        #[cfg(not(feature = "redis"))]
        ProfileBackend::Redis => {
            tracing::warn!("Built without redis feature - using in-memory profiles");
            Arc::new(InMemoryProfileDirectory::new())
        }
    }
}
