#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;

use board_core::StoreError;
use board_core::board::{Identity, Moderation};
use board_core::ports::{DocumentStore, Fields, ProfileStorage, Query, Snapshot};
use board_infra::{InMemoryDocumentStore, InMemoryProfileStorage};

/// A fresh in-memory profile and the identity/moderation views over it.
pub fn profile() -> (Arc<dyn ProfileStorage>, Identity, Moderation) {
    let storage: Arc<dyn ProfileStorage> = Arc::new(InMemoryProfileStorage::new());
    let identity = Identity::new(storage.clone());
    let moderation = Moderation::new(storage.clone());
    (storage, identity, moderation)
}

/// Store that fails every request, as if the network were down.
pub struct OfflineStore;

fn offline() -> StoreError {
    StoreError::Connection("offline".to_string())
}

#[async_trait]
impl DocumentStore for OfflineStore {
    async fn add(&self, _collection: &str, _fields: Fields) -> Result<String, StoreError> {
        Err(offline())
    }

    async fn get(&self, _collection: &str, _id: &str) -> Result<Option<Snapshot>, StoreError> {
        Err(offline())
    }

    async fn set(&self, _collection: &str, _id: &str, _fields: Fields) -> Result<(), StoreError> {
        Err(offline())
    }

    async fn update(&self, _collection: &str, _id: &str, _fields: Fields) -> Result<(), StoreError> {
        Err(offline())
    }

    async fn delete(&self, _collection: &str, _id: &str) -> Result<(), StoreError> {
        Err(offline())
    }

    async fn query(&self, _collection: &str, _query: &Query) -> Result<Vec<Snapshot>, StoreError> {
        Err(offline())
    }
}

/// In-memory store that yields to the scheduler after every point read,
/// so concurrent read-modify-write sequences interleave.
#[derive(Default)]
pub struct InterleavingStore {
    inner: InMemoryDocumentStore,
}

#[async_trait]
impl DocumentStore for InterleavingStore {
    async fn add(&self, collection: &str, fields: Fields) -> Result<String, StoreError> {
        self.inner.add(collection, fields).await
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Snapshot>, StoreError> {
        let snapshot = self.inner.get(collection, id).await;
        tokio::task::yield_now().await;
        snapshot
    }

    async fn set(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        self.inner.set(collection, id, fields).await
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        self.inner.update(collection, id, fields).await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.inner.delete(collection, id).await
    }

    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Snapshot>, StoreError> {
        self.inner.query(collection, query).await
    }
}
