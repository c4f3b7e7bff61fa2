//! In-memory document store - used for development and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use board_core::StoreError;
use board_core::ports::{Document, DocumentStore, Fields, Query, Snapshot, apply_fields};

struct StoredDocument {
    /// Insertion sequence; the natural order of a collection.
    seq: u64,
    data: Document,
}

#[derive(Default)]
struct Collections {
    next_seq: u64,
    collections: HashMap<String, HashMap<String, StoredDocument>>,
}

impl Collections {
    fn next_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }
}

/// In-memory document store using nested HashMaps behind an async RwLock.
///
/// Every call takes the lock once, so field writes within one call are
/// atomic. Data is lost on process restart.
pub struct InMemoryDocumentStore {
    inner: RwLock<Collections>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Collections::default()),
        }
    }

    fn now_millis() -> i64 {
        Utc::now().timestamp_millis()
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn add(&self, collection: &str, fields: Fields) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        let mut data = Document::new();
        apply_fields(&mut data, fields, Self::now_millis());

        let mut inner = self.inner.write().await;
        let seq = inner.next_seq();
        inner
            .collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), StoredDocument { seq, data });

        tracing::debug!(collection = %collection, id = %id, "Document added");
        Ok(id)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Snapshot>, StoreError> {
        let inner = self.inner.read().await;
        let snapshot = inner
            .collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|doc| Snapshot {
                id: id.to_string(),
                data: doc.data.clone(),
            });
        Ok(snapshot)
    }

    async fn set(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        let mut data = Document::new();
        apply_fields(&mut data, fields, Self::now_millis());

        let mut inner = self.inner.write().await;
        let existing = inner
            .collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|doc| doc.seq);
        let seq = match existing {
            Some(seq) => seq,
            None => inner.next_seq(),
        };
        inner
            .collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), StoredDocument { seq, data });
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let doc = inner
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or(StoreError::NotFound)?;

        apply_fields(&mut doc.data, fields, Self::now_millis());
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if let Some(docs) = inner.collections.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }

    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Snapshot>, StoreError> {
        let inner = self.inner.read().await;
        let Some(docs) = inner.collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut ordered: Vec<(&String, &StoredDocument)> = docs.iter().collect();
        ordered.sort_by_key(|(_, doc)| doc.seq);
        let snapshots = ordered
            .into_iter()
            .map(|(id, doc)| Snapshot {
                id: id.clone(),
                data: doc.data.clone(),
            })
            .collect();

        Ok(query.apply(snapshots))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use board_core::ports::{Direction, FieldValue};
    use serde_json::json;

    fn fields(pairs: &[(&str, FieldValue)]) -> Fields {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_add_and_get() {
        let store = InMemoryDocumentStore::new();
        let id = store
            .add(
                "posts",
                fields(&[
                    ("question", FieldValue::value("Q1")),
                    ("timestamp", FieldValue::ServerTimestamp),
                ]),
            )
            .await
            .unwrap();

        let snapshot = store.get("posts", &id).await.unwrap().unwrap();
        assert_eq!(snapshot.id, id);
        assert_eq!(snapshot.data["question"], json!("Q1"));
        assert!(snapshot.data["timestamp"].as_i64().unwrap() > 0);

        assert!(store.get("posts", "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_replaces_whole_document() {
        let store = InMemoryDocumentStore::new();
        let id = store
            .add(
                "posts",
                fields(&[("a", FieldValue::value(1)), ("b", FieldValue::value(2))]),
            )
            .await
            .unwrap();

        store
            .set("posts", &id, fields(&[("a", FieldValue::value(10))]))
            .await
            .unwrap();

        let snapshot = store.get("posts", &id).await.unwrap().unwrap();
        assert_eq!(snapshot.data["a"], json!(10));
        assert!(!snapshot.data.contains_key("b"));
    }

    #[tokio::test]
    async fn test_update_merges_and_requires_existing() {
        let store = InMemoryDocumentStore::new();
        let id = store
            .add("posts", fields(&[("replyCount", FieldValue::value(0))]))
            .await
            .unwrap();

        store
            .update("posts", &id, fields(&[("replyCount", FieldValue::Increment(2))]))
            .await
            .unwrap();
        let snapshot = store.get("posts", &id).await.unwrap().unwrap();
        assert_eq!(snapshot.data["replyCount"], json!(2));

        let missing = store
            .update("posts", "nope", fields(&[("replyCount", FieldValue::Increment(1))]))
            .await;
        assert!(matches!(missing, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = InMemoryDocumentStore::new();
        let id = store.add("posts", Fields::new()).await.unwrap();

        store.delete("posts", &id).await.unwrap();
        store.delete("posts", &id).await.unwrap();
        assert!(store.get("posts", &id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_query_natural_and_ordered() {
        let store = InMemoryDocumentStore::new();
        for n in [2, 5, 1] {
            store
                .add("posts", fields(&[("n", FieldValue::value(n))]))
                .await
                .unwrap();
        }

        let natural = store.query("posts", &Query::all()).await.unwrap();
        let values: Vec<_> = natural.iter().map(|s| s.data["n"].clone()).collect();
        assert_eq!(values, [json!(2), json!(5), json!(1)]);

        let ordered = store
            .query("posts", &Query::order_by("n", Direction::Descending))
            .await
            .unwrap();
        let values: Vec<_> = ordered.iter().map(|s| s.data["n"].clone()).collect();
        assert_eq!(values, [json!(5), json!(2), json!(1)]);

        assert!(store.query("empty", &Query::all()).await.unwrap().is_empty());
    }
}
