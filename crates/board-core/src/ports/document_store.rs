use std::cmp::Ordering;
use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::StoreError;

/// A stored document body.
pub type Document = Map<String, Value>;

/// Field writes for `add`, `set` and `update`.
pub type Fields = BTreeMap<String, FieldValue>;

/// A single field write.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Store the value as given.
    Value(Value),
    /// Replaced by the store's clock (epoch millis) when the write lands.
    ServerTimestamp,
    /// Atomically add to the current integer value (missing counts as 0).
    Increment(i64),
    /// Atomically push onto the current array (missing counts as empty).
    ArrayAppend(Vec<Value>),
}

impl FieldValue {
    pub fn value(value: impl Into<Value>) -> Self {
        FieldValue::Value(value.into())
    }
}

/// Apply field writes to a document in place. `now_millis` resolves
/// `ServerTimestamp`.
pub fn apply_fields(doc: &mut Document, fields: Fields, now_millis: i64) {
    for (name, write) in fields {
        let next = match write {
            FieldValue::Value(value) => value,
            FieldValue::ServerTimestamp => Value::from(now_millis),
            FieldValue::Increment(delta) => {
                let current = doc.get(&name).and_then(Value::as_i64).unwrap_or(0);
                Value::from(current + delta)
            }
            FieldValue::ArrayAppend(values) => {
                let mut items = match doc.remove(&name) {
                    Some(Value::Array(items)) => items,
                    _ => Vec::new(),
                };
                items.extend(values);
                Value::Array(items)
            }
        };
        doc.insert(name, next);
    }
}

/// A document read back from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub id: String,
    pub data: Document,
}

impl Snapshot {
    /// Decode into a record type, exposing the document id as its `id` field.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, serde_json::Error> {
        let mut data = self.data;
        data.insert("id".to_string(), Value::String(self.id));
        serde_json::from_value(Value::Object(data))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

/// Collection query. Without an ordering, documents come back in the
/// store's natural order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub order_by: Option<OrderBy>,
}

impl Query {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn order_by(field: impl Into<String>, direction: Direction) -> Self {
        Self {
            order_by: Some(OrderBy {
                field: field.into(),
                direction,
            }),
        }
    }

    /// Order snapshots that arrive in insertion order.
    ///
    /// Documents lacking the ordering field are dropped, as an ordered
    /// document-store query would. An explicit null still orders, below
    /// every other value. Ties keep insertion order.
    pub fn apply(&self, mut docs: Vec<Snapshot>) -> Vec<Snapshot> {
        let Some(order) = &self.order_by else {
            return docs;
        };

        docs.retain(|doc| doc.data.contains_key(&order.field));
        docs.sort_by(|a, b| {
            let ordering = compare_values(&a.data[&order.field], &b.data[&order.field]);
            match order.direction {
                Direction::Ascending => ordering,
                Direction::Descending => ordering.reverse(),
            }
        });
        docs
    }
}

/// Total order over JSON values: booleans, then numbers, then strings,
/// then everything else compared by its serialized form.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn rank(value: &Value) -> u8 {
        match value {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => {
                let x = x.as_f64().unwrap_or(f64::NAN);
                let y = y.as_f64().unwrap_or(f64::NAN);
                x.total_cmp(&y)
            }
        },
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ if rank(a) == rank(b) => a.to_string().cmp(&b.to_string()),
        _ => rank(a).cmp(&rank(b)),
    }
}

/// Document store - abstraction over the hosted document database.
///
/// No operation is transactional across calls. `Increment` and
/// `ArrayAppend` field writes are the only atomic read-modify-write
/// primitives.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a new document and return its store-assigned id.
    async fn add(&self, collection: &str, fields: Fields) -> Result<String, StoreError>;

    /// Point lookup. A missing document is `Ok(None)`.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Snapshot>, StoreError>;

    /// Replace the whole document, creating it if absent.
    async fn set(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError>;

    /// Merge fields into an existing document. Fails with `NotFound` if
    /// the document does not exist.
    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError>;

    /// Delete a document. Deleting a missing document succeeds.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    /// Fetch every document of a collection.
    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Snapshot>, StoreError>;
}
