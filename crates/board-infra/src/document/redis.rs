//! Redis-backed document store.
//!
//! Layout per collection, under the configured prefix:
//! - `{prefix}:{collection}:doc:{id}` - hash of field name to JSON text
//! - `{prefix}:{collection}:index` - sorted set of ids scored by insertion
//! - `{prefix}:{collection}:seq` - insertion counter
//!
//! Ordering for queries is applied after the fetch, over the whole
//! collection. `update` runs as a Lua script so its field writes,
//! including increments and appends, are atomic.

use std::collections::HashMap;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, RedisError, Script};
use serde_json::Value;
use uuid::Uuid;

use board_core::StoreError;
use board_core::ports::{Document, DocumentStore, FieldValue, Fields, Query, Snapshot, apply_fields};

use crate::connection::{RedisConfig, connect};

const UPDATE_SCRIPT: &str = r"
if redis.call('EXISTS', KEYS[1]) == 0 then
  return redis.error_reply('NOT_FOUND')
end
local t = redis.call('TIME')
local now = tonumber(t[1]) * 1000 + math.floor(tonumber(t[2]) / 1000)
for i = 1, #ARGV, 3 do
  local op, field, payload = ARGV[i], ARGV[i + 1], ARGV[i + 2]
  if op == 'set' then
    redis.call('HSET', KEYS[1], field, payload)
  elseif op == 'ts' then
    redis.call('HSET', KEYS[1], field, string.format('%d', now))
  elseif op == 'incr' then
    local current = tonumber(redis.call('HGET', KEYS[1], field) or '0') or 0
    redis.call('HSET', KEYS[1], field, string.format('%d', current + tonumber(payload)))
  elseif op == 'append' then
    local current = redis.call('HGET', KEYS[1], field)
    if (not current) or current == '[]' or string.sub(current, 1, 1) ~= '[' then
      redis.call('HSET', KEYS[1], field, '[' .. payload .. ']')
    else
      redis.call('HSET', KEYS[1], field, string.sub(current, 1, -2) .. ',' .. payload .. ']')
    end
  end
end
return 1
";

/// Redis-backed document store.
///
/// Uses connection manager for automatic reconnection.
pub struct RedisDocumentStore {
    conn: ConnectionManager,
    prefix: String,
    update_script: Script,
}

impl RedisDocumentStore {
    pub async fn new(config: RedisConfig) -> Result<Self, StoreError> {
        let conn = connect(&config).await.map_err(StoreError::Connection)?;
        Ok(Self {
            conn,
            prefix: config.key_prefix,
            update_script: Script::new(UPDATE_SCRIPT),
        })
    }

    /// Create from environment configuration.
    pub async fn from_env() -> Result<Self, StoreError> {
        Self::new(RedisConfig::from_env()).await
    }

    fn doc_key(&self, collection: &str, id: &str) -> String {
        format!("{}:{}:doc:{}", self.prefix, collection, id)
    }

    fn index_key(&self, collection: &str) -> String {
        format!("{}:{}:index", self.prefix, collection)
    }

    fn seq_key(&self, collection: &str) -> String {
        format!("{}:{}:seq", self.prefix, collection)
    }

    /// The server clock in epoch millis.
    async fn server_time(&self) -> Result<i64, StoreError> {
        let mut conn = self.conn.clone();
        let (secs, micros): (i64, i64) = redis::cmd("TIME")
            .query_async(&mut conn)
            .await
            .map_err(query_error)?;
        Ok(secs * 1000 + micros / 1000)
    }

    /// Write `fields` as the complete document `id`, indexed at `seq`.
    async fn replace(&self, collection: &str, id: &str, seq: i64, fields: Fields) -> Result<(), StoreError> {
        let mut data = Document::new();
        apply_fields(&mut data, fields, self.server_time().await?);

        let pairs = data
            .iter()
            .map(|(name, value)| Ok((name.clone(), serde_json::to_string(value)?)))
            .collect::<Result<Vec<(String, String)>, serde_json::Error>>()
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let key = self.doc_key(collection, id);
        let mut pipe = redis::pipe();
        pipe.atomic().del(&key).ignore();
        if !pairs.is_empty() {
            pipe.hset_multiple(&key, &pairs).ignore();
        }
        pipe.zadd(self.index_key(collection), id, seq).ignore();

        let mut conn = self.conn.clone();
        let () = pipe.query_async(&mut conn).await.map_err(query_error)?;
        Ok(())
    }
}

fn query_error(e: RedisError) -> StoreError {
    if e.is_connection_refusal() || e.is_timeout() || e.is_connection_dropped() {
        StoreError::Connection(e.to_string())
    } else {
        StoreError::Query(e.to_string())
    }
}

fn decode_hash(id: &str, raw: HashMap<String, String>) -> Result<Snapshot, StoreError> {
    let mut data = Document::new();
    for (name, text) in raw {
        let value: Value =
            serde_json::from_str(&text).map_err(|e| StoreError::Serialization(e.to_string()))?;
        data.insert(name, value);
    }
    Ok(Snapshot {
        id: id.to_string(),
        data,
    })
}

/// Flatten field writes into `op, field, payload` triples for the script.
fn script_args(fields: Fields) -> Result<Vec<String>, StoreError> {
    let encode = |value: &Value| {
        serde_json::to_string(value).map_err(|e| StoreError::Serialization(e.to_string()))
    };

    let mut args = Vec::with_capacity(fields.len() * 3);
    for (name, write) in fields {
        let (op, payload) = match write {
            FieldValue::Value(value) => ("set", encode(&value)?),
            FieldValue::ServerTimestamp => ("ts", String::new()),
            FieldValue::Increment(delta) => ("incr", delta.to_string()),
            FieldValue::ArrayAppend(values) => {
                if values.is_empty() {
                    continue;
                }
                let items = values.iter().map(encode).collect::<Result<Vec<_>, _>>()?;
                ("append", items.join(","))
            }
        };
        args.extend([op.to_string(), name, payload]);
    }
    Ok(args)
}

#[async_trait]
impl DocumentStore for RedisDocumentStore {
    async fn add(&self, collection: &str, fields: Fields) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        let mut conn = self.conn.clone();
        let seq: i64 = conn.incr(self.seq_key(collection), 1).await.map_err(query_error)?;

        self.replace(collection, &id, seq, fields).await?;
        tracing::debug!(collection = %collection, id = %id, "Document added");
        Ok(id)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Snapshot>, StoreError> {
        let mut conn = self.conn.clone();
        let raw: HashMap<String, String> = conn
            .hgetall(self.doc_key(collection, id))
            .await
            .map_err(query_error)?;

        if raw.is_empty() {
            return Ok(None);
        }
        decode_hash(id, raw).map(Some)
    }

    async fn set(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let existing: Option<i64> = conn
            .zscore(self.index_key(collection), id)
            .await
            .map_err(query_error)?;
        let seq = match existing {
            Some(seq) => seq,
            None => conn.incr(self.seq_key(collection), 1).await.map_err(query_error)?,
        };

        self.replace(collection, id, seq, fields).await
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        let args = script_args(fields)?;
        let mut invocation = self.update_script.prepare_invoke();
        invocation.key(self.doc_key(collection, id));
        for arg in &args {
            invocation.arg(arg);
        }

        let mut conn = self.conn.clone();
        let result: Result<i64, RedisError> = invocation.invoke_async(&mut conn).await;
        match result {
            Ok(_) => Ok(()),
            Err(e) if e.code() == Some("NOT_FOUND") => Err(StoreError::NotFound),
            Err(e) => Err(query_error(e)),
        }
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let () = redis::pipe()
            .atomic()
            .del(self.doc_key(collection, id))
            .ignore()
            .zrem(self.index_key(collection), id)
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(query_error)?;
        Ok(())
    }

    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Snapshot>, StoreError> {
        let mut conn = self.conn.clone();
        let ids: Vec<String> = conn
            .zrange(self.index_key(collection), 0, -1)
            .await
            .map_err(query_error)?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut pipe = redis::pipe();
        for id in &ids {
            pipe.hgetall(self.doc_key(collection, id));
        }
        let hashes: Vec<HashMap<String, String>> =
            pipe.query_async(&mut conn).await.map_err(query_error)?;

        let mut snapshots = Vec::with_capacity(ids.len());
        for (id, raw) in ids.iter().zip(hashes) {
            // Index entries can briefly outlive their document.
            if raw.is_empty() {
                continue;
            }
            snapshots.push(decode_hash(id, raw)?);
        }

        Ok(query.apply(snapshots))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    async fn get_test_store() -> Option<RedisDocumentStore> {
        let config = RedisConfig {
            url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6389".to_string()),
            connect_timeout: Duration::from_secs(1),
            key_prefix: format!("board-test-{}", Uuid::new_v4()),
        };

        RedisDocumentStore::new(config).await.ok()
    }

    #[test]
    fn test_script_args_flatten_writes() {
        let fields = Fields::from([
            ("count".to_string(), FieldValue::Increment(-1)),
            ("items".to_string(), FieldValue::ArrayAppend(vec![Value::from(1), Value::from("a")])),
            ("name".to_string(), FieldValue::value("x")),
            ("when".to_string(), FieldValue::ServerTimestamp),
        ]);

        let args = script_args(fields).unwrap();
        assert_eq!(
            args,
            [
                "incr", "count", "-1", "append", "items", "1,\"a\"", "set", "name", "\"x\"", "ts",
                "when", ""
            ]
        );
    }

    #[tokio::test]
    async fn test_redis_document_lifecycle() {
        let store = match get_test_store().await {
            Some(s) => s,
            None => {
                tracing::warn!("Redis not available, skipping test");
                return;
            }
        };

        let id = store
            .add(
                "posts",
                Fields::from([
                    ("question".to_string(), FieldValue::value("Q1")),
                    ("replyCount".to_string(), FieldValue::value(0)),
                    ("replies".to_string(), FieldValue::value(Value::Array(Vec::new()))),
                ]),
            )
            .await
            .unwrap();

        store
            .update(
                "posts",
                &id,
                Fields::from([
                    ("replyCount".to_string(), FieldValue::Increment(1)),
                    (
                        "replies".to_string(),
                        FieldValue::ArrayAppend(vec![serde_json::json!({"text": "nice"})]),
                    ),
                ]),
            )
            .await
            .unwrap();

        let snapshot = store.get("posts", &id).await.unwrap().unwrap();
        assert_eq!(snapshot.data["replyCount"], Value::from(1));
        assert_eq!(snapshot.data["replies"], serde_json::json!([{"text": "nice"}]));

        let all = store.query("posts", &Query::all()).await.unwrap();
        assert_eq!(all.len(), 1);

        store.delete("posts", &id).await.unwrap();
        assert!(store.get("posts", &id).await.unwrap().is_none());

        let missing = store
            .update("posts", &id, Fields::from([("replyCount".to_string(), FieldValue::Increment(1))]))
            .await;
        assert!(matches!(missing, Err(StoreError::NotFound)));
    }
}
