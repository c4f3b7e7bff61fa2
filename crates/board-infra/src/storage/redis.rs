//! Redis-backed profile storage, so a profile can follow its owner across
//! processes.

use std::sync::Arc;

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

use board_core::StorageError;
use board_core::domain::ProfileId;
use board_core::ports::{ProfileDirectory, ProfileStorage};

use crate::connection::{RedisConfig, connect};

/// Redis-backed profile storage. Entries of one profile share a hash.
pub struct RedisProfileStorage {
    conn: ConnectionManager,
    hash_key: String,
}

impl RedisProfileStorage {
    pub async fn new(config: RedisConfig, profile: &str) -> Result<Self, StorageError> {
        let conn = connect(&config).await.map_err(StorageError::Io)?;
        Ok(Self::with_connection(conn, &config.key_prefix, profile))
    }

    fn with_connection(conn: ConnectionManager, key_prefix: &str, profile: &str) -> Self {
        Self {
            conn,
            hash_key: format!("{}:profile:{}", key_prefix, profile),
        }
    }
}

/// Profiles as Redis hashes over one shared connection.
pub struct RedisProfileDirectory {
    conn: ConnectionManager,
    key_prefix: String,
}

impl RedisProfileDirectory {
    pub async fn new(config: RedisConfig) -> Result<Self, StorageError> {
        let conn = connect(&config).await.map_err(StorageError::Io)?;
        Ok(Self {
            conn,
            key_prefix: config.key_prefix,
        })
    }

    pub async fn from_env() -> Result<Self, StorageError> {
        Self::new(RedisConfig::from_env()).await
    }
}

#[async_trait]
impl ProfileDirectory for RedisProfileDirectory {
    async fn open(&self, profile: &ProfileId) -> Result<Arc<dyn ProfileStorage>, StorageError> {
        let storage: Arc<dyn ProfileStorage> = Arc::new(RedisProfileStorage::with_connection(
            self.conn.clone(),
            &self.key_prefix,
            profile.as_str(),
        ));
        Ok(storage)
    }
}

#[async_trait]
impl ProfileStorage for RedisProfileStorage {
    async fn get(&self, key: &str) -> Option<String> {
        let mut conn = self.conn.clone();
        match conn.hget::<_, _, Option<String>>(&self.hash_key, key).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Redis HGET failed");
                None
            }
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut conn = self.conn.clone();
        conn.hset::<_, _, _, ()>(&self.hash_key, key, value)
            .await
            .map_err(|e| StorageError::Operation(e.to_string()))?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut conn = self.conn.clone();
        conn.hdel::<_, _, ()>(&self.hash_key, key)
            .await
            .map_err(|e| StorageError::Operation(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    async fn get_test_storage() -> Option<RedisProfileStorage> {
        let config = RedisConfig {
            url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6389".to_string()),
            connect_timeout: Duration::from_secs(1),
            key_prefix: "board-test".to_string(),
        };

        RedisProfileStorage::new(config, &uuid::Uuid::new_v4().to_string())
            .await
            .ok()
    }

    #[tokio::test]
    async fn test_redis_profile_set_get_remove() {
        let storage = match get_test_storage().await {
            Some(s) => s,
            None => {
                tracing::warn!("Redis not available, skipping test");
                return;
            }
        };

        storage.set("anonUser", "User #5555").await.unwrap();
        assert_eq!(storage.get("anonUser").await, Some("User #5555".to_string()));

        storage.remove("anonUser").await.unwrap();
        assert_eq!(storage.get("anonUser").await, None);
    }

    #[tokio::test]
    async fn test_redis_directory_keeps_profiles_apart() {
        let config = RedisConfig {
            url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6389".to_string()),
            connect_timeout: Duration::from_secs(1),
            key_prefix: "board-test".to_string(),
        };
        let directory = match RedisProfileDirectory::new(config).await {
            Ok(d) => d,
            Err(_) => {
                tracing::warn!("Redis not available, skipping test");
                return;
            }
        };

        let fresh = || ProfileId::parse(&uuid::Uuid::new_v4().simple().to_string()).unwrap();
        let (first, second) = (fresh(), fresh());

        directory.open(&first).await.unwrap().set("isAdmin", "true").await.unwrap();
        assert_eq!(
            directory.open(&first).await.unwrap().get("isAdmin").await,
            Some("true".to_string())
        );
        assert_eq!(directory.open(&second).await.unwrap().get("isAdmin").await, None);
    }
}
