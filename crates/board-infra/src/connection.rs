//! Redis connection settings shared by the Redis-backed adapters.

use std::time::Duration;

use redis::Client;
use redis::aio::ConnectionManager;

/// Redis connection configuration.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis URL (e.g., redis://localhost:6379)
    pub url: String,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Prefix for every key written by the board
    pub key_prefix: String,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            connect_timeout: Duration::from_secs(5),
            key_prefix: "board".to_string(),
        }
    }
}

impl RedisConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            connect_timeout: Duration::from_secs(
                std::env::var("REDIS_CONNECT_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
            key_prefix: std::env::var("REDIS_KEY_PREFIX").unwrap_or_else(|_| "board".to_string()),
        }
    }
}

/// Open a managed connection, giving up after `connect_timeout`.
pub(crate) async fn connect(config: &RedisConfig) -> Result<ConnectionManager, String> {
    let client = Client::open(config.url.as_str()).map_err(|e| e.to_string())?;

    // Use timeout to prevent hanging if Redis is unreachable
    let conn = tokio::time::timeout(config.connect_timeout, ConnectionManager::new(client))
        .await
        .map_err(|_| "Connection timed out".to_string())?
        .map_err(|e| e.to_string())?;

    tracing::info!(url = %config.url, "Connected to Redis");
    Ok(conn)
}
