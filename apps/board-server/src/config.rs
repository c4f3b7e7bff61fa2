//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use board_core::board::CounterMode;

/// Where posts and replies are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Redis,
}

/// Where each caller's profile entries (display name, moderation flag)
/// live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileBackend {
    Memory,
    /// One JSON file per profile under `profile_dir`.
    File,
    Redis,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub store_backend: StoreBackend,
    pub profile_backend: ProfileBackend,
    pub profile_dir: PathBuf,
    pub counter_mode: CounterMode,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let store_backend = match env::var("STORE_BACKEND").as_deref() {
            Ok("redis") => StoreBackend::Redis,
            _ => StoreBackend::Memory,
        };

        let profile_backend = match env::var("PROFILE_BACKEND").as_deref() {
            Ok("memory") => ProfileBackend::Memory,
            Ok("redis") => ProfileBackend::Redis,
            _ => ProfileBackend::File,
        };

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            store_backend,
            profile_backend,
            profile_dir: env::var("PROFILE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./profiles")),
            counter_mode: Self::parse_counter_mode(env::var("COUNTER_MODE").ok().as_deref()),
        }
    }

    /// `atomic` opts into store-side increments; anything else keeps the
    /// read-modify-write behaviour.
    fn parse_counter_mode(value: Option<&str>) -> CounterMode {
        match value {
            Some("atomic") => CounterMode::Atomic,
            _ => CounterMode::ReadModifyWrite,
        }
    }
}
