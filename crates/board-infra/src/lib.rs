//! # Board Infrastructure
//!
//! Concrete implementations of the ports defined in `board-core`.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external services, in-memory and file storage only
//! - `redis` - Redis-backed document store and profile storage

pub mod document;
pub mod storage;

#[cfg(feature = "redis")]
pub mod connection;

// Re-exports - In-Memory / File
pub use document::InMemoryDocumentStore;
pub use storage::{
    FileProfileDirectory, FileProfileStorage, InMemoryProfileDirectory, InMemoryProfileStorage,
};

// Re-exports - Redis
#[cfg(feature = "redis")]
pub use connection::RedisConfig;
#[cfg(feature = "redis")]
pub use document::RedisDocumentStore;
#[cfg(feature = "redis")]
pub use storage::{RedisProfileDirectory, RedisProfileStorage};
