//! Profile storage implementations - in-memory, file and Redis.

mod file;
mod memory;

pub use file::{FileProfileDirectory, FileProfileStorage};
pub use memory::{InMemoryProfileDirectory, InMemoryProfileStorage};

#[cfg(feature = "redis")]
mod redis;
#[cfg(feature = "redis")]
pub use self::redis::{RedisProfileDirectory, RedisProfileStorage};
