//! # Board Core
//!
//! The domain layer of the anonymous discussion board: records, ports and
//! the board services built on them. No infrastructure dependencies.

pub mod board;
pub mod domain;
pub mod error;
pub mod ports;

pub use error::{BoardError, StorageError, StoreError};
