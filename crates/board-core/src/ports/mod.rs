//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod document_store;
mod storage;

pub use document_store::{
    Direction, Document, DocumentStore, FieldValue, Fields, OrderBy, Query, Snapshot,
    apply_fields, compare_values,
};
pub use storage::{ProfileDirectory, ProfileStorage};
