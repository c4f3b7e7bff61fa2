//! Board services - the caller-facing operations over the ports.
//!
//! [`NormalizedBoard`], [`EmbeddedBoard`] and [`LocalBoard`] are three
//! independent storage layouts for the same posts and replies. A caller
//! picks one; they are never combined.

mod embedded;
mod identity;
mod local;
mod moderation;
mod normalized;
mod shuffle;

pub use embedded::{EmbeddedBoard, THREADS_COLLECTION};
pub use identity::{ANON_USER_KEY, Identity};
pub use local::{LocalBoard, POSTS_KEY};
pub use moderation::{Deletion, IS_ADMIN_KEY, Moderation};
pub use normalized::{CounterMode, NormalizedBoard, POSTS_COLLECTION, REPLIES_COLLECTION};
pub use shuffle::coin_flip_shuffle;

use serde::de::DeserializeOwned;

use crate::ports::Snapshot;

/// Decode snapshots, skipping (and logging) any that do not fit `T`.
fn decode_all<T: DeserializeOwned>(snapshots: Vec<Snapshot>) -> Vec<T> {
    snapshots
        .into_iter()
        .filter_map(|snapshot| {
            let id = snapshot.id.clone();
            snapshot
                .decode()
                .inspect_err(|e| tracing::warn!(id = %id, error = %e, "Skipping malformed document"))
                .ok()
        })
        .collect()
}
