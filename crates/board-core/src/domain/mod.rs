//! Domain entities - the records the board hands to its callers.

mod display_name;
mod post;
mod profile_id;
mod reply;
mod sort;
mod thread;

pub use display_name::DisplayName;
pub use post::Post;
pub use profile_id::ProfileId;
pub use reply::Reply;
pub use sort::SortOrder;
pub use thread::{EmbeddedPost, EmbeddedReply, ThreadDraft};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Reads a stored counter, clamping anything below zero to zero. Null
/// counts as zero.
pub(crate) fn non_negative_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<i64>::deserialize(deserializer)?.unwrap_or(0);
    Ok(raw.clamp(0, i64::from(u32::MAX)) as u32)
}

/// Reads epoch millis, falling back to the reader's clock when the value
/// is null or out of range.
pub(crate) fn millis_or_now<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let millis = Option::<i64>::deserialize(deserializer)?;
    Ok(millis
        .and_then(DateTime::from_timestamp_millis)
        .unwrap_or_else(Utc::now))
}

/// Treats an explicit null like a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
