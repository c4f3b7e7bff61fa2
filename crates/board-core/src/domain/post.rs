use chrono::serde::ts_milliseconds;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{millis_or_now, non_negative_count, null_as_default};

/// Post entity in the normalized schema - a question/answer pair with a
/// maintained reply counter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub question: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub answer: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user: String,
    /// Falls back to the reader's clock while the store has not yet
    /// resolved the server timestamp.
    #[serde(
        default = "Utc::now",
        serialize_with = "ts_milliseconds::serialize",
        deserialize_with = "millis_or_now"
    )]
    pub timestamp: DateTime<Utc>,
    #[serde(default, deserialize_with = "non_negative_count")]
    pub reply_count: u32,
}
