use chrono::serde::ts_milliseconds;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{millis_or_now, null_as_default};

/// Reply entity in the normalized schema, linked to its post by `post_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub post_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user: String,
    #[serde(
        default = "Utc::now",
        serialize_with = "ts_milliseconds::serialize",
        deserialize_with = "millis_or_now"
    )]
    pub timestamp: DateTime<Utc>,
}
