//! Post shape with its replies stored inline.
//!
//! Shared by the embedded remote schema and the local-storage board. A
//! reply has no id of its own; its timestamp (as epoch millis) stands in.

use chrono::serde::ts_milliseconds;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{millis_or_now, null_as_default};

/// Reply stored inside its post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedReply {
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user: String,
    #[serde(with = "ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl EmbeddedReply {
    /// Create a reply stamped with the local clock.
    pub fn new(text: String, user: String) -> Self {
        Self {
            text,
            user,
            timestamp: Utc::now(),
        }
    }

    /// The identifier callers use to address this reply. Two replies
    /// created in the same millisecond collide.
    pub fn key(&self) -> String {
        self.timestamp.timestamp_millis().to_string()
    }
}

/// Post carrying its full reply list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedPost {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub question: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub answer: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user: String,
    #[serde(
        default = "Utc::now",
        serialize_with = "ts_milliseconds::serialize",
        deserialize_with = "millis_or_now"
    )]
    pub timestamp: DateTime<Utc>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub replies: Vec<EmbeddedReply>,
}

impl EmbeddedPost {
    pub fn reply_count(&self) -> usize {
        self.replies.len()
    }
}

/// Contents of a post that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct ThreadDraft {
    pub question: String,
    pub answer: String,
    pub user: String,
    pub replies: Vec<EmbeddedReply>,
}

impl ThreadDraft {
    pub fn new(question: String, answer: String, user: String) -> Self {
        Self {
            question,
            answer,
            user,
            replies: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_replies_default_to_empty() {
        let post: EmbeddedPost = serde_json::from_value(json!({
            "id": "1700000000000",
            "question": "Q",
            "answer": "A",
            "user": "User #1000",
            "timestamp": 1_700_000_000_000i64,
        }))
        .unwrap();

        assert!(post.replies.is_empty());
        assert_eq!(post.reply_count(), 0);
    }

    #[test]
    fn test_reply_key_is_timestamp_millis() {
        let reply: EmbeddedReply = serde_json::from_value(json!({
            "text": "nice",
            "user": "User #2000",
            "timestamp": 1_700_000_000_123i64,
        }))
        .unwrap();

        assert_eq!(reply.key(), "1700000000123");
    }

    #[test]
    fn test_null_replies_and_timestamp_fall_back() {
        let post: EmbeddedPost = serde_json::from_value(json!({
            "id": "p1",
            "question": "Q",
            "answer": "A",
            "user": "User #1000",
            "timestamp": null,
            "replies": null,
        }))
        .unwrap();

        assert!(post.replies.is_empty());
        assert!(post.timestamp.timestamp_millis() > 0);
    }
}
