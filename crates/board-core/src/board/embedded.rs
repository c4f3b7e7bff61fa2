//! Board over a single `posts` collection whose documents carry their
//! replies inline.
//!
//! Writes replace the whole document. [`EmbeddedBoard::add_reply`] loads,
//! appends locally and writes everything back, so concurrent writers to
//! the same post overwrite each other's replies (last write wins).
//! [`EmbeddedBoard::append_reply`] pushes onto the stored array instead.

use std::sync::Arc;

use serde_json::Value;

use super::{Deletion, Identity, Moderation, decode_all};
use crate::domain::{EmbeddedPost, EmbeddedReply, ThreadDraft};
use crate::error::{BoardError, StoreError};
use crate::ports::{Direction, DocumentStore, FieldValue, Fields, Query};

pub const THREADS_COLLECTION: &str = "posts";

const REPLIES: &str = "replies";
const TIMESTAMP: &str = "timestamp";

#[derive(Clone)]
pub struct EmbeddedBoard {
    store: Arc<dyn DocumentStore>,
    identity: Identity,
    moderation: Moderation,
}

impl EmbeddedBoard {
    pub fn new(store: Arc<dyn DocumentStore>, identity: Identity, moderation: Moderation) -> Self {
        Self {
            store,
            identity,
            moderation,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn moderation(&self) -> &Moderation {
        &self.moderation
    }

    /// All posts, newest first. Store failures yield an empty list.
    pub async fn load_posts(&self) -> Vec<EmbeddedPost> {
        let query = Query::order_by(TIMESTAMP, Direction::Descending);
        match self.store.query(THREADS_COLLECTION, &query).await {
            Ok(snapshots) => decode_all(snapshots),
            Err(e) => {
                tracing::error!(error = %e, "Error loading posts");
                Vec::new()
            }
        }
    }

    pub async fn load_post_by_id(&self, post_id: &str) -> Option<EmbeddedPost> {
        match self.store.get(THREADS_COLLECTION, post_id).await {
            Ok(snapshot) => snapshot.and_then(|s| {
                s.decode()
                    .inspect_err(|e| tracing::error!(post_id = %post_id, error = %e, "Malformed post"))
                    .ok()
            }),
            Err(e) => {
                tracing::error!(post_id = %post_id, error = %e, "Error loading post");
                None
            }
        }
    }

    /// Draft a post authored by the current user.
    pub async fn draft(&self, question: &str, answer: &str) -> ThreadDraft {
        let user = self.identity.current_user().await;
        ThreadDraft::new(question.to_string(), answer.to_string(), user.into_inner())
    }

    /// Insert a draft as a new document; the store assigns id and time.
    pub async fn save_new_post(&self, draft: ThreadDraft) -> Result<String, BoardError> {
        let fields = Fields::from([
            ("question".to_string(), FieldValue::value(draft.question)),
            ("answer".to_string(), FieldValue::value(draft.answer)),
            ("user".to_string(), FieldValue::value(draft.user)),
            (TIMESTAMP.to_string(), FieldValue::ServerTimestamp),
            (REPLIES.to_string(), FieldValue::Value(serde_json::to_value(&draft.replies)?)),
        ]);

        let id = self
            .store
            .add(THREADS_COLLECTION, fields)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Error saving post"))?;

        tracing::info!(post_id = %id, "Post created");
        Ok(id)
    }

    /// Replace the stored document with `post`. Fields not carried by
    /// `post` are gone afterwards.
    pub async fn update_post(&self, post_id: &str, post: &EmbeddedPost) -> Result<(), BoardError> {
        let fields = Fields::from([
            ("question".to_string(), FieldValue::value(post.question.as_str())),
            ("answer".to_string(), FieldValue::value(post.answer.as_str())),
            ("user".to_string(), FieldValue::value(post.user.as_str())),
            (TIMESTAMP.to_string(), FieldValue::value(post.timestamp.timestamp_millis())),
            (REPLIES.to_string(), FieldValue::Value(serde_json::to_value(&post.replies)?)),
        ]);

        self.store
            .set(THREADS_COLLECTION, post_id, fields)
            .await
            .inspect_err(|e| tracing::error!(post_id = %post_id, error = %e, "Error updating post"))?;

        tracing::debug!(post_id = %post_id, replies = post.replies.len(), "Post replaced");
        Ok(())
    }

    /// Load, append and replace. Loses replies written concurrently by
    /// other callers between the load and the write.
    pub async fn add_reply(&self, post_id: &str, text: &str) -> Result<EmbeddedReply, BoardError> {
        let snapshot = self
            .store
            .get(THREADS_COLLECTION, post_id)
            .await?
            .ok_or(StoreError::NotFound)?;
        let mut post: EmbeddedPost = snapshot.decode()?;

        let reply = self.new_reply(text).await;
        post.replies.push(reply.clone());
        self.update_post(post_id, &post).await?;

        tracing::info!(post_id = %post_id, reply = %reply.key(), "Reply added");
        Ok(reply)
    }

    /// Append on the store side; concurrent appends all survive.
    pub async fn append_reply(&self, post_id: &str, text: &str) -> Result<EmbeddedReply, BoardError> {
        let reply = self.new_reply(text).await;
        let item: Value = serde_json::to_value(&reply)?;
        let fields = Fields::from([(REPLIES.to_string(), FieldValue::ArrayAppend(vec![item]))]);

        self.store
            .update(THREADS_COLLECTION, post_id, fields)
            .await
            .inspect_err(|e| tracing::error!(post_id = %post_id, error = %e, "Error appending reply"))?;

        tracing::info!(post_id = %post_id, reply = %reply.key(), "Reply appended");
        Ok(reply)
    }

    /// Delete a post; its replies go with it.
    pub async fn delete_post(&self, post_id: &str) -> Result<Deletion, BoardError> {
        if !self.moderation.is_admin().await {
            tracing::warn!(post_id = %post_id, "Refusing to delete post without moderation flag");
            return Ok(Deletion::NotPermitted);
        }

        self.store
            .delete(THREADS_COLLECTION, post_id)
            .await
            .inspect_err(|e| tracing::error!(post_id = %post_id, error = %e, "Error deleting post"))?;

        tracing::info!(post_id = %post_id, "Post deleted");
        Ok(Deletion::Deleted)
    }

    async fn new_reply(&self, text: &str) -> EmbeddedReply {
        let user = self.identity.current_user().await;
        EmbeddedReply::new(text.to_string(), user.into_inner())
    }
}
