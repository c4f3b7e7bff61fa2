//! Board over two collections: `posts` and `replies`, linked by `postId`.
//!
//! Each post carries a `replyCount` that is maintained by separate writes
//! after a reply is added or deleted. Nothing ties those writes together:
//! a failure in between leaves the counter stale, and under the default
//! [`CounterMode::ReadModifyWrite`] two concurrent replies can both read
//! the same count and lose an increment.

use std::sync::Arc;

use futures::future::try_join_all;
use serde_json::Value;

use super::{Deletion, Identity, Moderation, coin_flip_shuffle, decode_all};
use crate::domain::{Post, Reply, SortOrder};
use crate::error::{BoardError, StoreError};
use crate::ports::{Direction, DocumentStore, FieldValue, Fields, Query};

pub const POSTS_COLLECTION: &str = "posts";
pub const REPLIES_COLLECTION: &str = "replies";

const REPLY_COUNT: &str = "replyCount";
const POST_ID: &str = "postId";
const TIMESTAMP: &str = "timestamp";

/// How `replyCount` is kept in step with the replies collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CounterMode {
    /// Read the post, then write back the adjusted count.
    #[default]
    ReadModifyWrite,
    /// Let the store apply the increment.
    Atomic,
}

#[derive(Clone)]
pub struct NormalizedBoard {
    store: Arc<dyn DocumentStore>,
    identity: Identity,
    moderation: Moderation,
    counter_mode: CounterMode,
}

impl NormalizedBoard {
    pub fn new(store: Arc<dyn DocumentStore>, identity: Identity, moderation: Moderation) -> Self {
        Self {
            store,
            identity,
            moderation,
            counter_mode: CounterMode::default(),
        }
    }

    pub fn with_counter_mode(mut self, counter_mode: CounterMode) -> Self {
        self.counter_mode = counter_mode;
        self
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn moderation(&self) -> &Moderation {
        &self.moderation
    }

    /// Store a new post by the current user and return its id.
    pub async fn create_post(&self, question: &str, answer: &str) -> Result<String, BoardError> {
        let user = self.identity.current_user().await;
        let fields = Fields::from([
            ("question".to_string(), FieldValue::value(question)),
            ("answer".to_string(), FieldValue::value(answer)),
            ("user".to_string(), FieldValue::value(user.into_inner())),
            (TIMESTAMP.to_string(), FieldValue::ServerTimestamp),
            (REPLY_COUNT.to_string(), FieldValue::value(0)),
        ]);

        let id = self
            .store
            .add(POSTS_COLLECTION, fields)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Error creating post"))?;

        tracing::info!(post_id = %id, "Post created");
        Ok(id)
    }

    /// List posts. Store failures yield an empty list.
    pub async fn load_posts(&self, sort: SortOrder) -> Vec<Post> {
        let query = match sort {
            SortOrder::Newest => Query::order_by(TIMESTAMP, Direction::Descending),
            SortOrder::Most => Query::order_by(REPLY_COUNT, Direction::Descending),
            SortOrder::Random => Query::all(),
        };

        let snapshots = match self.store.query(POSTS_COLLECTION, &query).await {
            Ok(snapshots) => snapshots,
            Err(e) => {
                tracing::error!(error = %e, sort = %sort, "Error loading posts");
                return Vec::new();
            }
        };

        let mut posts: Vec<Post> = decode_all(snapshots);
        if sort == SortOrder::Random {
            coin_flip_shuffle(&mut posts, &mut rand::thread_rng());
        }

        tracing::debug!(count = posts.len(), sort = %sort, "Posts loaded");
        posts
    }

    /// Point lookup. Absent when the post does not exist or cannot be read.
    pub async fn load_post_by_id(&self, post_id: &str) -> Option<Post> {
        match self.store.get(POSTS_COLLECTION, post_id).await {
            Ok(Some(snapshot)) => snapshot
                .decode()
                .inspect_err(|e| tracing::error!(post_id = %post_id, error = %e, "Malformed post"))
                .ok(),
            Ok(None) => {
                tracing::debug!(post_id = %post_id, "Post not found");
                None
            }
            Err(e) => {
                tracing::error!(post_id = %post_id, error = %e, "Error loading post");
                None
            }
        }
    }

    /// Delete a post and every reply pointing at it.
    ///
    /// Replies go first, concurrently, then the post. A failure part way
    /// leaves orphaned replies or a post with a stale count.
    pub async fn delete_post(&self, post_id: &str) -> Result<Deletion, BoardError> {
        if !self.moderation.is_admin().await {
            tracing::warn!(post_id = %post_id, "Refusing to delete post without moderation flag");
            return Ok(Deletion::NotPermitted);
        }

        let result = self.cascade_delete(post_id).await;
        if let Err(e) = &result {
            tracing::error!(post_id = %post_id, error = %e, "Error deleting post");
        }
        result?;

        Ok(Deletion::Deleted)
    }

    async fn cascade_delete(&self, post_id: &str) -> Result<(), StoreError> {
        let replies = self.store.query(REPLIES_COLLECTION, &Query::all()).await?;
        let doomed: Vec<String> = replies
            .into_iter()
            .filter(|reply| reply.data.get(POST_ID).and_then(Value::as_str) == Some(post_id))
            .map(|reply| reply.id)
            .collect();

        let store = &self.store;
        try_join_all(
            doomed
                .iter()
                .map(|reply_id| store.delete(REPLIES_COLLECTION, reply_id)),
        )
        .await?;

        self.store.delete(POSTS_COLLECTION, post_id).await?;
        tracing::info!(post_id = %post_id, replies = doomed.len(), "Post and replies deleted");
        Ok(())
    }

    /// Store a reply by the current user, then bump the parent's count.
    pub async fn add_reply(&self, post_id: &str, text: &str) -> Result<String, BoardError> {
        let user = self.identity.current_user().await;
        let fields = Fields::from([
            (POST_ID.to_string(), FieldValue::value(post_id)),
            ("text".to_string(), FieldValue::value(text)),
            ("user".to_string(), FieldValue::value(user.into_inner())),
            (TIMESTAMP.to_string(), FieldValue::ServerTimestamp),
        ]);

        let id = self
            .store
            .add(REPLIES_COLLECTION, fields)
            .await
            .inspect_err(|e| tracing::error!(post_id = %post_id, error = %e, "Error adding reply"))?;

        self.adjust_reply_count(post_id, 1)
            .await
            .inspect_err(|e| tracing::error!(post_id = %post_id, error = %e, "Error updating reply count"))?;

        tracing::info!(post_id = %post_id, reply_id = %id, "Reply created");
        Ok(id)
    }

    /// Replies to a post, oldest first. Store failures yield an empty list.
    ///
    /// The whole collection is fetched and filtered here, so this is only
    /// correct while the store returns every reply in one response.
    pub async fn load_replies(&self, post_id: &str) -> Vec<Reply> {
        let query = Query::order_by(TIMESTAMP, Direction::Ascending);
        let snapshots = match self.store.query(REPLIES_COLLECTION, &query).await {
            Ok(snapshots) => snapshots,
            Err(e) => {
                tracing::error!(post_id = %post_id, error = %e, "Error loading replies");
                return Vec::new();
            }
        };

        let matching = snapshots
            .into_iter()
            .filter(|reply| reply.data.get(POST_ID).and_then(Value::as_str) == Some(post_id))
            .collect();
        decode_all(matching)
    }

    /// Delete one reply and decrement the parent's count, never below zero.
    pub async fn delete_reply(&self, reply_id: &str, post_id: &str) -> Result<Deletion, BoardError> {
        if !self.moderation.is_admin().await {
            tracing::warn!(reply_id = %reply_id, "Refusing to delete reply without moderation flag");
            return Ok(Deletion::NotPermitted);
        }

        self.store
            .delete(REPLIES_COLLECTION, reply_id)
            .await
            .inspect_err(|e| tracing::error!(reply_id = %reply_id, error = %e, "Error deleting reply"))?;

        self.adjust_reply_count(post_id, -1)
            .await
            .inspect_err(|e| tracing::error!(post_id = %post_id, error = %e, "Error updating reply count"))?;

        tracing::info!(post_id = %post_id, reply_id = %reply_id, "Reply deleted");
        Ok(Deletion::Deleted)
    }

    /// A missing parent post is skipped silently.
    async fn adjust_reply_count(&self, post_id: &str, delta: i64) -> Result<(), StoreError> {
        match self.counter_mode {
            CounterMode::ReadModifyWrite => {
                let Some(post) = self.store.get(POSTS_COLLECTION, post_id).await? else {
                    return Ok(());
                };
                let current = post.data.get(REPLY_COUNT).and_then(Value::as_i64).unwrap_or(0);
                let next = (current + delta).max(0);
                self.store
                    .update(POSTS_COLLECTION, post_id, count_field(FieldValue::value(next)))
                    .await
            }
            CounterMode::Atomic => {
                let increment = count_field(FieldValue::Increment(delta));
                match self.store.update(POSTS_COLLECTION, post_id, increment).await {
                    Err(StoreError::NotFound) => return Ok(()),
                    result => result?,
                }
                if delta < 0 {
                    self.clamp_reply_count(post_id).await?;
                }
                Ok(())
            }
        }
    }

    async fn clamp_reply_count(&self, post_id: &str) -> Result<(), StoreError> {
        let Some(post) = self.store.get(POSTS_COLLECTION, post_id).await? else {
            return Ok(());
        };
        let current = post.data.get(REPLY_COUNT).and_then(Value::as_i64).unwrap_or(0);
        if current < 0 {
            self.store
                .update(POSTS_COLLECTION, post_id, count_field(FieldValue::Increment(-current)))
                .await?;
        }
        Ok(())
    }
}

fn count_field(value: FieldValue) -> Fields {
    Fields::from([(REPLY_COUNT.to_string(), value)])
}
