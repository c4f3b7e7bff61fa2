//! Offline board kept entirely in profile storage.
//!
//! Every post lives in one JSON array under [`POSTS_KEY`]; each mutation
//! loads the whole array and writes it back.

use std::sync::Arc;

use chrono::Utc;

use super::{Deletion, Identity, Moderation};
use crate::domain::{EmbeddedPost, EmbeddedReply};
use crate::error::BoardError;
use crate::ports::ProfileStorage;

/// Profile entry holding the serialized posts.
pub const POSTS_KEY: &str = "anonymousForumPosts";

#[derive(Clone)]
pub struct LocalBoard {
    storage: Arc<dyn ProfileStorage>,
    identity: Identity,
    moderation: Moderation,
}

impl LocalBoard {
    pub fn new(storage: Arc<dyn ProfileStorage>, identity: Identity, moderation: Moderation) -> Self {
        Self {
            storage,
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

    /// Stored posts in stored order. Missing or corrupt data yields an
    /// empty list.
    pub async fn load_posts(&self) -> Vec<EmbeddedPost> {
        let Some(json) = self.storage.get(POSTS_KEY).await else {
            return Vec::new();
        };

        serde_json::from_str(&json).unwrap_or_else(|e| {
            tracing::error!(error = %e, "Error loading posts from profile storage");
            Vec::new()
        })
    }

    pub async fn save_posts(&self, posts: &[EmbeddedPost]) -> Result<(), BoardError> {
        let json = serde_json::to_string(posts)?;
        self.storage.set(POSTS_KEY, &json).await?;
        Ok(())
    }

    pub async fn load_post_by_id(&self, post_id: &str) -> Option<EmbeddedPost> {
        self.load_posts().await.into_iter().find(|p| p.id == post_id)
    }

    /// Create a post by the current user. Its id is the creation time in
    /// epoch millis, so two posts in the same millisecond share an id.
    pub async fn create_post(&self, question: &str, answer: &str) -> Result<EmbeddedPost, BoardError> {
        let user = self.identity.current_user().await;
        let timestamp = Utc::now();
        let post = EmbeddedPost {
            id: timestamp.timestamp_millis().to_string(),
            question: question.to_string(),
            answer: answer.to_string(),
            user: user.into_inner(),
            timestamp,
            replies: Vec::new(),
        };

        self.save_new_post(post.clone()).await?;
        Ok(post)
    }

    /// Append a post as given. Id uniqueness is the caller's problem.
    pub async fn save_new_post(&self, post: EmbeddedPost) -> Result<(), BoardError> {
        let mut posts = self.load_posts().await;
        let post_id = post.id.clone();
        posts.push(post);
        self.save_posts(&posts).await?;

        tracing::info!(post_id = %post_id, "Post saved to profile storage");
        Ok(())
    }

    /// Append a reply by the current user. `None` if the post is unknown.
    pub async fn add_reply(&self, post_id: &str, text: &str) -> Result<Option<EmbeddedReply>, BoardError> {
        let mut posts = self.load_posts().await;
        let Some(post) = posts.iter_mut().find(|p| p.id == post_id) else {
            tracing::debug!(post_id = %post_id, "Post not found");
            return Ok(None);
        };

        let user = self.identity.current_user().await;
        let reply = EmbeddedReply::new(text.to_string(), user.into_inner());
        post.replies.push(reply.clone());
        self.save_posts(&posts).await?;

        tracing::info!(post_id = %post_id, reply = %reply.key(), "Reply saved to profile storage");
        Ok(Some(reply))
    }

    pub async fn delete_post(&self, post_id: &str) -> Result<Deletion, BoardError> {
        if !self.moderation.is_admin().await {
            tracing::warn!(post_id = %post_id, "Refusing to delete post without moderation flag");
            return Ok(Deletion::NotPermitted);
        }

        let mut posts = self.load_posts().await;
        posts.retain(|p| p.id != post_id);
        self.save_posts(&posts).await?;

        tracing::info!(post_id = %post_id, "Post deleted from profile storage");
        Ok(Deletion::Deleted)
    }

    /// Remove every reply of `post_id` whose key (timestamp millis) equals
    /// `reply_key`. An unknown post leaves storage untouched.
    pub async fn delete_reply(&self, post_id: &str, reply_key: &str) -> Result<Deletion, BoardError> {
        if !self.moderation.is_admin().await {
            tracing::warn!(post_id = %post_id, "Refusing to delete reply without moderation flag");
            return Ok(Deletion::NotPermitted);
        }

        let mut posts = self.load_posts().await;
        if let Some(post) = posts.iter_mut().find(|p| p.id == post_id) {
            post.replies.retain(|r| r.key() != reply_key);
            self.save_posts(&posts).await?;
            tracing::info!(post_id = %post_id, reply = %reply_key, "Reply deleted from profile storage");
        }

        Ok(Deletion::Deleted)
    }
}
