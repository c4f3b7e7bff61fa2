//! Client-side moderation flag.
//!
//! Whoever can write the profile can flip this flag. It gates deletes in
//! this process only and is not access control.

use std::sync::Arc;

use crate::error::StorageError;
use crate::ports::ProfileStorage;

/// Profile entry holding the moderation flag.
pub const IS_ADMIN_KEY: &str = "isAdmin";

/// Result of a moderated delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Deletion {
    Deleted,
    /// The flag was not set; the store was never contacted.
    NotPermitted,
}

#[derive(Clone)]
pub struct Moderation {
    storage: Arc<dyn ProfileStorage>,
}

impl Moderation {
    pub fn new(storage: Arc<dyn ProfileStorage>) -> Self {
        Self { storage }
    }

    /// True iff the flag entry holds exactly `"true"`.
    pub async fn is_admin(&self) -> bool {
        self.storage.get(IS_ADMIN_KEY).await.as_deref() == Some("true")
    }

    pub async fn set_admin(&self, enabled: bool) -> Result<(), StorageError> {
        if enabled {
            self.storage.set(IS_ADMIN_KEY, "true").await
        } else {
            self.storage.remove(IS_ADMIN_KEY).await
        }
    }
}
