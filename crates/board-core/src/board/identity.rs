//! Anonymous identity provider.

use std::sync::Arc;

use crate::domain::DisplayName;
use crate::ports::ProfileStorage;

/// Profile entry holding the display name.
pub const ANON_USER_KEY: &str = "anonUser";

/// Hands out the profile's display name, drawing and persisting one on
/// first use.
#[derive(Clone)]
pub struct Identity {
    storage: Arc<dyn ProfileStorage>,
}

impl Identity {
    pub fn new(storage: Arc<dyn ProfileStorage>) -> Self {
        Self { storage }
    }

    /// Current display name. Never fails: if the name cannot be persisted
    /// it is still returned, and the next call draws a new one.
    pub async fn current_user(&self) -> DisplayName {
        if let Some(name) = self.storage.get(ANON_USER_KEY).await.filter(|n| !n.is_empty()) {
            return DisplayName::from(name);
        }

        let name = DisplayName::generate(&mut rand::thread_rng());
        match self.storage.set(ANON_USER_KEY, name.as_str()).await {
            Ok(()) => tracing::info!(user = %name, "Generated display name"),
            Err(e) => tracing::warn!(user = %name, error = %e, "Failed to persist display name"),
        }
        name
    }
}
