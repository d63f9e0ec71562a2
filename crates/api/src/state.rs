//! Shared application state.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::Database;
use crate::jwt::TokenIssuer;
use crate::notify::NotificationQueue;
use crate::upload::ObjectStorageRelay;

/// Shared application state passed to all handlers.
///
/// Cheap to clone; all clones share the same inner state.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    db: Database,
    tokens: TokenIssuer,
    notifications: NotificationQueue,
    uploader: Option<ObjectStorageRelay>,
}

impl AppState {
    /// Assemble the application state.
    #[must_use]
    pub fn new(
        config: AppConfig,
        db: Database,
        tokens: TokenIssuer,
        notifications: NotificationQueue,
    ) -> Self {
        let uploader = config
            .upload()
            .map(|u| ObjectStorageRelay::new(u.endpoint.clone()));
        Self {
            inner: Arc::new(AppStateInner {
                config,
                db,
                tokens,
                notifications,
                uploader,
            }),
        }
    }

    /// Application configuration.
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Document store handle.
    #[must_use]
    pub fn db(&self) -> &Database {
        &self.inner.db
    }

    /// Token issuer.
    #[must_use]
    pub fn tokens(&self) -> &TokenIssuer {
        &self.inner.tokens
    }

    /// Notification queue.
    #[must_use]
    pub fn notifications(&self) -> &NotificationQueue {
        &self.inner.notifications
    }

    /// Upload relay, if configured.
    #[must_use]
    pub fn uploader(&self) -> Option<&ObjectStorageRelay> {
        self.inner.uploader.as_ref()
    }
}
