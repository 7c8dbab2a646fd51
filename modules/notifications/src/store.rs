//! Notification persistence and user-lookup seams
//!
//! Both collaborators live outside this subsystem; the traits capture the
//! narrow surface the consumer needs, with in-memory implementations for
//! tests and local runs.

use crate::models::Notification;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("notification store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Save keyed by the originating event id; a duplicate is a no-op.
    ///
    /// Returns `Ok(true)` when stored, `Ok(false)` on redelivery.
    async fn save(&self, notification: Notification) -> Result<bool, StoreError>;

    async fn feed_for(&self, user_id: i64) -> Result<Vec<Notification>, StoreError>;

    async fn count(&self) -> Result<usize, StoreError>;
}

/// Display-name lookup on the user service
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn display_name(&self, user_id: i64) -> Option<String>;
}

/// In-memory store for tests and development
#[derive(Default)]
pub struct InMemoryNotificationStore {
    inner: Mutex<StoreInner>,
}

#[derive(Default)]
struct StoreInner {
    seen_events: HashSet<Uuid>,
    notifications: Vec<Notification>,
}

impl InMemoryNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NotificationStore for InMemoryNotificationStore {
    async fn save(&self, notification: Notification) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().expect("notification store lock poisoned");
        if !inner.seen_events.insert(notification.event_id) {
            return Ok(false);
        }
        inner.notifications.push(notification);
        Ok(true)
    }

    async fn feed_for(&self, user_id: i64) -> Result<Vec<Notification>, StoreError> {
        let inner = self.inner.lock().expect("notification store lock poisoned");
        Ok(inner
            .notifications
            .iter()
            .filter(|n| n.recipient_user_id == user_id)
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        let inner = self.inner.lock().expect("notification store lock poisoned");
        Ok(inner.notifications.len())
    }
}

/// Fixed user table for tests and development
#[derive(Default)]
pub struct StaticUserDirectory {
    names: HashMap<i64, String>,
}

impl StaticUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, user_id: i64, display_name: impl Into<String>) -> Self {
        self.names.insert(user_id, display_name.into());
        self
    }
}

#[async_trait]
impl UserDirectory for StaticUserDirectory {
    async fn display_name(&self, user_id: i64) -> Option<String> {
        self.names.get(&user_id).cloned()
    }
}
