//! Feed persistence seam with an in-memory implementation for tests

use crate::models::FeedEntry;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("feed store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait FeedStore: Send + Sync {
    /// Append keyed by the originating event id; a duplicate is a no-op.
    ///
    /// Returns `Ok(true)` when appended, `Ok(false)` on redelivery.
    async fn append(&self, entry: FeedEntry) -> Result<bool, StoreError>;

    async fn feed_for(&self, user_id: i64) -> Result<Vec<FeedEntry>, StoreError>;

    async fn count(&self) -> Result<usize, StoreError>;
}

/// In-memory store for tests and development
#[derive(Default)]
pub struct InMemoryFeedStore {
    inner: Mutex<StoreInner>,
}

#[derive(Default)]
struct StoreInner {
    seen_events: HashSet<Uuid>,
    entries: Vec<FeedEntry>,
}

impl InMemoryFeedStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FeedStore for InMemoryFeedStore {
    async fn append(&self, entry: FeedEntry) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().expect("feed store lock poisoned");
        if !inner.seen_events.insert(entry.event_id) {
            return Ok(false);
        }
        inner.entries.push(entry);
        Ok(true)
    }

    async fn feed_for(&self, user_id: i64) -> Result<Vec<FeedEntry>, StoreError> {
        let inner = self.inner.lock().expect("feed store lock poisoned");
        Ok(inner
            .entries
            .iter()
            .filter(|e| e.feed_owner_user_id == user_id)
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        let inner = self.inner.lock().expect("feed store lock poisoned");
        Ok(inner.entries.len())
    }
}
