//! Audit persistence seam
//!
//! The real store is a database owned by the audit service; this module
//! defines the interface the consumer needs (an idempotent insert and a
//! lookup) plus an in-memory implementation for tests and local runs.

use crate::models::AuditRecord;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("audit store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Insert keyed by `event_id`; a duplicate id is a no-op.
    ///
    /// Returns `Ok(true)` when the record was inserted, `Ok(false)` when a
    /// record with the same event id already existed (redelivery).
    async fn record(&self, record: AuditRecord) -> Result<bool, StoreError>;

    async fn find_by_event_id(&self, event_id: Uuid) -> Result<Option<AuditRecord>, StoreError>;

    async fn count(&self) -> Result<usize, StoreError>;
}

/// HashMap-backed store for tests and development
#[derive(Default)]
pub struct InMemoryAuditStore {
    records: Mutex<HashMap<Uuid, AuditRecord>>,
}

impl InMemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuditStore for InMemoryAuditStore {
    async fn record(&self, record: AuditRecord) -> Result<bool, StoreError> {
        let mut records = self.records.lock().expect("audit store lock poisoned");
        match records.entry(record.event_id) {
            std::collections::hash_map::Entry::Occupied(_) => Ok(false),
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(true)
            }
        }
    }

    async fn find_by_event_id(&self, event_id: Uuid) -> Result<Option<AuditRecord>, StoreError> {
        let records = self.records.lock().expect("audit store lock poisoned");
        Ok(records.get(&event_id).cloned())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        let records = self.records.lock().expect("audit store lock poisoned");
        Ok(records.len())
    }
}
