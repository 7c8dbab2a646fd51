//! Routing and handling of incoming activity events
//!
//! The audit group reads every message on its topics and acts only when
//! `requiresAudit` is set. Delivery is at-least-once, so the store insert
//! is idempotent per event id and transient store failures are retried
//! with backoff before the message is given up on.

use crate::models::AuditRecord;
use crate::store::AuditStore;
use activity_events::envelope::ActivityEvent;
use event_bus::consumer_retry::{retry_with_backoff, RetryConfig};
use event_bus::BusMessage;

#[derive(Debug, thiserror::Error)]
pub enum ConsumerError {
    #[error("malformed event payload: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] crate::store::StoreError),
}

/// Handle one message from the bus
///
/// Returns `Ok` both for recorded events and for events the audit concern
/// ignores (flag unset, duplicate id).
pub async fn handle_message(
    store: &dyn AuditStore,
    retry: &RetryConfig,
    msg: &BusMessage,
) -> Result<(), ConsumerError> {
    let event: ActivityEvent = serde_json::from_slice(&msg.payload)?;

    if !event.requires_audit {
        tracing::debug!(
            event_id = %event.event_id,
            topic = %msg.topic,
            "Event does not require audit, skipping"
        );
        return Ok(());
    }

    let record = AuditRecord::from_event(&event);
    let inserted = retry_with_backoff(
        || store.record(record.clone()),
        retry,
        "record_audit_event",
    )
    .await?;

    if inserted {
        tracing::info!(
            event_id = %event.event_id,
            entity_type = ?event.entity_type,
            action = ?event.action,
            "Audit record written"
        );
    } else {
        // Redelivery under at-least-once semantics; the first delivery won
        tracing::debug!(
            event_id = %event.event_id,
            "Audit record already exists, skipping duplicate"
        );
    }

    Ok(())
}
