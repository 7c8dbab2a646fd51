//! Consumer task wiring
//!
//! Spawns the configured number of competing workers for the audit group
//! on a topic. Each worker holds its own subscription; the bus delivers a
//! message to exactly one member of the group.

use crate::consumer::handle_message;
use crate::store::AuditStore;
use event_bus::consumer_retry::RetryConfig;
use event_bus::EventBus;
use futures::StreamExt;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Per-topic consumer knobs
#[derive(Debug, Clone)]
pub struct ConsumerOptions {
    pub group: String,
    /// Parallel workers competing within the group
    pub concurrency: usize,
    pub retry: RetryConfig,
}

impl Default for ConsumerOptions {
    fn default() -> Self {
        Self {
            group: "audit-activity-group".to_string(),
            concurrency: 3,
            retry: RetryConfig::default(),
        }
    }
}

/// Start the audit consumers for one topic
pub fn spawn_audit_consumers(
    bus: Arc<dyn EventBus>,
    store: Arc<dyn AuditStore>,
    topic: &str,
    options: ConsumerOptions,
) -> Vec<JoinHandle<()>> {
    (0..options.concurrency.max(1))
        .map(|worker_id| {
            let bus = bus.clone();
            let store = store.clone();
            let topic = topic.to_string();
            let group = options.group.clone();
            let retry = options.retry.clone();

            tokio::spawn(async move {
                tracing::info!(worker_id, topic = %topic, group = %group, "Starting audit consumer");

                let mut stream = match bus.subscribe(&topic, &group).await {
                    Ok(s) => s,
                    Err(e) => {
                        tracing::error!(topic = %topic, error = %e, "Failed to subscribe");
                        return;
                    }
                };

                while let Some(msg) = stream.next().await {
                    if let Err(e) = handle_message(store.as_ref(), &retry, &msg).await {
                        tracing::error!(
                            topic = %msg.topic,
                            error = %e,
                            "Failed to process activity event"
                        );
                    }
                }

                tracing::warn!(worker_id, topic = %topic, "Audit consumer stopped");
            })
        })
        .collect()
}
