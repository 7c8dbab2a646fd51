//! Consumer task wiring for the friend-feed group

use crate::consumer::handle_message;
use crate::store::FeedStore;
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
            group: "friend-feed-activity-group".to_string(),
            concurrency: 3,
            retry: RetryConfig::default(),
        }
    }
}

/// Start the friend-feed consumers for one topic
pub fn spawn_feed_consumers(
    bus: Arc<dyn EventBus>,
    store: Arc<dyn FeedStore>,
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
                tracing::info!(
                    worker_id,
                    topic = %topic,
                    group = %group,
                    "Starting friend-feed consumer"
                );

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

                tracing::warn!(worker_id, topic = %topic, "Friend-feed consumer stopped");
            })
        })
        .collect()
}
