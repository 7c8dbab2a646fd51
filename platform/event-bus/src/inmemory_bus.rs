//! In-memory implementation of the EventBus trait for testing and development

use crate::{BusMessage, BusResult, EventBus};
use async_trait::async_trait;
use futures::stream::BoxStream;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// One queue per (topic, group). Subscribers of the same group share the
/// receiver and compete for messages; distinct groups each get a copy.
struct GroupQueue {
    tx: mpsc::Sender<BusMessage>,
    rx: Arc<tokio::sync::Mutex<mpsc::Receiver<BusMessage>>>,
}

/// EventBus implementation using in-memory channels
///
/// This implementation is suitable for:
/// - Unit tests (no external dependencies)
/// - Local development without Docker
/// - Integration tests that need fast, isolated message buses
///
/// Messages published to a topic are fanned out to every consumer group
/// subscribed to that topic. Within a group, delivery order follows publish
/// order (a single queue per group is strictly ordered, which subsumes the
/// per-partition-key ordering guarantee of the production bus).
///
/// A message published before any group has subscribed is dropped, matching
/// broker semantics for a topic with no registered consumer groups.
///
/// # Example
/// ```rust
/// use event_bus::{EventBus, InMemoryBus};
/// use futures::StreamExt;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let bus = InMemoryBus::new();
///
/// // Subscribe before publishing
/// let mut stream = bus.subscribe("unified-activity-events", "audit-activity-group").await?;
///
/// bus.publish("unified-activity-events", "7", b"hello".to_vec()).await?;
///
/// let msg = stream.next().await.unwrap();
/// assert_eq!(msg.topic, "unified-activity-events");
/// assert_eq!(msg.partition_key.as_deref(), Some("7"));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct InMemoryBus {
    capacity: usize,
    groups: Arc<Mutex<HashMap<(String, String), GroupQueue>>>,
}

impl InMemoryBus {
    /// Create a new in-memory event bus with a per-group buffer of 1000 messages
    pub fn new() -> Self {
        Self::with_capacity(1000)
    }

    /// Create a new in-memory event bus with a custom per-group buffer size
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            groups: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventBus for InMemoryBus {
    async fn publish(&self, topic: &str, key: &str, payload: Vec<u8>) -> BusResult<()> {
        let msg = BusMessage::new(topic.to_string(), payload).with_partition_key(key.to_string());

        // Collect the senders first so the lock is not held across an await
        let senders: Vec<mpsc::Sender<BusMessage>> = {
            let groups = self.groups.lock().expect("groups lock poisoned");
            groups
                .iter()
                .filter(|((t, _), _)| t == topic)
                .map(|(_, q)| q.tx.clone())
                .collect()
        };

        for tx in senders {
            // A dropped group (all subscriber streams gone) is not an error
            let _ = tx.send(msg.clone()).await;
        }

        Ok(())
    }

    async fn subscribe(
        &self,
        topic: &str,
        group: &str,
    ) -> BusResult<BoxStream<'static, BusMessage>> {
        let rx = {
            let mut groups = self.groups.lock().expect("groups lock poisoned");
            let queue = groups
                .entry((topic.to_string(), group.to_string()))
                .or_insert_with(|| {
                    let (tx, rx) = mpsc::channel(self.capacity);
                    GroupQueue {
                        tx,
                        rx: Arc::new(tokio::sync::Mutex::new(rx)),
                    }
                });
            queue.rx.clone()
        };

        let stream = async_stream::stream! {
            loop {
                // The receiver lock is released between messages, so
                // subscribers sharing the group take turns pulling work
                let msg = rx.lock().await.recv().await;
                match msg {
                    Some(msg) => yield msg,
                    None => break,
                }
            }
        };

        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use std::time::Duration;

    #[tokio::test]
    async fn test_publish_and_subscribe() {
        let bus = InMemoryBus::new();

        let mut stream = bus
            .subscribe("unified-activity-events", "audit-activity-group")
            .await
            .unwrap();

        let payload = b"test message".to_vec();
        bus.publish("unified-activity-events", "7", payload.clone())
            .await
            .unwrap();

        let msg = tokio::time::timeout(Duration::from_secs(1), stream.next())
            .await
            .expect("timeout")
            .expect("stream ended");

        assert_eq!(msg.topic, "unified-activity-events");
        assert_eq!(msg.partition_key.as_deref(), Some("7"));
        assert_eq!(msg.payload, payload);
    }

    #[tokio::test]
    async fn test_messages_arrive_in_publish_order() {
        let bus = InMemoryBus::new();
        let mut stream = bus.subscribe("audit-events", "audit-group").await.unwrap();

        for i in 0..5 {
            let payload = format!("message {}", i).into_bytes();
            bus.publish("audit-events", "42", payload).await.unwrap();
        }

        for i in 0..5 {
            let msg = tokio::time::timeout(Duration::from_secs(1), stream.next())
                .await
                .expect("timeout")
                .expect("stream ended");
            assert_eq!(msg.payload, format!("message {}", i).into_bytes());
        }
    }

    #[tokio::test]
    async fn test_groups_receive_independently() {
        let bus = InMemoryBus::new();

        let mut notification = bus
            .subscribe("unified-activity-events", "notification-activity-group")
            .await
            .unwrap();
        let mut audit = bus
            .subscribe("unified-activity-events", "audit-activity-group")
            .await
            .unwrap();

        let payload = b"broadcast".to_vec();
        bus.publish("unified-activity-events", "7", payload.clone())
            .await
            .unwrap();

        let msg1 = tokio::time::timeout(Duration::from_secs(1), notification.next())
            .await
            .expect("timeout")
            .expect("stream ended");
        let msg2 = tokio::time::timeout(Duration::from_secs(1), audit.next())
            .await
            .expect("timeout")
            .expect("stream ended");

        assert_eq!(msg1.payload, payload);
        assert_eq!(msg2.payload, payload);
    }

    #[tokio::test]
    async fn test_same_group_competes_for_messages() {
        let bus = InMemoryBus::new();

        let mut worker_a = bus
            .subscribe("friend-activity-events", "friend-feed-activity-group")
            .await
            .unwrap();
        let mut worker_b = bus
            .subscribe("friend-activity-events", "friend-feed-activity-group")
            .await
            .unwrap();

        for i in 0..4 {
            bus.publish("friend-activity-events", "7", vec![i]).await.unwrap();
        }

        // Each message goes to exactly one group member
        let mut received = Vec::new();
        for _ in 0..4 {
            tokio::select! {
                Some(msg) = worker_a.next() => received.push(msg.payload[0]),
                Some(msg) = worker_b.next() => received.push(msg.payload[0]),
            }
        }
        received.sort_unstable();
        assert_eq!(received, vec![0, 1, 2, 3]);
    }

    #[tokio::test]
    async fn test_topics_are_isolated() {
        let bus = InMemoryBus::new();

        let mut stream = bus.subscribe("audit-events", "audit-group").await.unwrap();

        bus.publish("friend-request-events", "42", b"other topic".to_vec())
            .await
            .unwrap();
        bus.publish("audit-events", "42", b"right topic".to_vec())
            .await
            .unwrap();

        let msg = tokio::time::timeout(Duration::from_secs(1), stream.next())
            .await
            .expect("timeout")
            .expect("stream ended");
        assert_eq!(msg.payload, b"right topic".to_vec());

        let extra = tokio::time::timeout(Duration::from_millis(100), stream.next()).await;
        assert!(extra.is_err(), "should timeout, no more messages");
    }
}
