//! # EventBus Abstraction
//!
//! A platform-level abstraction for event-driven messaging across services.
//!
//! ## Why This Lives in Tier 1
//!
//! The EventBus is a **shared runtime capability** that every service in the
//! expense platform depends on. Placing it in `platform/` (Tier 1) allows:
//! - Service modules to depend on platform crates without circular dependencies
//! - Config-driven swap between NATS (production) and InMemory (dev/test)
//!
//! ## Delivery model
//!
//! Messages are published to a **topic** with a **partition key**. All
//! messages sharing a key preserve their relative publish order; cross-key
//! ordering is not guaranteed. Subscriptions carry a **group id**: every
//! group independently receives every message on the topic, while members
//! of the same group compete for messages (at-least-once within the group).
//!
//! ## Implementations
//!
//! - **NatsBus**: Production implementation; consumer groups map onto NATS
//!   queue groups, the partition key travels in a message header
//! - **InMemoryBus**: Test/dev implementation using per-group bounded queues
//!
//! ## Usage
//!
//! ```rust,no_run
//! use event_bus::{EventBus, InMemoryBus};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let bus: Arc<dyn EventBus> = Arc::new(InMemoryBus::new());
//!
//! let payload = serde_json::to_vec(&serde_json::json!({
//!     "eventId": "1b2d...",
//!     "action": "CREATE"
//! }))?;
//! bus.publish("unified-activity-events", "7", payload).await?;
//!
//! let mut stream = bus.subscribe("unified-activity-events", "audit-activity-group").await?;
//! while let Some(msg) = futures::StreamExt::next(&mut stream).await {
//!     println!("Received {} bytes on {}", msg.payload.len(), msg.topic);
//! }
//! # Ok(())
//! # }
//! ```

pub mod consumer_retry;
mod inmemory_bus;
mod nats_bus;

pub use consumer_retry::{retry_with_backoff, RetryConfig};
pub use inmemory_bus::InMemoryBus;
pub use nats_bus::NatsBus;

use async_trait::async_trait;
use futures::stream::BoxStream;
use std::fmt;

/// Header carrying the partition key on the wire.
pub const PARTITION_KEY_HEADER: &str = "Partition-Key";

/// A message received from the event bus
#[derive(Debug, Clone)]
pub struct BusMessage {
    /// The topic this message was published to
    pub topic: String,
    /// The partition key the producer published with, when known
    pub partition_key: Option<String>,
    /// The message payload (raw bytes)
    pub payload: Vec<u8>,
    /// Optional headers
    pub headers: Option<std::collections::HashMap<String, String>>,
}

impl BusMessage {
    /// Create a new bus message
    pub fn new(topic: String, payload: Vec<u8>) -> Self {
        Self {
            topic,
            partition_key: None,
            payload,
            headers: None,
        }
    }

    /// Attach the partition key
    pub fn with_partition_key(mut self, key: String) -> Self {
        self.partition_key = Some(key);
        self
    }

    /// Attach headers
    pub fn with_headers(mut self, headers: std::collections::HashMap<String, String>) -> Self {
        self.headers = Some(headers);
        self
    }
}

/// Errors that can occur when using the event bus
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("failed to publish message: {0}")]
    PublishError(String),

    #[error("failed to subscribe to topic: {0}")]
    SubscribeError(String),

    #[error("connection error: {0}")]
    ConnectionError(String),

    #[error("serialization error: {0}")]
    SerializationError(String),

    #[error("internal error: {0}")]
    InternalError(String),
}

/// Result type for event bus operations
pub type BusResult<T> = Result<T, BusError>;

/// Core event bus abstraction for keyed publish-subscribe messaging
#[async_trait]
pub trait EventBus: Send + Sync {
    /// Publish a message to a topic with a partition key
    ///
    /// Messages sharing a partition key keep their relative order; no
    /// ordering holds across keys.
    async fn publish(&self, topic: &str, key: &str, payload: Vec<u8>) -> BusResult<()>;

    /// Subscribe to a topic as a member of a consumer group
    ///
    /// Every distinct `group` receives its own copy of each message;
    /// subscribers sharing a `group` compete for messages.
    async fn subscribe(&self, topic: &str, group: &str)
        -> BusResult<BoxStream<'static, BusMessage>>;
}

impl fmt::Debug for dyn EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventBus")
    }
}
