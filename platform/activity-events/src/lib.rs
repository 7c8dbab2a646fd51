//! # Activity Events
//!
//! The unified activity-event core of the expense platform: one envelope
//! schema fanned out to three independent concerns (notifications, audit,
//! friend feed), with routing decided by flags computed at construction
//! and per-user ordering achieved through partition keys.
//!
//! ## Shape
//!
//! - [`envelope::ActivityEvent`]: the canonical message, an immutable fact
//!   about a completed state change
//! - [`producer::ActivityProducer`]: the shared send pipeline
//!   (validate → pre-send hook → partition key → serialize → async publish)
//! - [`profiles`]: the four concrete producers as small strategy structs
//! - [`pool::PublishPool`]: bounded fire-and-forget publish workers,
//!   isolated from the request path
//! - [`config::TopicConfig`]: explicit topic wiring, injected rather than
//!   looked up globally
//!
//! ## Usage
//!
//! ```rust,no_run
//! use activity_events::config::TopicConfig;
//! use activity_events::envelope::{ActivityAction, ActivityEvent, EntityType, SourceService};
//! use activity_events::pool::{PoolConfig, PublishPool};
//! use activity_events::producer::ActivityProducer;
//! use activity_events::profiles::UnifiedActivityProfile;
//! use event_bus::InMemoryBus;
//! use std::sync::Arc;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let bus = Arc::new(InMemoryBus::new());
//! let pool = PublishPool::start(PoolConfig::default(), bus.clone());
//! let topics = TopicConfig::from_env();
//!
//! let producer = ActivityProducer::new(
//!     UnifiedActivityProfile::new(&topics),
//!     bus,
//!     pool.handle(),
//! );
//!
//! let event = ActivityEvent::for_friend_action(
//!     7,
//!     42,
//!     EntityType::Budget,
//!     ActivityAction::Create,
//!     SourceService::BudgetService,
//! )
//! .with_entity(99, "Groceries");
//!
//! producer.send(event)?; // returns before the broker round trip
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod envelope;
pub mod error;
pub mod pool;
pub mod producer;
pub mod profiles;

pub use config::TopicConfig;
pub use envelope::{
    ActivityAction, ActivityEvent, EntityType, EventStatus, SourceService, UserSnapshot,
};
pub use error::{ProducerError, ProducerResult};
pub use pool::{PoolConfig, PublishHandle, PublishPool};
pub use producer::{ActivityProducer, ProducerProfile};
pub use profiles::{
    AuditEventProfile, FriendActivityProfile, FriendRequestProfile, UnifiedActivityProfile,
};
