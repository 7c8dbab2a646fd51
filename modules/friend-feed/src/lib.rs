//! # Friend-Feed Module
//!
//! Consumes the unified activity stream and the friend-activity topic,
//! posting structured entries to the affected user's feed. Acts only on
//! events with `isFriendActivity` set and explicitly skips own actions.

pub mod config;
pub mod consumer;
pub mod consumer_tasks;
pub mod models;
pub mod store;

pub use config::Config;
pub use consumer::{handle_message, ConsumerError};
pub use consumer_tasks::{spawn_feed_consumers, ConsumerOptions};
pub use models::FeedEntry;
pub use store::{FeedStore, InMemoryFeedStore, StoreError};
