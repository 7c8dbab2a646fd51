//! # Notifications Module
//!
//! Consumes the unified activity stream and the friend-request topic,
//! rendering feed messages and delivering them to the target user. Acts
//! only on events with `requiresNotification` set; attributes friend
//! activity to the actor's display name while pushing to the target's
//! feed.

pub mod config;
pub mod consumer;
pub mod consumer_tasks;
pub mod models;
pub mod render;
pub mod store;

pub use config::Config;
pub use consumer::{handle_message, ConsumerError};
pub use consumer_tasks::{spawn_notification_consumers, ConsumerOptions};
pub use models::Notification;
pub use render::render_activity_message;
pub use store::{
    InMemoryNotificationStore, NotificationStore, StaticUserDirectory, StoreError, UserDirectory,
};
