//! # Audit Module
//!
//! Consumes the unified activity stream and the dedicated audit topic,
//! writing one immutable audit record per event id. Acts only on events
//! with `requiresAudit` set; tolerates redelivery by inserting
//! idempotently.

pub mod config;
pub mod consumer;
pub mod consumer_tasks;
pub mod models;
pub mod store;

pub use config::Config;
pub use consumer::{handle_message, ConsumerError};
pub use consumer_tasks::{spawn_audit_consumers, ConsumerOptions};
pub use models::AuditRecord;
pub use store::{AuditStore, InMemoryAuditStore, StoreError};
