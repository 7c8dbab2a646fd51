//! Topic configuration
//!
//! An explicit struct handed to each producer at construction. No global
//! lookup: tests inject their own topic names, production wires
//! `TopicConfig::from_env()` once in the service bootstrap.

use std::env;

/// Destination topic names for the four producers, with literal fallback
/// defaults that consumers subscribe to under the same names
#[derive(Debug, Clone)]
pub struct TopicConfig {
    pub unified_activity: String,
    pub friend_activity: String,
    pub friend_request: String,
    pub audit: String,
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            unified_activity: "unified-activity-events".to_string(),
            friend_activity: "friend-activity-events".to_string(),
            friend_request: "friend-request-events".to_string(),
            audit: "audit-events".to_string(),
        }
    }
}

impl TopicConfig {
    /// Read topic names from the environment, falling back to the defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            unified_activity: env::var("UNIFIED_ACTIVITY_TOPIC")
                .unwrap_or(defaults.unified_activity),
            friend_activity: env::var("FRIEND_ACTIVITY_TOPIC").unwrap_or(defaults.friend_activity),
            friend_request: env::var("FRIEND_REQUEST_TOPIC").unwrap_or(defaults.friend_request),
            audit: env::var("AUDIT_EVENTS_TOPIC").unwrap_or(defaults.audit),
        }
    }
}
