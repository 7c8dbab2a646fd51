use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A rendered notification bound for one user's feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    /// Originating activity event; dedup key under redelivery
    pub event_id: Uuid,
    pub recipient_user_id: i64,
    pub message: String,
    pub created_at: NaiveDateTime,
}

impl Notification {
    pub fn new(event_id: Uuid, recipient_user_id: i64, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_id,
            recipient_user_id,
            message: message.into(),
            created_at: Utc::now().naive_utc(),
        }
    }
}
