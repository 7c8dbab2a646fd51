use activity_events::envelope::{ActivityAction, ActivityEvent, EntityType};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One entry on a user's friend-activity feed
///
/// Structured rather than pre-rendered: the feed UI owns presentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedEntry {
    pub id: Uuid,
    /// Originating activity event; dedup key under redelivery
    pub event_id: Uuid,
    /// Whose feed this entry appears on (the target of the action)
    pub feed_owner_user_id: i64,
    /// Who performed the action
    pub actor_user_id: i64,
    pub actor_display_name: Option<String>,
    pub entity_type: EntityType,
    pub entity_id: Option<i64>,
    pub entity_name: Option<String>,
    pub action: ActivityAction,
    pub occurred_at: NaiveDateTime,
}

impl FeedEntry {
    /// Build from an event already routed to the friend-feed concern.
    ///
    /// Returns `None` when either user id is absent; the consumer treats
    /// that as an event to skip, not an error.
    pub fn from_event(event: &ActivityEvent) -> Option<Self> {
        Some(Self {
            id: Uuid::new_v4(),
            event_id: event.event_id,
            feed_owner_user_id: event.target_user_id?,
            actor_user_id: event.actor_user_id?,
            actor_display_name: event
                .actor_user
                .as_ref()
                .map(|snapshot| snapshot.render_name().to_string()),
            entity_type: event.entity_type,
            entity_id: event.entity_id,
            entity_name: event.entity_name.clone(),
            action: event.action,
            occurred_at: event.timestamp,
        })
    }
}
