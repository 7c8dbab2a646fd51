use activity_events::envelope::{
    ActivityAction, ActivityEvent, EntityType, EventStatus, SourceService,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// One immutable audit row
///
/// Keyed by the originating event's id; a redelivered event maps to the
/// same row and must not create a second one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub event_id: Uuid,
    pub occurred_at: NaiveDateTime,
    pub actor_user_id: Option<i64>,
    pub target_user_id: Option<i64>,
    pub entity_type: EntityType,
    pub entity_id: Option<i64>,
    pub entity_name: Option<String>,
    pub action: ActivityAction,
    pub old_values: Option<Map<String, Value>>,
    pub new_values: Option<Map<String, Value>>,
    pub source_service: SourceService,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub correlation_id: Option<String>,
    pub status: EventStatus,
    pub error_message: Option<String>,
}

impl AuditRecord {
    pub fn from_event(event: &ActivityEvent) -> Self {
        Self {
            event_id: event.event_id,
            occurred_at: event.timestamp,
            actor_user_id: event.actor_user_id,
            target_user_id: event.target_user_id,
            entity_type: event.entity_type,
            entity_id: event.entity_id,
            entity_name: event.entity_name.clone(),
            action: event.action,
            old_values: event.old_values.clone(),
            new_values: event.new_values.clone(),
            source_service: event.source_service,
            ip_address: event.ip_address.clone(),
            user_agent: event.user_agent.clone(),
            correlation_id: event.correlation_id.clone(),
            status: event.status,
            error_message: event.error_message.clone(),
        }
    }
}
