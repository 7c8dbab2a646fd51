//! Concrete producer profiles
//!
//! The four producers differ only in topic, required-field checks, and
//! partition-key field. Unified and friend activity key by the actor so a
//! user's actions stay ordered; friend requests key by the receiver so a
//! user's incoming requests stay ordered; audit keys by the acting user,
//! which is the ordering the audit trail relies on.

use crate::config::TopicConfig;
use crate::envelope::ActivityEvent;
use crate::error::{ProducerError, ProducerResult};
use crate::producer::ProducerProfile;
use uuid::Uuid;

fn require_actor(event: &ActivityEvent) -> ProducerResult<i64> {
    event
        .actor_user_id
        .ok_or_else(|| ProducerError::Validation("actorUserId is required".to_string()))
}

fn require_target(event: &ActivityEvent) -> ProducerResult<i64> {
    event
        .target_user_id
        .ok_or_else(|| ProducerError::Validation("targetUserId is required".to_string()))
}

fn key_from(id: Option<i64>, topic: &str) -> String {
    match id {
        Some(id) => id.to_string(),
        None => format!("{topic}-key"),
    }
}

/// Producer for the shared `unified-activity-events` topic that all three
/// consumer groups read
pub struct UnifiedActivityProfile {
    topic: String,
}

impl UnifiedActivityProfile {
    pub fn new(config: &TopicConfig) -> Self {
        Self {
            topic: config.unified_activity.clone(),
        }
    }
}

impl ProducerProfile for UnifiedActivityProfile {
    type Event = ActivityEvent;

    fn kind(&self) -> &'static str {
        "unified-activity"
    }

    fn topic(&self) -> &str {
        &self.topic
    }

    fn event_id(&self, event: &ActivityEvent) -> Uuid {
        event.event_id
    }

    fn validate(&self, event: &ActivityEvent) -> ProducerResult<()> {
        require_actor(event)?;
        if matches!(event.entity_name.as_deref(), Some("")) {
            return Err(ProducerError::Validation(
                "entityName must not be blank".to_string(),
            ));
        }
        Ok(())
    }

    fn before_send(&self, event: &mut ActivityEvent) {
        event.recalculate_ownership();
    }

    fn partition_key(&self, event: &ActivityEvent) -> String {
        key_from(event.actor_user_id, &self.topic)
    }
}

/// Producer for actions performed on a friend's data
pub struct FriendActivityProfile {
    topic: String,
}

impl FriendActivityProfile {
    pub fn new(config: &TopicConfig) -> Self {
        Self {
            topic: config.friend_activity.clone(),
        }
    }
}

impl ProducerProfile for FriendActivityProfile {
    type Event = ActivityEvent;

    fn kind(&self) -> &'static str {
        "friend-activity"
    }

    fn topic(&self) -> &str {
        &self.topic
    }

    fn event_id(&self, event: &ActivityEvent) -> Uuid {
        event.event_id
    }

    fn validate(&self, event: &ActivityEvent) -> ProducerResult<()> {
        let actor = require_actor(event)?;
        let target = require_target(event)?;
        if actor == target {
            // Friend activity by definition involves two distinct users
            return Err(ProducerError::Validation(
                "friend activity requires distinct actor and target".to_string(),
            ));
        }
        Ok(())
    }

    fn before_send(&self, event: &mut ActivityEvent) {
        event.recalculate_ownership();
    }

    fn partition_key(&self, event: &ActivityEvent) -> String {
        key_from(event.actor_user_id, &self.topic)
    }
}

/// Producer for friend-request lifecycle events; keyed by the receiver so a
/// user's incoming requests arrive in order
pub struct FriendRequestProfile {
    topic: String,
}

impl FriendRequestProfile {
    pub fn new(config: &TopicConfig) -> Self {
        Self {
            topic: config.friend_request.clone(),
        }
    }
}

impl ProducerProfile for FriendRequestProfile {
    type Event = ActivityEvent;

    fn kind(&self) -> &'static str {
        "friend-request"
    }

    fn topic(&self) -> &str {
        &self.topic
    }

    fn event_id(&self, event: &ActivityEvent) -> Uuid {
        event.event_id
    }

    fn validate(&self, event: &ActivityEvent) -> ProducerResult<()> {
        require_actor(event)?;
        require_target(event)?;
        Ok(())
    }

    fn before_send(&self, event: &mut ActivityEvent) {
        event.recalculate_ownership();
    }

    fn partition_key(&self, event: &ActivityEvent) -> String {
        key_from(event.target_user_id, &self.topic)
    }
}

/// Producer for audit-only events (logins, failures, administrative
/// views); forces the audit flag on and the notification flag off
pub struct AuditEventProfile {
    topic: String,
}

impl AuditEventProfile {
    pub fn new(config: &TopicConfig) -> Self {
        Self {
            topic: config.audit.clone(),
        }
    }
}

impl ProducerProfile for AuditEventProfile {
    type Event = ActivityEvent;

    fn kind(&self) -> &'static str {
        "audit"
    }

    fn topic(&self) -> &str {
        &self.topic
    }

    fn event_id(&self, event: &ActivityEvent) -> Uuid {
        event.event_id
    }

    fn validate(&self, event: &ActivityEvent) -> ProducerResult<()> {
        require_actor(event)?;
        Ok(())
    }

    fn before_send(&self, event: &mut ActivityEvent) {
        event.recalculate_ownership();
        event.requires_audit = true;
        event.requires_notification = false;
    }

    fn partition_key(&self, event: &ActivityEvent) -> String {
        key_from(event.actor_user_id, &self.topic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::{ActivityAction, EntityType, SourceService};

    fn own_event(actor: i64) -> ActivityEvent {
        ActivityEvent::for_own_action(
            actor,
            EntityType::Expense,
            ActivityAction::Create,
            SourceService::ExpenseService,
        )
    }

    #[test]
    fn test_partition_key_is_stable_per_actor() {
        let profile = UnifiedActivityProfile::new(&TopicConfig::default());

        let a = own_event(7).with_entity(1, "Coffee");
        let b = own_event(7)
            .with_entity(2, "Rent")
            .with_correlation_id("req-123");

        assert_eq!(profile.partition_key(&a), "7");
        assert_eq!(profile.partition_key(&a), profile.partition_key(&b));
    }

    #[test]
    fn test_partition_key_falls_back_to_topic_literal() {
        let profile = UnifiedActivityProfile::new(&TopicConfig::default());
        let mut event = own_event(7);
        event.actor_user_id = None;

        assert_eq!(profile.partition_key(&event), "unified-activity-events-key");
    }

    #[test]
    fn test_friend_request_keys_by_receiver() {
        let profile = FriendRequestProfile::new(&TopicConfig::default());
        let event = ActivityEvent::for_friend_action(
            7,
            42,
            EntityType::Friendship,
            ActivityAction::Create,
            SourceService::FriendshipService,
        );

        assert_eq!(profile.partition_key(&event), "42");
    }

    #[test]
    fn test_unified_validation_requires_actor() {
        let profile = UnifiedActivityProfile::new(&TopicConfig::default());
        let mut event = own_event(7);
        event.actor_user_id = None;

        assert!(matches!(
            profile.validate(&event),
            Err(ProducerError::Validation(_))
        ));
        assert!(profile.validate(&own_event(7)).is_ok());
    }

    #[test]
    fn test_friend_activity_rejects_self_target() {
        let profile = FriendActivityProfile::new(&TopicConfig::default());
        let mut event = own_event(7);
        event.target_user_id = Some(7);

        assert!(matches!(
            profile.validate(&event),
            Err(ProducerError::Validation(_))
        ));
    }

    #[test]
    fn test_before_send_repairs_stale_flags() {
        let profile = UnifiedActivityProfile::new(&TopicConfig::default());

        // Hand-assembled event with flags left at the constructor's
        // own-action values after the target was swapped
        let mut event = own_event(7);
        event.target_user_id = Some(42);
        assert!(event.is_own_action, "precondition: flags are stale");

        profile.before_send(&mut event);

        assert!(!event.is_own_action);
        assert!(event.is_friend_activity);
    }

    #[test]
    fn test_audit_profile_forces_routing_flags() {
        let profile = AuditEventProfile::new(&TopicConfig::default());
        let mut event = own_event(9).with_routing(false, true);

        profile.before_send(&mut event);

        assert!(event.requires_audit);
        assert!(!event.requires_notification);
    }

    #[test]
    fn test_topics_resolve_from_config() {
        let config = TopicConfig {
            unified_activity: "test-unified".to_string(),
            friend_activity: "test-friend".to_string(),
            friend_request: "test-request".to_string(),
            audit: "test-audit".to_string(),
        };

        assert_eq!(UnifiedActivityProfile::new(&config).topic(), "test-unified");
        assert_eq!(FriendActivityProfile::new(&config).topic(), "test-friend");
        assert_eq!(FriendRequestProfile::new(&config).topic(), "test-request");
        assert_eq!(AuditEventProfile::new(&config).topic(), "test-audit");
    }
}
