//! # Activity Event Envelope
//!
//! Platform-wide envelope for every user-visible state change in the
//! expense platform. A single schema is multiplexed to three independent
//! concerns — notification delivery, audit trail, and the friend-activity
//! feed — each gated by the routing flags carried on the envelope.
//!
//! ## Design Principles
//!
//! 1. **Single Source of Truth**: one envelope struct for the entire platform
//! 2. **Immutable fact**: constructed once after a successful domain
//!    mutation, never updated or deleted downstream
//! 3. **Routing flags over topics**: consumers share topics and decide
//!    locally from `requiresAudit` / `requiresNotification` /
//!    `isFriendActivity` whether to act
//! 4. **Loose payloads**: `oldValues` / `newValues` / `entityPayload` are
//!    untyped JSON maps since entity shapes vary per event — an intentional
//!    boundary of looseness, not a defect
//!
//! ## Wire format
//!
//! Serialized as camelCase JSON. Timestamps use `yyyy-MM-ddTHH:mm:ss`
//! (no timezone, no fractional seconds) for compatibility with the services
//! being migrated off the previous stack.

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// What kind of entity the event refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    Expense,
    Budget,
    Bill,
    Category,
    PaymentMethod,
    User,
    Friendship,
}

/// What was done to the entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityAction {
    Create,
    Update,
    Delete,
    View,
    Login,
    Logout,
}

/// Which service produced the event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum SourceService {
    ExpenseService,
    BudgetService,
    BillService,
    ChatService,
    NotificationService,
    FriendshipService,
    GatewayService,
    AuditService,
}

/// Outcome of the originating operation
///
/// Events are normally emitted only after a successful mutation; a
/// `Failure` event is constructed explicitly when a failed operation must
/// still reach the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    Success,
    Failure,
    Pending,
}

/// Denormalized display snapshot of a user, captured at event time so
/// consumers can render without a directory round-trip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSnapshot {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl UserSnapshot {
    pub fn new(id: i64, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            display_name: None,
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Best name available for rendering
    pub fn render_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.username)
    }
}

fn default_true() -> bool {
    true
}

/// The unified activity event
///
/// Constructed by the originating business operation immediately after a
/// successful domain mutation, handed to a producer, and from then on
/// treated as an immutable fact. Each consumer group reads every event on
/// the topic and acts only when its routing flag is set.
///
/// Prefer [`ActivityEvent::for_own_action`] and
/// [`ActivityEvent::for_friend_action`] over setting flags by hand: a
/// manually assembled event whose flags were never derived silently treats
/// friend actions as own actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEvent {
    /// Unique event identifier; downstream deduplication key
    pub event_id: Uuid,

    /// Event creation time (not delivery time); immutable after construction
    #[serde(with = "wire_timestamp")]
    pub timestamp: NaiveDateTime,

    /// Who performed the action
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_user: Option<UserSnapshot>,

    /// Whose data was affected (may equal the actor)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_user: Option<UserSnapshot>,

    /// What was acted upon
    pub entity_type: EntityType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,

    pub action: ActivityAction,

    /// Pre-state snapshot for audit diffing; untyped by design
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_values: Option<Map<String, Value>>,
    /// Post-state snapshot for audit diffing; untyped by design
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_values: Option<Map<String, Value>>,
    /// Rich rendering payload for notifications; untyped by design
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_payload: Option<Map<String, Value>>,

    pub source_service: SourceService,

    // Request context: populated only when available, absence must not
    // break processing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    #[serde(default = "EventStatus::success")]
    pub status: EventStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    // Routing flags. Invariant: is_own_action == (actor_user_id ==
    // target_user_id) and is_friend_activity == !is_own_action.
    #[serde(default)]
    pub is_own_action: bool,
    #[serde(default)]
    pub is_friend_activity: bool,
    #[serde(default = "default_true")]
    pub requires_audit: bool,
    #[serde(default = "default_true")]
    pub requires_notification: bool,
}

impl EventStatus {
    fn success() -> Self {
        EventStatus::Success
    }
}

impl ActivityEvent {
    fn base(
        actor_user_id: Option<i64>,
        target_user_id: Option<i64>,
        entity_type: EntityType,
        action: ActivityAction,
        source_service: SourceService,
    ) -> Self {
        let mut event = Self {
            event_id: Uuid::new_v4(),
            timestamp: Utc::now().naive_utc(),
            actor_user_id,
            actor_user: None,
            target_user_id,
            target_user: None,
            entity_type,
            entity_id: None,
            entity_name: None,
            action,
            old_values: None,
            new_values: None,
            entity_payload: None,
            source_service,
            ip_address: None,
            user_agent: None,
            correlation_id: None,
            session_id: None,
            status: EventStatus::Success,
            error_message: None,
            is_own_action: false,
            is_friend_activity: false,
            requires_audit: true,
            requires_notification: true,
        };
        event.recalculate_ownership();
        event
    }

    /// Event for an action a user performed on their own data
    pub fn for_own_action(
        actor_user_id: i64,
        entity_type: EntityType,
        action: ActivityAction,
        source_service: SourceService,
    ) -> Self {
        Self::base(
            Some(actor_user_id),
            Some(actor_user_id),
            entity_type,
            action,
            source_service,
        )
    }

    /// Event for an action one user performed on another user's data
    /// (shared-account editing and similar friend activity)
    pub fn for_friend_action(
        actor_user_id: i64,
        target_user_id: i64,
        entity_type: EntityType,
        action: ActivityAction,
        source_service: SourceService,
    ) -> Self {
        Self::base(
            Some(actor_user_id),
            Some(target_user_id),
            entity_type,
            action,
            source_service,
        )
    }

    /// Derive `is_own_action` and `is_friend_activity` from actor/target
    /// equality
    ///
    /// The constructors already apply this, and producer `before_send`
    /// hooks apply it again as defense in depth. The derivation is
    /// idempotent, so recomputing over an already-derived event is
    /// harmless. Ids that are absent on either side compare as not equal.
    pub fn recalculate_ownership(&mut self) {
        self.is_own_action = match (self.actor_user_id, self.target_user_id) {
            (Some(actor), Some(target)) => actor == target,
            _ => false,
        };
        self.is_friend_activity = !self.is_own_action;
    }

    pub fn with_entity(mut self, entity_id: i64, entity_name: impl Into<String>) -> Self {
        self.entity_id = Some(entity_id);
        self.entity_name = Some(entity_name.into());
        self
    }

    pub fn with_actor_snapshot(mut self, snapshot: UserSnapshot) -> Self {
        self.actor_user = Some(snapshot);
        self
    }

    pub fn with_target_snapshot(mut self, snapshot: UserSnapshot) -> Self {
        self.target_user = Some(snapshot);
        self
    }

    pub fn with_old_values(mut self, values: Map<String, Value>) -> Self {
        self.old_values = Some(values);
        self
    }

    pub fn with_new_values(mut self, values: Map<String, Value>) -> Self {
        self.new_values = Some(values);
        self
    }

    pub fn with_entity_payload(mut self, payload: Map<String, Value>) -> Self {
        self.entity_payload = Some(payload);
        self
    }

    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    pub fn with_request_context(
        mut self,
        ip_address: Option<String>,
        user_agent: Option<String>,
        session_id: Option<String>,
    ) -> Self {
        self.ip_address = ip_address;
        self.user_agent = user_agent;
        self.session_id = session_id;
        self
    }

    /// Mark the event as recording a failed operation (audit-only flows)
    pub fn with_failure(mut self, error_message: impl Into<String>) -> Self {
        self.status = EventStatus::Failure;
        self.error_message = Some(error_message.into());
        self
    }

    /// Override the routing flag defaults (audit and notification both on)
    pub fn with_routing(mut self, requires_audit: bool, requires_notification: bool) -> Self {
        self.requires_audit = requires_audit;
        self.requires_notification = requires_notification;
        self
    }
}

/// Serde codec for the platform wire timestamp: `yyyy-MM-ddTHH:mm:ss`,
/// no timezone, no fractional seconds. Services still on the previous
/// stack parse exactly this shape, so the format is load-bearing.
pub mod wire_timestamp {
    use chrono::NaiveDateTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

    pub fn serialize<S>(timestamp: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&timestamp.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom)
    }
}
