//! Generic producer send pipeline
//!
//! One pipeline for every event kind: validate, run the pre-send hook,
//! derive the partition key, serialize, hand off to the publish pool.
//! Event-kind specifics (topic, required fields, key derivation) live in a
//! [`ProducerProfile`] implementation per producer, so customization is a
//! small strategy struct rather than a subclass.

use crate::error::{ProducerError, ProducerResult};
use crate::pool::{PublishHandle, PublishJob};
use event_bus::EventBus;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// Event-kind-specific hooks plugged into the shared pipeline
///
/// `validate` and `partition_key` have fixed defaults: no extra checks, and
/// a per-topic literal key (`"<topic>-key"`) that serializes the whole
/// topic through one partition. Profiles that need per-user ordering
/// override `partition_key` with a user id so all events for that user
/// stay strictly ordered relative to each other.
pub trait ProducerProfile: Send + Sync + 'static {
    type Event: Serialize + Send + 'static;

    /// Short name for log context, e.g. `"friend-request"`
    fn kind(&self) -> &'static str;

    /// Destination topic (resolved from configuration at construction)
    fn topic(&self) -> &str;

    /// Stable dedup/trace id of the event
    fn event_id(&self, event: &Self::Event) -> Uuid;

    /// Required-field checks on top of the base pipeline; runs before any
    /// network I/O
    fn validate(&self, _event: &Self::Event) -> ProducerResult<()> {
        Ok(())
    }

    /// Pre-publish hook; runs after validation, before key derivation.
    /// Producers use it to recompute routing flags so a hand-assembled
    /// event cannot leave the service with stale ownership flags.
    fn before_send(&self, _event: &mut Self::Event) {}

    /// Partition key for broker-side ordering
    fn partition_key(&self, _event: &Self::Event) -> String {
        format!("{}-key", self.topic())
    }
}

/// The shared send pipeline, parameterized by a profile
///
/// `send` is fire-and-forget: validation and serialization errors come back
/// synchronously (logic bugs fail loudly), transport errors are logged by
/// the publish workers and never reach the caller. `send_sync` is the
/// explicit blocking alternative for call sites that need broker
/// confirmation before proceeding; no default flow uses it.
pub struct ActivityProducer<P: ProducerProfile> {
    profile: P,
    bus: Arc<dyn EventBus>,
    publish: PublishHandle,
}

impl<P: ProducerProfile> ActivityProducer<P> {
    pub fn new(profile: P, bus: Arc<dyn EventBus>, publish: PublishHandle) -> Self {
        Self {
            profile,
            bus,
            publish,
        }
    }

    pub fn profile(&self) -> &P {
        &self.profile
    }

    fn prepare(&self, event: &mut P::Event) -> ProducerResult<Vec<u8>> {
        self.profile.validate(event)?;
        self.profile.before_send(event);
        Ok(serde_json::to_vec(event)?)
    }

    /// Publish asynchronously with the profile-derived partition key
    ///
    /// Returns before the broker round trip completes.
    pub fn send(&self, mut event: P::Event) -> ProducerResult<()> {
        let payload = self.prepare(&mut event)?;
        let key = self.profile.partition_key(&event);
        self.enqueue(event, key, payload);
        Ok(())
    }

    /// Publish asynchronously with an explicit partition key, bypassing
    /// the profile's key derivation
    pub fn send_with_key(&self, mut event: P::Event, key: impl Into<String>) -> ProducerResult<()> {
        let payload = self.prepare(&mut event)?;
        self.enqueue(event, key.into(), payload);
        Ok(())
    }

    /// Publish and wait for the broker to accept the message
    ///
    /// Reserved for call sites that must not proceed without publish
    /// confirmation; the failure is returned instead of logged.
    pub async fn send_sync(&self, mut event: P::Event) -> ProducerResult<()> {
        let payload = self.prepare(&mut event)?;
        let key = self.profile.partition_key(&event);
        let event_id = self.profile.event_id(&event);

        self.bus
            .publish(self.profile.topic(), &key, payload)
            .await
            .map_err(ProducerError::Publish)?;

        tracing::debug!(
            event_kind = self.profile.kind(),
            event_id = %event_id,
            topic = %self.profile.topic(),
            partition_key = %key,
            "Event published synchronously"
        );
        Ok(())
    }

    fn enqueue(&self, event: P::Event, key: String, payload: Vec<u8>) {
        self.publish.submit(PublishJob {
            topic: self.profile.topic().to_string(),
            key,
            payload,
            event_id: self.profile.event_id(&event),
            event_kind: self.profile.kind(),
        });
    }
}
