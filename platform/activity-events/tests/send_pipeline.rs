//! Behavior of the producer send pipeline against fake and in-memory buses

use activity_events::config::TopicConfig;
use activity_events::envelope::{ActivityAction, ActivityEvent, EntityType, SourceService};
use activity_events::pool::{PoolConfig, PublishPool};
use activity_events::producer::ActivityProducer;
use activity_events::profiles::{FriendRequestProfile, UnifiedActivityProfile};
use activity_events::ProducerError;
use async_trait::async_trait;
use event_bus::{BusMessage, BusResult, EventBus, InMemoryBus};
use futures::stream::BoxStream;
use futures::StreamExt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Counts publishes; optionally delays or fails them
struct FakeBus {
    publishes: AtomicUsize,
    delay: Option<Duration>,
    fail: bool,
}

impl FakeBus {
    fn new() -> Self {
        Self {
            publishes: AtomicUsize::new(0),
            delay: None,
            fail: false,
        }
    }

    fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new()
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    fn publish_count(&self) -> usize {
        self.publishes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventBus for FakeBus {
    async fn publish(&self, _topic: &str, _key: &str, _payload: Vec<u8>) -> BusResult<()> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(event_bus::BusError::PublishError(
                "broker unreachable".to_string(),
            ));
        }
        self.publishes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn subscribe(
        &self,
        _topic: &str,
        _group: &str,
    ) -> BusResult<BoxStream<'static, BusMessage>> {
        Ok(futures::stream::pending().boxed())
    }
}

fn budget_event() -> ActivityEvent {
    ActivityEvent::for_friend_action(
        7,
        42,
        EntityType::Budget,
        ActivityAction::Create,
        SourceService::BudgetService,
    )
    .with_entity(99, "Groceries")
}

#[tokio::test]
async fn invalid_event_is_rejected_before_any_network_call() {
    let bus = Arc::new(FakeBus::new());
    let pool = PublishPool::start(PoolConfig::default(), bus.clone());
    let producer = ActivityProducer::new(
        UnifiedActivityProfile::new(&TopicConfig::default()),
        bus.clone(),
        pool.handle(),
    );

    let mut event = budget_event();
    event.actor_user_id = None;

    let result = producer.send(event);
    assert!(matches!(result, Err(ProducerError::Validation(_))));

    pool.shutdown().await;
    assert_eq!(bus.publish_count(), 0, "no network call for invalid event");
}

#[tokio::test]
async fn valid_event_reaches_the_bus() {
    let bus = Arc::new(FakeBus::new());
    let pool = PublishPool::start(PoolConfig::default(), bus.clone());
    let producer = ActivityProducer::new(
        UnifiedActivityProfile::new(&TopicConfig::default()),
        bus.clone(),
        pool.handle(),
    );

    producer.send(budget_event()).unwrap();

    pool.shutdown().await;
    assert_eq!(bus.publish_count(), 1);
}

#[tokio::test]
async fn send_returns_before_broker_round_trip() {
    let bus = Arc::new(FakeBus::slow(Duration::from_millis(500)));
    let pool = PublishPool::start(PoolConfig::default(), bus.clone());
    let producer = ActivityProducer::new(
        UnifiedActivityProfile::new(&TopicConfig::default()),
        bus.clone(),
        pool.handle(),
    );

    let start = std::time::Instant::now();
    producer.send(budget_event()).unwrap();
    let elapsed = start.elapsed();

    assert!(
        elapsed < Duration::from_millis(100),
        "send blocked for {elapsed:?}"
    );

    pool.shutdown().await;
    assert_eq!(bus.publish_count(), 1, "publish completed during drain");
}

#[tokio::test]
async fn broker_failure_never_reaches_the_fire_and_forget_caller() {
    let bus = Arc::new(FakeBus::failing());
    let pool = PublishPool::start(PoolConfig::default(), bus.clone());
    let producer = ActivityProducer::new(
        UnifiedActivityProfile::new(&TopicConfig::default()),
        bus.clone(),
        pool.handle(),
    );

    // The business operation already committed; send must still succeed
    assert!(producer.send(budget_event()).is_ok());
    pool.shutdown().await;
}

#[tokio::test]
async fn send_sync_propagates_broker_failure() {
    let bus = Arc::new(FakeBus::failing());
    let pool = PublishPool::start(PoolConfig::default(), bus.clone());
    let producer = ActivityProducer::new(
        UnifiedActivityProfile::new(&TopicConfig::default()),
        bus.clone(),
        pool.handle(),
    );

    let result = producer.send_sync(budget_event()).await;
    assert!(matches!(result, Err(ProducerError::Publish(_))));

    pool.shutdown().await;
}

#[tokio::test]
async fn send_sync_confirms_successful_publish() {
    let bus = Arc::new(InMemoryBus::new());
    let mut stream = bus
        .subscribe("unified-activity-events", "audit-activity-group")
        .await
        .unwrap();

    let pool = PublishPool::start(PoolConfig::default(), bus.clone());
    let producer = ActivityProducer::new(
        UnifiedActivityProfile::new(&TopicConfig::default()),
        bus.clone(),
        pool.handle(),
    );

    producer.send_sync(budget_event()).await.unwrap();

    let msg = tokio::time::timeout(Duration::from_secs(1), stream.next())
        .await
        .expect("timeout")
        .expect("stream ended");
    assert_eq!(msg.partition_key.as_deref(), Some("7"));

    pool.shutdown().await;
}

#[tokio::test]
async fn custom_key_overload_bypasses_derivation() {
    let bus = Arc::new(InMemoryBus::new());
    let mut stream = bus
        .subscribe("friend-request-events", "notification-activity-group")
        .await
        .unwrap();

    let pool = PublishPool::start(PoolConfig::default(), bus.clone());
    let producer = ActivityProducer::new(
        FriendRequestProfile::new(&TopicConfig::default()),
        bus.clone(),
        pool.handle(),
    );

    let event = ActivityEvent::for_friend_action(
        7,
        42,
        EntityType::Friendship,
        ActivityAction::Create,
        SourceService::FriendshipService,
    );
    // Profile would derive "42" (receiver); the overload wins
    producer.send_with_key(event, "rebalance-batch-1").unwrap();

    let msg = tokio::time::timeout(Duration::from_secs(1), stream.next())
        .await
        .expect("timeout")
        .expect("stream ended");
    assert_eq!(msg.partition_key.as_deref(), Some("rebalance-batch-1"));

    pool.shutdown().await;
}

#[tokio::test]
async fn events_for_one_user_share_a_partition_key_on_the_wire() {
    let bus = Arc::new(InMemoryBus::new());
    let mut stream = bus
        .subscribe("unified-activity-events", "audit-activity-group")
        .await
        .unwrap();

    let pool = PublishPool::start(PoolConfig::default(), bus.clone());
    let producer = ActivityProducer::new(
        UnifiedActivityProfile::new(&TopicConfig::default()),
        bus.clone(),
        pool.handle(),
    );

    for name in ["Coffee", "Rent", "Gym"] {
        let event = ActivityEvent::for_own_action(
            7,
            EntityType::Expense,
            ActivityAction::Create,
            SourceService::ExpenseService,
        )
        .with_entity(1, name);
        producer.send(event).unwrap();
    }
    pool.shutdown().await;

    for _ in 0..3 {
        let msg = tokio::time::timeout(Duration::from_secs(1), stream.next())
            .await
            .expect("timeout")
            .expect("stream ended");
        assert_eq!(msg.partition_key.as_deref(), Some("7"));
    }
}
