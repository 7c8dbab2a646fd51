//! Routing and handling of incoming activity events
//!
//! The friend-feed group acts only on friend activity. Producers already
//! refuse to mark own actions as friend activity, but the gate here checks
//! both flags anyway: a stale or hand-assembled event must not surface a
//! user's own actions on their friends' feeds.

use crate::models::FeedEntry;
use crate::store::FeedStore;
use activity_events::envelope::ActivityEvent;
use event_bus::consumer_retry::{retry_with_backoff, RetryConfig};
use event_bus::BusMessage;

#[derive(Debug, thiserror::Error)]
pub enum ConsumerError {
    #[error("malformed event payload: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] crate::store::StoreError),
}

/// Handle one message from the bus
pub async fn handle_message(
    store: &dyn FeedStore,
    retry: &RetryConfig,
    msg: &BusMessage,
) -> Result<(), ConsumerError> {
    let event: ActivityEvent = serde_json::from_slice(&msg.payload)?;

    if !event.is_friend_activity || event.is_own_action {
        tracing::debug!(
            event_id = %event.event_id,
            own_action = event.is_own_action,
            "Not friend activity, skipping"
        );
        return Ok(());
    }

    let Some(entry) = FeedEntry::from_event(&event) else {
        tracing::warn!(
            event_id = %event.event_id,
            "Friend activity event missing actor or target id, skipping"
        );
        return Ok(());
    };

    let appended =
        retry_with_backoff(|| store.append(entry.clone()), retry, "append_feed_entry").await?;

    if appended {
        tracing::info!(
            event_id = %event.event_id,
            feed_owner = entry.feed_owner_user_id,
            actor = entry.actor_user_id,
            "Feed entry appended"
        );
    } else {
        tracing::debug!(
            event_id = %event.event_id,
            "Feed entry already present, skipping duplicate"
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryFeedStore;
    use activity_events::envelope::{ActivityAction, EntityType, SourceService};

    fn message_for(event: &ActivityEvent) -> BusMessage {
        BusMessage::new(
            "unified-activity-events".to_string(),
            serde_json::to_vec(event).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_friend_activity_lands_on_target_feed() {
        let store = InMemoryFeedStore::new();
        let retry = RetryConfig::default();

        let event = ActivityEvent::for_friend_action(
            7,
            42,
            EntityType::Budget,
            ActivityAction::Create,
            SourceService::BudgetService,
        )
        .with_entity(99, "Groceries");

        handle_message(&store, &retry, &message_for(&event))
            .await
            .unwrap();

        let feed = store.feed_for(42).await.unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].actor_user_id, 7);
        assert_eq!(feed[0].entity_name.as_deref(), Some("Groceries"));
        assert!(store.feed_for(7).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_own_action_is_skipped() {
        let store = InMemoryFeedStore::new();
        let retry = RetryConfig::default();

        let event = ActivityEvent::for_own_action(
            7,
            EntityType::Expense,
            ActivityAction::Create,
            SourceService::ExpenseService,
        );

        handle_message(&store, &retry, &message_for(&event))
            .await
            .unwrap();

        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_inconsistent_flags_still_skip_own_actions() {
        let store = InMemoryFeedStore::new();
        let retry = RetryConfig::default();

        // Hand-assembled event claiming both; the own-action gate wins
        let mut event = ActivityEvent::for_own_action(
            7,
            EntityType::Expense,
            ActivityAction::Update,
            SourceService::ExpenseService,
        );
        event.is_friend_activity = true;

        handle_message(&store, &retry, &message_for(&event))
            .await
            .unwrap();

        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_event_appends_once() {
        let store = InMemoryFeedStore::new();
        let retry = RetryConfig::default();

        let event = ActivityEvent::for_friend_action(
            7,
            42,
            EntityType::Bill,
            ActivityAction::Update,
            SourceService::BillService,
        );
        let msg = message_for(&event);

        handle_message(&store, &retry, &msg).await.unwrap();
        handle_message(&store, &retry, &msg).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
    }
}
