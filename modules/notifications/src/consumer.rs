//! Routing and handling of incoming activity events
//!
//! The notification group acts only when `requiresNotification` is set.
//! The notification is pushed to the TARGET user's feed and attributed to
//! the ACTOR's display name; for own actions the two coincide.

use crate::models::Notification;
use crate::render::render_activity_message;
use crate::store::{NotificationStore, UserDirectory};
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

/// Actor name for rendering: snapshot first, then directory, then a
/// neutral id-based fallback
async fn resolve_actor_name(event: &ActivityEvent, directory: &dyn UserDirectory) -> String {
    if let Some(snapshot) = &event.actor_user {
        return snapshot.render_name().to_string();
    }
    if let Some(actor_id) = event.actor_user_id {
        if let Some(name) = directory.display_name(actor_id).await {
            return name;
        }
        return format!("User{actor_id}");
    }
    "Someone".to_string()
}

/// Handle one message from the bus
pub async fn handle_message(
    store: &dyn NotificationStore,
    directory: &dyn UserDirectory,
    retry: &RetryConfig,
    msg: &BusMessage,
) -> Result<(), ConsumerError> {
    let event: ActivityEvent = serde_json::from_slice(&msg.payload)?;

    if !event.requires_notification {
        tracing::debug!(
            event_id = %event.event_id,
            "Event does not require notification, skipping"
        );
        return Ok(());
    }

    let Some(recipient) = event.target_user_id else {
        tracing::warn!(
            event_id = %event.event_id,
            "Notification event has no target user, skipping"
        );
        return Ok(());
    };

    let actor_name = resolve_actor_name(&event, directory).await;
    let message = render_activity_message(&event, &actor_name);
    let notification = Notification::new(event.event_id, recipient, message);

    let stored = retry_with_backoff(
        || store.save(notification.clone()),
        retry,
        "save_notification",
    )
    .await?;

    if stored {
        tracing::info!(
            event_id = %event.event_id,
            recipient_user_id = recipient,
            friend_activity = event.is_friend_activity,
            "Notification delivered to feed"
        );
    } else {
        tracing::debug!(
            event_id = %event.event_id,
            "Notification already delivered, skipping duplicate"
        );
    }

    Ok(())
}
