//! Notification message rendering
//!
//! Messages are attributed to the ACTOR by display name and delivered to
//! the TARGET's feed; for friend activity those are different users, and
//! mixing them up is the bug this module exists to prevent.

use activity_events::envelope::{ActivityAction, ActivityEvent, EntityType};

fn verb(action: ActivityAction) -> &'static str {
    match action {
        ActivityAction::Create => "created",
        ActivityAction::Update => "updated",
        ActivityAction::Delete => "deleted",
        ActivityAction::View => "viewed",
        ActivityAction::Login => "logged in",
        ActivityAction::Logout => "logged out",
    }
}

fn entity_noun(entity_type: EntityType) -> &'static str {
    match entity_type {
        EntityType::Expense => "expense",
        EntityType::Budget => "budget",
        EntityType::Bill => "bill",
        EntityType::Category => "category",
        EntityType::PaymentMethod => "payment method",
        EntityType::User => "account",
        EntityType::Friendship => "friendship",
    }
}

/// Amount from the rendering payload, when the entity carries one
fn amount_suffix(event: &ActivityEvent) -> Option<String> {
    let amount = event.entity_payload.as_ref()?.get("amount")?.as_f64()?;
    Some(format!(" with amount ${amount:.2}"))
}

/// Render the feed line for an activity event
///
/// `actor_name` is resolved by the caller (snapshot first, directory
/// lookup second, `User{id}` fallback).
pub fn render_activity_message(event: &ActivityEvent, actor_name: &str) -> String {
    let mut message = match (event.action, &event.entity_name) {
        (ActivityAction::Login | ActivityAction::Logout, _) => {
            format!("{} {}", actor_name, verb(event.action))
        }
        (_, Some(name)) => format!(
            "{} {} {} '{}'",
            actor_name,
            verb(event.action),
            entity_noun(event.entity_type),
            name
        ),
        (_, None) => format!(
            "{} {} a {}",
            actor_name,
            verb(event.action),
            entity_noun(event.entity_type)
        ),
    };

    if let Some(suffix) = amount_suffix(event) {
        message.push_str(&suffix);
    }
    message
}
