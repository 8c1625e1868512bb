//! Client message routing.

use dietmate_types::{ClientMessage, NotificationDescriptor, ScheduleRequest};
use serde_json::Value;
use tracing::debug;

/// What a client message asks the coordinator to do
#[derive(Debug, Clone, PartialEq)]
pub enum MessageAction {
    /// Display now; the descriptor is normalized with the message tag
    Show(NotificationDescriptor),
    Schedule(ScheduleRequest),
    Ignore,
}

/// Classify raw message data. Unrecognized data maps to
/// [`MessageAction::Ignore`], never to an error.
#[must_use]
pub fn route_message(data: &Value) -> MessageAction {
    match ClientMessage::from_value(data) {
        ClientMessage::ShowNotification {
            title,
            body,
            tag,
            icon,
        } => MessageAction::Show(NotificationDescriptor {
            title,
            body,
            tag,
            icon,
            ..NotificationDescriptor::default()
        }),
        ClientMessage::ScheduleNotification {
            title,
            body,
            delay,
            tag,
        } => MessageAction::Schedule(ScheduleRequest {
            title,
            body,
            tag,
            delay_ms: delay_to_ms(delay),
        }),
        ClientMessage::Unrecognized => {
            debug!("Ignoring unrecognized client message: {}", data);
            MessageAction::Ignore
        }
    }
}

/// Missing, negative and NaN delays fire immediately. Fractions are truncated.
// Float-to-int `as` saturates, and only positive values reach it
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn delay_to_ms(delay: Option<f64>) -> u64 {
    match delay {
        Some(ms) if ms > 0.0 => ms as u64,
        _ => 0,
    }
}
