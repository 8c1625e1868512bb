//! Push payload decoding.
//!
//! Decoding never fails. A payload that is not a JSON object is shown as
//! plain text in the notification body.

use dietmate_types::{NotificationAction, NotificationDescriptor};
use serde_json::{Map, Value};
use tracing::debug;

/// Turn raw push bytes into a descriptor.
///
/// - no payload: [`NotificationDescriptor::fallback`]
/// - JSON object: fields read leniently, missing ones left for the renderer
/// - anything else: the payload text becomes the body of the fallback
#[must_use]
pub fn decode_push(payload: Option<&[u8]>) -> NotificationDescriptor {
    let Some(bytes) = payload else {
        return NotificationDescriptor::fallback();
    };

    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(fields)) => descriptor_from_fields(&fields),
        Ok(other) => {
            debug!("Push payload is JSON but not an object ({other}), using text");
            NotificationDescriptor::with_body(String::from_utf8_lossy(bytes))
        }
        Err(e) => {
            debug!("Push payload is not JSON ({e}), using text");
            NotificationDescriptor::with_body(String::from_utf8_lossy(bytes))
        }
    }
}

fn string_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields.get(key).and_then(Value::as_str).map(String::from)
}

/// Fields of the wrong JSON type count as absent. Malformed action entries
/// are dropped individually.
fn descriptor_from_fields(fields: &Map<String, Value>) -> NotificationDescriptor {
    let actions = fields.get("actions").and_then(Value::as_array).map(|items| {
        items
            .iter()
            .filter_map(|item| serde_json::from_value::<NotificationAction>(item.clone()).ok())
            .collect()
    });

    NotificationDescriptor {
        title: string_field(fields, "title"),
        body: string_field(fields, "body"),
        icon: string_field(fields, "icon"),
        badge: string_field(fields, "badge"),
        tag: string_field(fields, "tag"),
        require_interaction: fields.get("requireInteraction").and_then(Value::as_bool),
        data: fields.get("data").cloned(),
        actions,
    }
}
