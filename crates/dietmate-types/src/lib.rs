//! Shared types for the Diet Mate notification coordinator.
//!
//! This crate provides the types used across dietmate-core, dietmate-rpc,
//! dietmate-daemon and the `dietmate` host CLI. All types are serializable
//! for RPC transport.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Title used whenever a producer does not supply one.
pub const APP_NAME: &str = "Diet Mate";
pub const DEFAULT_BODY: &str = "알림이 도착했습니다";
pub const DEFAULT_ICON: &str = "https://cdn-icons-png.flaticon.com/512/2917/2917995.png";
pub const DEFAULT_BADGE: &str = DEFAULT_ICON;
pub const VIBRATE_PATTERN: [u32; 3] = [200, 100, 200];

/// Default tag for push-derived notifications.
pub const PUSH_TAG: &str = "diet-mate-notification";
/// Default tag for `SHOW_NOTIFICATION` messages.
pub const MESSAGE_TAG: &str = "diet-mate";
/// Default tag for `SCHEDULE_NOTIFICATION` messages.
pub const SCHEDULED_TAG: &str = "diet-mate-scheduled";

pub const SYNC_TAG: &str = "fasting-check";
pub const PERIODIC_SYNC_TAG: &str = "fasting-reminder";

/// Reserved for the page's offline cache. The coordinator never reads it.
pub const CACHE_NAME: &str = "diet-mate-v1";

/// Deserialize a Vec that may be null or missing (both become empty vec)
fn deserialize_null_as_empty_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let opt: Option<Vec<T>> = Option::deserialize(deserializer)?;
    Ok(opt.unwrap_or_default())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// A button shown on a notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// Normalized notification request produced by decoding a push payload or by
/// a client message.
///
/// Every field is optional here. Defaults are applied in exactly one place,
/// [`NotificationDescriptor::normalize`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_interaction: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<NotificationAction>>,
}

impl NotificationDescriptor {
    /// Descriptor shown for a push event that carries no payload.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            title: Some(APP_NAME.to_string()),
            body: Some(DEFAULT_BODY.to_string()),
            icon: Some(DEFAULT_ICON.to_string()),
            badge: Some(DEFAULT_BADGE.to_string()),
            ..Self::default()
        }
    }

    /// The fallback descriptor with `body` replaced by raw payload text.
    #[must_use]
    pub fn with_body(body: impl Into<String>) -> Self {
        Self {
            body: Some(body.into()),
            ..Self::fallback()
        }
    }

    /// Fill every missing field with its canonical default.
    ///
    /// `icon`, `badge` and `tag` also fall back when present but empty.
    /// `data` becomes an empty object unless it is already one.
    #[must_use]
    pub fn normalize(self, default_tag: &str) -> DisplayNotification {
        let data = match self.data {
            Some(data @ Value::Object(_)) => data,
            _ => Value::Object(serde_json::Map::new()),
        };

        DisplayNotification {
            title: self.title.unwrap_or_else(|| APP_NAME.to_string()),
            options: NotificationOptions {
                body: self.body.unwrap_or_else(|| DEFAULT_BODY.to_string()),
                icon: non_empty(self.icon).unwrap_or_else(|| DEFAULT_ICON.to_string()),
                badge: non_empty(self.badge).unwrap_or_else(|| DEFAULT_BADGE.to_string()),
                vibrate: VIBRATE_PATTERN.to_vec(),
                tag: non_empty(self.tag).unwrap_or_else(|| default_tag.to_string()),
                renotify: true,
                require_interaction: self.require_interaction.unwrap_or(false),
                data,
                actions: self.actions.unwrap_or_default(),
            },
        }
    }
}

/// Final options handed to the host's display primitive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationOptions {
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub vibrate: Vec<u32>,
    pub tag: String,
    pub renotify: bool,
    pub require_interaction: bool,
    pub data: Value,
    #[serde(default, deserialize_with = "deserialize_null_as_empty_vec")]
    pub actions: Vec<NotificationAction>,
}

/// A title plus fully populated options, ready for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayNotification {
    pub title: String,
    pub options: NotificationOptions,
}

/// A delayed notification waiting on a timer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    pub delay_ms: u64,
}

impl ScheduleRequest {
    #[must_use]
    pub fn descriptor(&self) -> NotificationDescriptor {
        NotificationDescriptor {
            title: self.title.clone(),
            body: self.body.clone(),
            tag: self.tag.clone(),
            ..NotificationDescriptor::default()
        }
    }
}

/// Kind of an open client context
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientKind {
    #[default]
    Window,
    Worker,
    SharedWorker,
}

fn default_true() -> bool {
    true
}

/// An open page instance as reported by the host. Never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientHandle {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub kind: ClientKind,
    /// Whether the host can bring this client to the foreground
    #[serde(default = "default_true")]
    pub focusable: bool,
}

impl ClientHandle {
    #[must_use]
    pub fn window(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            kind: ClientKind::Window,
            focusable: true,
        }
    }
}

/// Filter for client enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientQuery {
    #[serde(rename = "type")]
    pub kind: ClientKind,
    pub include_uncontrolled: bool,
}

impl ClientQuery {
    /// Every window, controlled by this coordinator or not.
    #[must_use]
    pub fn all_windows() -> Self {
        Self {
            kind: ClientKind::Window,
            include_uncontrolled: true,
        }
    }

    /// Windows currently controlled by this coordinator.
    #[must_use]
    pub fn controlled_windows() -> Self {
        Self {
            kind: ClientKind::Window,
            include_uncontrolled: false,
        }
    }
}

/// Messages sent by open pages to the coordinator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientMessage {
    ShowNotification {
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        body: Option<String>,
        #[serde(default)]
        tag: Option<String>,
        #[serde(default)]
        icon: Option<String>,
    },

    ScheduleNotification {
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        body: Option<String>,
        /// Milliseconds; pages send plain JS numbers
        #[serde(default)]
        delay: Option<f64>,
        #[serde(default)]
        tag: Option<String>,
    },

    /// Anything else. Always a no-op.
    #[serde(other)]
    Unrecognized,
}

impl ClientMessage {
    /// Parse raw message data. Never fails.
    ///
    /// Only `type` decides the variant: a missing or unknown `type` becomes
    /// [`ClientMessage::Unrecognized`]. Fields of the wrong JSON type count
    /// as absent.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let Some(fields) = value.as_object() else {
            return Self::Unrecognized;
        };
        let text = |key: &str| fields.get(key).and_then(Value::as_str).map(String::from);

        match fields.get("type").and_then(Value::as_str) {
            Some("SHOW_NOTIFICATION") => Self::ShowNotification {
                title: text("title"),
                body: text("body"),
                tag: text("tag"),
                icon: text("icon"),
            },
            Some("SCHEDULE_NOTIFICATION") => Self::ScheduleNotification {
                title: text("title"),
                body: text("body"),
                delay: fields.get("delay").and_then(Value::as_f64),
                tag: text("tag"),
            },
            _ => Self::Unrecognized,
        }
    }
}

/// Messages the coordinator sends to open pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutboundMessage {
    /// Ask the page to evaluate its fasting state and request a notification
    /// if one is due.
    CheckFasting,
}

/// The displayed notification delivered with a click
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClickedNotification {
    /// Host handle used to close the notification
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// Options the notification was displayed with, when the host reports them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<NotificationOptions>,
}

impl ClickedNotification {
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        self.options.as_ref().map(|options| options.tag.as_str())
    }
}

/// Events delivered by the host runtime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WorkerEvent {
    Install,

    Activate,

    /// Push message; `data` is absent when the sender attached no payload
    Push {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<Vec<u8>>,
    },

    NotificationClick {
        notification: ClickedNotification,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        action: Option<String>,
    },

    /// One-shot background sync
    Sync { tag: String },

    /// Recurring background sync
    PeriodicSync { tag: String },

    Message {
        #[serde(default)]
        data: Value,
        /// Id of the client that posted the message, when known
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<String>,
    },
}

impl WorkerEvent {
    /// Event kind name as used on the wire.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            WorkerEvent::Install => "install",
            WorkerEvent::Activate => "activate",
            WorkerEvent::Push { .. } => "push",
            WorkerEvent::NotificationClick { .. } => "notificationclick",
            WorkerEvent::Sync { .. } => "sync",
            WorkerEvent::PeriodicSync { .. } => "periodicsync",
            WorkerEvent::Message { .. } => "message",
        }
    }
}


/// Property-based tests for the defaulting invariant.
#[cfg(test)]
mod proptest_normalize_tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_opt_string() -> impl Strategy<Value = Option<String>> {
        proptest::option::of(
            proptest::string::string_regex("[a-zA-Z0-9_\\-. ]{0,40}")
                .unwrap()
                .boxed(),
        )
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::from),
            "[a-z]{0,8}".prop_map(Value::String),
        ];
        leaf.prop_recursive(3, 16, 4, |inner| {
            prop_oneof![
                proptest::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                proptest::collection::btree_map("[a-z]{1,6}", inner, 0..4)
                    .prop_map(|map| Value::Object(map.into_iter().collect())),
            ]
        })
    }

    prop_compose! {
        fn arb_descriptor()(
            title in arb_opt_string(),
            body in arb_opt_string(),
            icon in arb_opt_string(),
            badge in arb_opt_string(),
            tag in arb_opt_string(),
            require_interaction in proptest::option::of(any::<bool>()),
            data in proptest::option::of(arb_json()),
        ) -> NotificationDescriptor {
            NotificationDescriptor {
                title,
                body,
                icon,
                badge,
                tag,
                require_interaction,
                data,
                actions: None,
            }
        }
    }

    proptest! {
        #[test]
        fn normalized_options_are_always_populated(descriptor in arb_descriptor()) {
            let shown = descriptor.clone().normalize(PUSH_TAG);

            prop_assert!(!shown.options.icon.is_empty());
            prop_assert!(!shown.options.badge.is_empty());
            prop_assert!(!shown.options.tag.is_empty());
            prop_assert!(shown.options.renotify);
            prop_assert_eq!(shown.options.vibrate, VIBRATE_PATTERN.to_vec());
            prop_assert!(shown.options.data.is_object());
            if let Some(data @ Value::Object(_)) = &descriptor.data {
                prop_assert_eq!(&shown.options.data, data);
            }
            prop_assert_eq!(
                shown.title,
                descriptor.title.unwrap_or_else(|| APP_NAME.to_string())
            );
        }
    }
}
