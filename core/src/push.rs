//! Push rule actions and conditions as they appear in rule bodies.

use serde_json::{json, Value};

/// What the server does when a push rule matches.
#[derive(Debug, Clone, PartialEq)]
pub enum PushAction {
    Notify,
    DontNotify,
    Coalesce,
    /// Set a tweak such as `sound` or `highlight`. `value` is omitted when `None`.
    SetTweak { tweak: String, value: Option<Value> },
}

impl PushAction {
    pub fn sound(sound: &str) -> Self {
        PushAction::SetTweak {
            tweak: "sound".to_string(),
            value: Some(Value::String(sound.to_string())),
        }
    }

    pub fn highlight(on: bool) -> Self {
        PushAction::SetTweak {
            tweak: "highlight".to_string(),
            value: Some(Value::Bool(on)),
        }
    }

    pub fn as_value(&self) -> Value {
        match self {
            PushAction::Notify => json!("notify"),
            PushAction::DontNotify => json!("dont_notify"),
            PushAction::Coalesce => json!("coalesce"),
            PushAction::SetTweak { tweak, value } => {
                let mut obj = json!({ "set_tweak": tweak });
                if let Some(value) = value {
                    obj["value"] = value.clone();
                }
                obj
            }
        }
    }
}

/// A condition that must hold for an override/underride rule to match.
#[derive(Debug, Clone, PartialEq)]
pub enum PushCondition {
    EventMatch { key: String, pattern: String },
    ContainsDisplayName,
    /// `is` is a comparison such as `2`, `>=10` or `<5`.
    RoomMemberCount { is: String },
    SenderNotificationPermission { key: String },
    EventPropertyIs { key: String, value: Value },
    EventPropertyContains { key: String, value: Value },
    /// A condition kind this crate does not model, passed through verbatim.
    Raw(Value),
}

impl PushCondition {
    pub fn as_value(&self) -> Value {
        match self {
            PushCondition::EventMatch { key, pattern } => {
                json!({ "kind": "event_match", "key": key, "pattern": pattern })
            }
            PushCondition::ContainsDisplayName => json!({ "kind": "contains_display_name" }),
            PushCondition::RoomMemberCount { is } => {
                json!({ "kind": "room_member_count", "is": is })
            }
            PushCondition::SenderNotificationPermission { key } => {
                json!({ "kind": "sender_notification_permission", "key": key })
            }
            PushCondition::EventPropertyIs { key, value } => {
                json!({ "kind": "event_property_is", "key": key, "value": value })
            }
            PushCondition::EventPropertyContains { key, value } => {
                json!({ "kind": "event_property_contains", "key": key, "value": value })
            }
            PushCondition::Raw(value) => value.clone(),
        }
    }
}
