//! Closed vocabularies and small value types shared by the request builders.
//!
//! # Design
//! Each protocol vocabulary (room visibility, push-rule kind, receipt type,
//! ...) is a plain enum with an `as_str` that yields the wire value. The
//! enums also serialize to that value so they can sit directly in request
//! body structs.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use uuid::Uuid;

use crate::error::ApiError;

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($(#[$vmeta:meta])* $variant:ident => $wire:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        pub enum $name {
            $($(#[$vmeta])* #[serde(rename = $wire)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

wire_enum! {
    /// Direction to paginate events in.
    #[derive(Default)]
    pub enum MessageDirection {
        #[default]
        Back => "b",
        Forward => "f",
    }
}

impl FromStr for MessageDirection {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "b" | "back" => Ok(MessageDirection::Back),
            "f" | "front" => Ok(MessageDirection::Forward),
            other => Err(ApiError::InvalidDirection(other.to_string())),
        }
    }
}

wire_enum! {
    /// Thumbnail resizing method. `Scale` keeps the aspect ratio, `Crop`
    /// returns exactly the requested size.
    #[derive(Default)]
    pub enum ResizingMethod {
        #[default]
        Scale => "scale",
        Crop => "crop",
    }
}

wire_enum! {
    /// Whether a new room is published in the server's room directory.
    #[derive(Default)]
    pub enum RoomVisibility {
        #[default]
        Private => "private",
        Public => "public",
    }
}

wire_enum! {
    /// Room creation presets.
    pub enum RoomPreset {
        PrivateChat => "private_chat",
        TrustedPrivateChat => "trusted_private_chat",
        PublicChat => "public_chat",
    }
}

wire_enum! {
    /// Event format returned through a filter.
    #[derive(Default)]
    pub enum EventFormat {
        #[default]
        Client => "client",
        Federation => "federation",
    }
}

wire_enum! {
    /// Push rule kinds, in priority order.
    pub enum PushRuleKind {
        Override => "override",
        Content => "content",
        Room => "room",
        Sender => "sender",
        Underride => "underride",
    }
}

wire_enum! {
    pub enum RelationshipType {
        Replacement => "m.replace",
        Annotation => "m.annotation",
        Thread => "m.thread",
        Reference => "m.reference",
    }
}

wire_enum! {
    /// Ephemeral receipt types.
    #[derive(Default)]
    pub enum ReceiptType {
        #[default]
        Read => "m.read",
        ReadPrivate => "m.read.private",
        FullyRead => "m.fully_read",
    }
}

wire_enum! {
    /// Which thread roots a thread listing returns.
    #[derive(Default)]
    pub enum ThreadInclusion {
        #[default]
        All => "all",
        Participated => "participated",
    }
}

wire_enum! {
    pub enum Presence {
        Online => "online",
        Offline => "offline",
        Unavailable => "unavailable",
    }
}

/// A sync/messages filter: either the id of an uploaded filter or an inline
/// filter definition.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Id(String),
    Definition(serde_json::Value),
}

impl Filter {
    /// Query-string form: the id verbatim, or the definition as compact JSON.
    pub fn to_query_value(&self) -> Result<String, ApiError> {
        match self {
            Filter::Id(id) => Ok(id.clone()),
            Filter::Definition(def) => Ok(serde_json::to_string(def)?),
        }
    }
}

/// Client-chosen idempotency token for write operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransactionId(String);

impl TransactionId {
    /// A fresh random (UUIDv4) transaction id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Uuid> for TransactionId {
    fn from(id: Uuid) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for TransactionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for TransactionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_parses_short_and_long_forms() {
        assert_eq!("b".parse::<MessageDirection>().unwrap(), MessageDirection::Back);
        assert_eq!("back".parse::<MessageDirection>().unwrap(), MessageDirection::Back);
        assert_eq!("f".parse::<MessageDirection>().unwrap(), MessageDirection::Forward);
        assert_eq!("front".parse::<MessageDirection>().unwrap(), MessageDirection::Forward);
    }

    #[test]
    fn vocabulary_defaults() {
        assert_eq!(MessageDirection::default(), MessageDirection::Back);
        assert_eq!(ResizingMethod::default().as_str(), "scale");
        assert_eq!(RoomVisibility::default().as_str(), "private");
        assert_eq!(EventFormat::default().as_str(), "client");
        assert_eq!(ReceiptType::default().as_str(), "m.read");
        assert_eq!(ThreadInclusion::default().as_str(), "all");
    }

    #[test]
    fn direction_rejects_unknown() {
        let err = "sideways".parse::<MessageDirection>().unwrap_err();
        assert!(matches!(err, ApiError::InvalidDirection(ref s) if s == "sideways"));
    }

    #[test]
    fn enums_serialize_to_wire_values() {
        assert_eq!(serde_json::to_string(&RoomPreset::TrustedPrivateChat).unwrap(), r#""trusted_private_chat""#);
        assert_eq!(serde_json::to_string(&ReceiptType::ReadPrivate).unwrap(), r#""m.read.private""#);
        assert_eq!(PushRuleKind::Underride.to_string(), "underride");
    }

    #[test]
    fn inline_filter_is_compact_json() {
        let filter = Filter::Definition(serde_json::json!({"room": {"timeline": {"limit": 5}}}));
        assert_eq!(filter.to_query_value().unwrap(), r#"{"room":{"timeline":{"limit":5}}}"#);
        assert_eq!(Filter::Id("f1".into()).to_query_value().unwrap(), "f1");
    }

    #[test]
    fn generated_transaction_ids_are_unique() {
        let a = TransactionId::generate();
        let b = TransactionId::generate();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(a.as_str()).is_ok());
    }

    #[test]
    fn uuid_transaction_id_uses_hyphenated_form() {
        let id = TransactionId::from(Uuid::nil());
        assert_eq!(id.as_str(), "00000000-0000-0000-0000-000000000000");
    }
}
