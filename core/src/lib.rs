//! Request construction for the Matrix client-server API.
//!
//! # Overview
//! Builds `HttpRequest` values without touching the network (host-does-IO
//! pattern). The caller executes the HTTP round-trip and interprets the
//! response, so the core is deterministic and testable: the same inputs
//! always yield byte-identical paths and bodies.
//!
//! # Design
//! - `Api` is stateless apart from an injectable `DiagnosticSink`.
//! - `path` owns percent-encoding and query assembly; builders never format
//!   URLs by hand.
//! - Fixed protocol vocabularies are closed enums in `types`.
//! - Access tokens travel in the `Authorization` header, except for the
//!   deprecated media URL form, which reports a diagnostic.
//! - Response parsing stays with the caller.

pub mod api;
pub mod content_uri;
pub mod diagnostics;
pub mod error;
pub mod http;
pub mod path;
pub mod push;
pub mod types;

pub use api::Api;
pub use content_uri::{mimetype_to_msgtype, ContentUri, EncryptionInfo};
pub use diagnostics::{Diagnostic, DiagnosticSink, MemorySink, TracingSink};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest};
pub use push::{PushAction, PushCondition};
pub use types::{
    EventFormat, Filter, MessageDirection, Presence, PushRuleKind, ReceiptType, RelationshipType,
    ResizingMethod, RoomPreset, RoomVisibility, ThreadInclusion, TransactionId,
};
