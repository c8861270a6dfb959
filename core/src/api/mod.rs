//! Stateless request builders for the Matrix client-server API.
//!
//! # Design
//! `Api` holds only a diagnostic sink and carries no state between calls.
//! Every operation is a `build_*` method that validates its arguments, puts
//! together a body (when the endpoint takes one) and a query, encodes the
//! path and returns an `HttpRequest`. The caller executes the request.
//!
//! Builders whose body can only be made of plain strings return
//! `HttpRequest` directly; builders that serialize caller-supplied JSON or
//! can reject their arguments return `Result<HttpRequest, ApiError>`.
//!
//! Optional arguments contribute a field only when present. Body structs
//! express this with `skip_serializing_if`, queries with `Query::with_opt`.

mod auth;
mod directory;
mod keys;
mod media;
mod profile;
mod push;
mod rooms;
mod sync;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::diagnostics::{DiagnosticSink, TracingSink};
use crate::error::ApiError;
use crate::http::HttpRequest;

pub use auth::{AuthDict, LoginIdentifier, LoginOptions, RegisterOptions};
pub use directory::PublicRoomsOptions;
pub use keys::ONE_TIME_KEY_ALGORITHM;
pub use media::{looks_like_content_type, DownloadOptions, ThumbnailOptions};
pub use push::PushRuleOptions;
pub use rooms::{
    HierarchyOptions, RelationsOptions, RoomCreateOptions, RoomMessagesOptions, ThreadsOptions,
    DEFAULT_TYPING_TIMEOUT_MS, MAIN_THREAD,
};
pub use sync::{FilterOptions, SyncOptions};

/// Builds Matrix client-server requests.
#[derive(Clone)]
pub struct Api {
    sink: Arc<dyn DiagnosticSink>,
}

impl Api {
    /// An `Api` that logs diagnostics through `tracing`.
    pub fn new() -> Self {
        Self::with_sink(Arc::new(TracingSink))
    }

    /// An `Api` that reports diagnostics to `sink`.
    pub fn with_sink(sink: Arc<dyn DiagnosticSink>) -> Self {
        Self { sink }
    }

    fn sink(&self) -> &dyn DiagnosticSink {
        self.sink.as_ref()
    }
}

impl Default for Api {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Api {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Api").finish_non_exhaustive()
    }
}

/// Serialize a body to compact JSON.
pub fn to_json<T: Serialize + ?Sized>(body: &T) -> Result<String, ApiError> {
    Ok(serde_json::to_string(body)?)
}

/// Serialize to canonical JSON: object keys sorted at every level, no
/// insignificant whitespace, non-ASCII characters left as-is.
pub fn to_canonical_json<T: Serialize + ?Sized>(body: &T) -> Result<String, ApiError> {
    let value = serde_json::to_value(body)?;
    Ok(serde_json::to_string(&sort_keys(value))?)
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> =
                map.into_iter().map(|(k, v)| (k, sort_keys(v))).collect();
            Value::Object(sorted.into_iter().collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

/// `None` for absent or empty strings.
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Drop JSON values that carry nothing: null, `{}` and `[]`.
fn non_empty_json(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| match v {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => true,
    })
}

fn finish(req: HttpRequest) -> HttpRequest {
    tracing::trace!(method = %req.method, path = %req.path, "built request");
    req
}

#[cfg(test)]
pub(crate) mod test_support {
    use serde_json::Value;

    use crate::http::HttpRequest;

    pub const TOKEN: &str = "SECRET_TOKEN";

    pub fn body_json(req: &HttpRequest) -> Value {
        serde_json::from_str(req.body.as_deref().expect("request has a body")).expect("body is JSON")
    }

    /// The token travels in the header and never in the query string.
    pub fn assert_authed(req: &HttpRequest) {
        assert_eq!(req.access_token(), Some(TOKEN));
        assert!(!req.path.contains("access_token"), "token leaked into {}", req.path);
    }
}
