//! Advisory diagnostics emitted while building requests.
//!
//! # Design
//! Some inputs are suspicious but not wrong enough to refuse: a content type
//! that does not look like a MIME type, or a caller asking for the access
//! token to be embedded in a media URL. These never block construction.
//! They are handed to a `DiagnosticSink` owned by the `Api`, so an
//! application can route them wherever it likes and tests can capture them.

use std::fmt;
use std::sync::{Arc, Mutex};

/// A non-fatal problem noticed while building a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// The upload content type does not look like `type/subtype`.
    SuspiciousContentType { content_type: String },
    /// A media URL was built with the access token in its query string.
    DeprecatedTokenInUrl,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::SuspiciousContentType { content_type } => write!(
                f,
                "\"{content_type}\" was passed as content type but does not look like a valid content type; \
                 was a file name passed by mistake?"
            ),
            Diagnostic::DeprecatedTokenInUrl => write!(
                f,
                "mxc_to_http() exposes the access token in the url, which is deprecated; use download() instead"
            ),
        }
    }
}

/// Receives diagnostics from the request builders.
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, diagnostic: Diagnostic);
}

/// Default sink: logs every diagnostic at `warn` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::SuspiciousContentType { content_type } => {
                tracing::warn!(content_type = %content_type, "{diagnostic}");
            }
            Diagnostic::DeprecatedTokenInUrl => tracing::warn!("{diagnostic}"),
        }
    }
}

/// Sink that keeps everything it receives, in order.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    seen: Arc<Mutex<Vec<Diagnostic>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the diagnostics received so far.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        match self.seen.lock() {
            Ok(seen) => seen.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl DiagnosticSink for MemorySink {
    fn emit(&self, diagnostic: Diagnostic) {
        match self.seen.lock() {
            Ok(mut seen) => seen.push(diagnostic),
            Err(poisoned) => poisoned.into_inner().push(diagnostic),
        }
    }
}
