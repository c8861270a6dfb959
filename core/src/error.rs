//! Error types for the request builders.
//!
//! # Design
//! Every variant is a caller-contract violation: the arguments cannot be
//! turned into a request the server would accept. None of them are
//! retryable, and the builders never swallow them. Advisory problems that
//! do not block construction go through [`crate::diagnostics`] instead.

use thiserror::Error;

use crate::types::PushRuleKind;

/// Errors returned by `Api::build_*` methods.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Login was attempted with neither a password nor a login token.
    #[error("neither a password nor a token was provided")]
    MissingCredentials,

    /// A raw auth dictionary was required but empty.
    #[error("auth dictionary cannot be empty")]
    EmptyAuthDict,

    /// Push rule `before` and `after` are mutually exclusive.
    #[error("before ({before}) and after ({after}) cannot both be specified")]
    ConflictingPosition { before: String, after: String },

    /// A pattern was given for a rule kind other than `content`.
    #[error("pattern can only be set for content rules, not {kind}")]
    PatternNotAllowed { kind: PushRuleKind },

    /// Conditions were given for a rule kind other than `override`/`underride`.
    #[error("conditions can only be set for override/underride rules, not {kind}")]
    ConditionsNotAllowed { kind: PushRuleKind },

    /// A textual pagination direction that is neither back nor forward.
    #[error("invalid direction: {0}")]
    InvalidDirection(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
