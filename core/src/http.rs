//! HTTP request descriptors for the host-does-IO pattern.
//!
//! # Design
//! `HttpRequest` describes a Matrix client-server request as plain data.
//! The core builds these values without ever touching the network; the
//! caller (host) attaches a homeserver origin to `path`, sends `headers`
//! verbatim and uses `body` as the literal payload when it is `Some`.
//!
//! All fields use owned types so values can cross FFI boundaries without
//! lifetime concerns. Headers live in a `BTreeMap` so two descriptors built
//! from the same arguments compare and print identically.

use std::collections::BTreeMap;
use std::fmt;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// Built by the `Api::build_*` methods. `path` is always relative to the
/// homeserver origin and starts with one of the API prefixes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub(crate) fn new(method: HttpMethod, path: String) -> Self {
        Self {
            method,
            path,
            headers: BTreeMap::new(),
            body: None,
        }
    }

    /// Attach `Authorization: Bearer <token>`.
    pub(crate) fn bearer(mut self, access_token: &str) -> Self {
        self.headers
            .insert("Authorization".to_string(), format!("Bearer {access_token}"));
        self
    }

    /// Attach the bearer header only when a token was supplied.
    pub(crate) fn maybe_bearer(self, access_token: Option<&str>) -> Self {
        match access_token {
            Some(token) => self.bearer(token),
            None => self,
        }
    }

    pub(crate) fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }

    pub(crate) fn body(mut self, body: String) -> Self {
        self.body = Some(body);
        self
    }

    /// Value of the bearer token carried by this request, if any.
    pub fn access_token(&self) -> Option<&str> {
        self.headers
            .get("Authorization")
            .and_then(|v| v.strip_prefix("Bearer "))
    }
}
