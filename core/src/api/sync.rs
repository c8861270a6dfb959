//! Sync and server-side filter endpoints.

use serde::Serialize;
use serde_json::Value;

use super::{finish, non_empty, to_json, Api};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest};
use crate::path::{build_client_path, Query};
use crate::types::{EventFormat, Filter, Presence};

#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Token from the previous sync's `next_batch`.
    pub since: Option<String>,
    /// Long-poll timeout in milliseconds.
    pub timeout: Option<u64>,
    pub filter: Option<Filter>,
    /// Return all state events even when `since` is set.
    pub full_state: Option<bool>,
    /// Presence to set while polling.
    pub set_presence: Option<Presence>,
}

#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    pub event_fields: Option<Vec<String>>,
    pub event_format: EventFormat,
    pub presence: Option<Value>,
    pub account_data: Option<Value>,
    pub room: Option<Value>,
}

#[derive(Serialize)]
struct FilterBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    event_fields: Option<&'a [String]>,
    event_format: EventFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    presence: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    account_data: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    room: Option<&'a Value>,
}

impl Api {
    /// Synchronise client state with the server.
    pub fn build_sync(&self, access_token: &str, opts: &SyncOptions) -> Result<HttpRequest, ApiError> {
        let filter = opts.filter.as_ref().map(Filter::to_query_value).transpose()?;
        let query = Query::new()
            .with_opt("since", non_empty(opts.since.as_deref()))
            .with_opt("full_state", opts.full_state)
            .with_opt("timeout", opts.timeout)
            .with_opt("set_presence", opts.set_presence.map(|p| p.as_str()))
            .with_opt("filter", filter);

        let path = build_client_path(["sync"], Some(&query));
        Ok(finish(HttpRequest::new(HttpMethod::Get, path).bearer(access_token)))
    }

    /// Upload a filter definition; the response carries its id.
    pub fn build_upload_filter(
        &self,
        access_token: &str,
        user_id: &str,
        opts: &FilterOptions,
    ) -> Result<HttpRequest, ApiError> {
        let body = FilterBody {
            event_fields: opts.event_fields.as_deref(),
            event_format: opts.event_format,
            presence: opts.presence.as_ref(),
            account_data: opts.account_data.as_ref(),
            room: opts.room.as_ref(),
        };
        let path = build_client_path(["user", user_id, "filter"], None);
        let req = HttpRequest::new(HttpMethod::Post, path)
            .bearer(access_token)
            .body(to_json(&body)?);
        Ok(finish(req))
    }
}
