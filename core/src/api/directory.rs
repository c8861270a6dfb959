//! Room directory: aliases, visibility and the public room list.

use serde::Serialize;

use super::{finish, non_empty, to_json, Api};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest};
use crate::path::{build_client_path, Query};

/// Filters for the public room list.
///
/// `limit`, `server` and `since` fit in a GET query string. Setting any of
/// the other filters switches the request to a POST with a JSON body.
#[derive(Debug, Clone, Default)]
pub struct PublicRoomsOptions {
    pub limit: Option<u32>,
    /// Server whose directory to list; defaults to the local server.
    pub server: Option<String>,
    pub since: Option<String>,
    pub filter_generic_search_term: Option<String>,
    /// Room types to include. `None` selects rooms without a type.
    pub filter_room_types: Vec<Option<String>>,
    pub include_all_networks: Option<bool>,
    pub third_party_instance_id: Option<String>,
}

impl PublicRoomsOptions {
    /// Whether any filter the GET form cannot express is set.
    pub fn needs_post(&self) -> bool {
        non_empty(self.filter_generic_search_term.as_deref()).is_some()
            || !self.filter_room_types.is_empty()
            || self.include_all_networks == Some(true)
            || non_empty(self.third_party_instance_id.as_deref()).is_some()
    }
}

#[derive(Serialize)]
struct RoomFilter<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    generic_search_term: Option<&'a str>,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    room_types: &'a [Option<String>],
}

#[derive(Serialize)]
struct PublicRoomsBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    since: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<RoomFilter<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    include_all_networks: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    third_party_instance_id: Option<&'a str>,
}

impl Api {
    /// Look up the room id behind an alias. No authentication required.
    pub fn build_room_resolve_alias(&self, room_alias: &str) -> HttpRequest {
        let path = build_client_path(["directory", "room", room_alias], None);
        finish(HttpRequest::new(HttpMethod::Get, path))
    }

    pub fn build_room_delete_alias(&self, access_token: &str, room_alias: &str) -> HttpRequest {
        let path = build_client_path(["directory", "room", room_alias], None);
        finish(HttpRequest::new(HttpMethod::Delete, path).bearer(access_token))
    }

    /// Point `room_alias` at `room_id`.
    pub fn build_room_put_alias(
        &self,
        access_token: &str,
        room_alias: &str,
        room_id: &str,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::json!({ "room_id": room_id });
        let path = build_client_path(["directory", "room", room_alias], None);
        let req = HttpRequest::new(HttpMethod::Put, path)
            .bearer(access_token)
            .body(to_json(&body)?);
        Ok(finish(req))
    }

    /// Whether a room is published in the directory. No authentication required.
    pub fn build_room_get_visibility(&self, room_id: &str) -> HttpRequest {
        let path = build_client_path(["directory", "list", "room", room_id], None);
        finish(HttpRequest::new(HttpMethod::Get, path))
    }

    /// List published rooms. GET for plain paging, POST once a search or
    /// network filter is involved.
    pub fn build_public_rooms(
        &self,
        access_token: Option<&str>,
        opts: &PublicRoomsOptions,
    ) -> Result<HttpRequest, ApiError> {
        let query = Query::new().with_opt("server", non_empty(opts.server.as_deref()));

        if !opts.needs_post() {
            let query = query
                .with_opt("limit", opts.limit)
                .with_opt("since", opts.since.as_deref());
            let path = build_client_path(["publicRooms"], Some(&query));
            return Ok(finish(
                HttpRequest::new(HttpMethod::Get, path).maybe_bearer(non_empty(access_token)),
            ));
        }

        let search_term = opts.filter_generic_search_term.as_deref();
        let filter = (search_term.is_some() || !opts.filter_room_types.is_empty()).then(|| RoomFilter {
            generic_search_term: search_term,
            room_types: &opts.filter_room_types,
        });
        let body = PublicRoomsBody {
            limit: opts.limit.filter(|l| *l > 0),
            since: opts.since.as_deref(),
            filter,
            include_all_networks: opts.include_all_networks,
            third_party_instance_id: non_empty(opts.third_party_instance_id.as_deref()),
        };
        let path = build_client_path(["publicRooms"], Some(&query));
        let req = HttpRequest::new(HttpMethod::Post, path)
            .maybe_bearer(non_empty(access_token))
            .body(to_json(&body)?);
        Ok(finish(req))
    }
}
