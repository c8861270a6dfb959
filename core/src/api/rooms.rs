//! Room events, state, membership, creation and pagination endpoints.

use serde::Serialize;
use serde_json::{json, Value};

use super::{finish, non_empty, non_empty_json, to_json, Api};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest};
use crate::path::{build_client_path, build_path, Query, MATRIX_API_PATH_V1};
use crate::types::{
    MessageDirection, ReceiptType, RelationshipType, RoomPreset, RoomVisibility, ThreadInclusion,
    TransactionId,
};

/// Typing notifications expire after this many milliseconds unless renewed.
pub const DEFAULT_TYPING_TIMEOUT_MS: u64 = 30_000;

/// Default thread for receipts that are not scoped to a thread.
pub const MAIN_THREAD: &str = "main";

#[derive(Debug, Clone)]
pub struct RoomCreateOptions {
    pub visibility: RoomVisibility,
    /// Local part of the canonical alias (`foo` becomes `#foo:server`).
    pub alias: Option<String>,
    pub name: Option<String>,
    pub topic: Option<String>,
    pub room_version: Option<String>,
    pub room_type: Option<String>,
    /// Whether users on other homeservers may join. Cannot be changed later.
    pub federate: bool,
    pub is_direct: bool,
    pub preset: Option<RoomPreset>,
    pub invite: Vec<String>,
    pub initial_state: Vec<Value>,
    pub power_level_override: Option<Value>,
    pub predecessor: Option<Value>,
    /// Create a space. Takes precedence over `room_type`.
    pub space: bool,
}

impl Default for RoomCreateOptions {
    fn default() -> Self {
        Self {
            visibility: RoomVisibility::Private,
            alias: None,
            name: None,
            topic: None,
            room_version: None,
            room_type: None,
            federate: true,
            is_direct: false,
            preset: None,
            invite: Vec::new(),
            initial_state: Vec::new(),
            power_level_override: None,
            predecessor: None,
            space: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RoomMessagesOptions {
    /// Pagination token to start from.
    pub start: Option<String>,
    /// Pagination token to stop at.
    pub end: Option<String>,
    pub direction: MessageDirection,
    pub limit: u32,
    /// A `RoomEventFilter` definition.
    pub filter: Option<Value>,
}

impl Default for RoomMessagesOptions {
    fn default() -> Self {
        Self {
            start: None,
            end: None,
            direction: MessageDirection::Back,
            limit: 10,
            filter: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RelationsOptions {
    pub rel_type: Option<RelationshipType>,
    /// Only honoured together with `rel_type`.
    pub event_type: Option<String>,
    pub direction: MessageDirection,
    pub from: Option<String>,
    pub to: Option<String>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct ThreadsOptions {
    pub include: ThreadInclusion,
    pub from: Option<String>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct HierarchyOptions {
    pub from: Option<String>,
    pub limit: Option<u32>,
    pub max_depth: Option<u32>,
    pub suggested_only: bool,
}

#[derive(Serialize)]
struct CreationContent<'a> {
    #[serde(rename = "m.federate")]
    federate: bool,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    room_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    predecessor: Option<&'a Value>,
}

#[derive(Serialize)]
struct RoomCreateBody<'a> {
    visibility: RoomVisibility,
    creation_content: CreationContent<'a>,
    is_direct: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    room_alias_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    topic: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    room_version: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    preset: Option<RoomPreset>,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    invite: &'a [String],
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    initial_state: &'a [Value],
    #[serde(skip_serializing_if = "Option::is_none")]
    power_level_content_override: Option<&'a Value>,
}

#[derive(Serialize)]
struct MembershipBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'a str>,
}

#[derive(Serialize)]
struct TypingBody {
    typing: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    timeout: Option<u64>,
}

#[derive(Serialize)]
struct ReadMarkersBody<'a> {
    #[serde(rename = "m.fully_read")]
    fully_read: &'a str,
    #[serde(rename = "m.read", skip_serializing_if = "Option::is_none")]
    read: Option<&'a str>,
    #[serde(rename = "m.read.private", skip_serializing_if = "Option::is_none")]
    read_private: Option<&'a str>,
}

impl Api {
    /// Send a message event. `tx_id` makes retries idempotent.
    pub fn build_room_send(
        &self,
        access_token: &str,
        room_id: &str,
        event_type: &str,
        content: &Value,
        tx_id: &TransactionId,
    ) -> Result<HttpRequest, ApiError> {
        let path = build_client_path(["rooms", room_id, "send", event_type, tx_id.as_str()], None);
        let req = HttpRequest::new(HttpMethod::Put, path)
            .bearer(access_token)
            .body(to_json(content)?);
        Ok(finish(req))
    }

    pub fn build_room_get_event(&self, access_token: &str, room_id: &str, event_id: &str) -> HttpRequest {
        let path = build_client_path(["rooms", room_id, "event", event_id], None);
        finish(HttpRequest::new(HttpMethod::Get, path).bearer(access_token))
    }

    /// Child events of `event_id`, optionally narrowed by relation and event type.
    pub fn build_room_get_event_relations(
        &self,
        access_token: &str,
        room_id: &str,
        event_id: &str,
        opts: &RelationsOptions,
    ) -> HttpRequest {
        let mut segments = vec!["rooms", room_id, "relations", event_id];
        if let Some(rel_type) = opts.rel_type {
            segments.push(rel_type.as_str());
            if let Some(event_type) = non_empty(opts.event_type.as_deref()) {
                segments.push(event_type);
            }
        }
        let query = Query::new()
            .with("dir", opts.direction.as_str())
            .with_opt("from", non_empty(opts.from.as_deref()))
            .with_opt("to", non_empty(opts.to.as_deref()))
            .with_opt("limit", opts.limit.filter(|l| *l > 0));

        let path = build_path(segments, Some(&query), MATRIX_API_PATH_V1);
        finish(HttpRequest::new(HttpMethod::Get, path).bearer(access_token))
    }

    /// Thread roots in a room.
    pub fn build_room_get_threads(&self, access_token: &str, room_id: &str, opts: &ThreadsOptions) -> HttpRequest {
        let query = Query::new()
            .with("include", opts.include.as_str())
            .with_opt("from", non_empty(opts.from.as_deref()))
            .with_opt("limit", opts.limit.filter(|l| *l > 0));
        let path = build_path(["rooms", room_id, "threads"], Some(&query), MATRIX_API_PATH_V1);
        finish(HttpRequest::new(HttpMethod::Get, path).bearer(access_token))
    }

    /// Set a state event. An empty `state_key` addresses the type's default slot.
    pub fn build_room_put_state(
        &self,
        access_token: &str,
        room_id: &str,
        event_type: &str,
        content: &Value,
        state_key: &str,
    ) -> Result<HttpRequest, ApiError> {
        let path = build_client_path(["rooms", room_id, "state", event_type, state_key], None);
        let req = HttpRequest::new(HttpMethod::Put, path)
            .bearer(access_token)
            .body(to_json(content)?);
        Ok(finish(req))
    }

    pub fn build_room_get_state_event(
        &self,
        access_token: &str,
        room_id: &str,
        event_type: &str,
        state_key: &str,
    ) -> HttpRequest {
        let path = build_client_path(["rooms", room_id, "state", event_type, state_key], None);
        finish(HttpRequest::new(HttpMethod::Get, path).bearer(access_token))
    }

    /// The full current state of a room.
    pub fn build_room_get_state(&self, access_token: &str, room_id: &str) -> HttpRequest {
        let path = build_client_path(["rooms", room_id, "state"], None);
        finish(HttpRequest::new(HttpMethod::Get, path).bearer(access_token))
    }

    /// Strip the content of an event.
    pub fn build_room_redact(
        &self,
        access_token: &str,
        room_id: &str,
        event_id: &str,
        tx_id: &TransactionId,
        reason: Option<&str>,
    ) -> Result<HttpRequest, ApiError> {
        let body = MembershipBody {
            user_id: None,
            reason: non_empty(reason),
        };
        let path = build_client_path(["rooms", room_id, "redact", event_id, tx_id.as_str()], None);
        let req = HttpRequest::new(HttpMethod::Put, path)
            .bearer(access_token)
            .body(to_json(&body)?);
        Ok(finish(req))
    }

    /// Kick a user, or withdraw their invitation.
    pub fn build_room_kick(
        &self,
        access_token: &str,
        room_id: &str,
        user_id: &str,
        reason: Option<&str>,
    ) -> Result<HttpRequest, ApiError> {
        self.membership(access_token, ["rooms", room_id, "kick"], Some(user_id), reason)
    }

    pub fn build_room_ban(
        &self,
        access_token: &str,
        room_id: &str,
        user_id: &str,
        reason: Option<&str>,
    ) -> Result<HttpRequest, ApiError> {
        self.membership(access_token, ["rooms", room_id, "ban"], Some(user_id), reason)
    }

    pub fn build_room_unban(&self, access_token: &str, room_id: &str, user_id: &str) -> Result<HttpRequest, ApiError> {
        self.membership(access_token, ["rooms", room_id, "unban"], Some(user_id), None)
    }

    pub fn build_room_invite(&self, access_token: &str, room_id: &str, user_id: &str) -> Result<HttpRequest, ApiError> {
        self.membership(access_token, ["rooms", room_id, "invite"], Some(user_id), None)
    }

    /// Ask to be let into a room. `room_id` may also be an alias.
    pub fn build_room_knock(
        &self,
        access_token: &str,
        room_id: &str,
        reason: Option<&str>,
    ) -> Result<HttpRequest, ApiError> {
        self.membership(access_token, ["knock", room_id], None, reason)
    }

    /// Join a room by id or alias.
    pub fn build_join(&self, access_token: &str, room_id: &str) -> HttpRequest {
        let path = build_client_path(["join", room_id], None);
        finish(
            HttpRequest::new(HttpMethod::Post, path)
                .bearer(access_token)
                .body("{}".to_string()),
        )
    }

    pub fn build_room_leave(&self, access_token: &str, room_id: &str) -> HttpRequest {
        let path = build_client_path(["rooms", room_id, "leave"], None);
        finish(
            HttpRequest::new(HttpMethod::Post, path)
                .bearer(access_token)
                .body("{}".to_string()),
        )
    }

    /// Forget a room the user has left.
    pub fn build_room_forget(&self, access_token: &str, room_id: &str) -> HttpRequest {
        let path = build_client_path(["rooms", room_id, "forget"], None);
        finish(HttpRequest::new(HttpMethod::Post, path).bearer(access_token))
    }

    pub fn build_room_create(&self, access_token: &str, opts: &RoomCreateOptions) -> Result<HttpRequest, ApiError> {
        let room_type = if opts.space {
            Some("m.space")
        } else {
            non_empty(opts.room_type.as_deref())
        };
        let body = RoomCreateBody {
            visibility: opts.visibility,
            creation_content: CreationContent {
                federate: opts.federate,
                room_type,
                predecessor: non_empty_json(opts.predecessor.as_ref()),
            },
            is_direct: opts.is_direct,
            room_alias_name: non_empty(opts.alias.as_deref()),
            name: non_empty(opts.name.as_deref()),
            topic: non_empty(opts.topic.as_deref()),
            room_version: non_empty(opts.room_version.as_deref()),
            preset: opts.preset,
            invite: &opts.invite,
            initial_state: &opts.initial_state,
            power_level_content_override: non_empty_json(opts.power_level_override.as_ref()),
        };
        let req = HttpRequest::new(HttpMethod::Post, build_client_path(["createRoom"], None))
            .bearer(access_token)
            .body(to_json(&body)?);
        Ok(finish(req))
    }

    /// Paginate a room's timeline.
    pub fn build_room_messages(
        &self,
        access_token: &str,
        room_id: &str,
        opts: &RoomMessagesOptions,
    ) -> Result<HttpRequest, ApiError> {
        let filter = opts.filter.as_ref().map(to_json).transpose()?;
        let query = Query::new()
            .with("limit", opts.limit)
            .with_opt("from", non_empty(opts.start.as_deref()))
            .with_opt("to", non_empty(opts.end.as_deref()))
            .with("dir", opts.direction.as_str())
            .with_opt("filter", filter);
        let path = build_client_path(["rooms", room_id, "messages"], Some(&query));
        Ok(finish(HttpRequest::new(HttpMethod::Get, path).bearer(access_token)))
    }

    pub fn build_joined_members(&self, access_token: &str, room_id: &str) -> HttpRequest {
        let path = build_client_path(["rooms", room_id, "joined_members"], None);
        finish(HttpRequest::new(HttpMethod::Get, path).bearer(access_token))
    }

    pub fn build_joined_rooms(&self, access_token: &str) -> HttpRequest {
        let path = build_client_path(["joined_rooms"], None);
        finish(HttpRequest::new(HttpMethod::Get, path).bearer(access_token))
    }

    /// The user's `m.direct` account data, listing direct-message rooms.
    pub fn build_direct_room_list(&self, access_token: &str, user_id: &str) -> HttpRequest {
        let path = build_client_path(["user", user_id, "account_data", "m.direct"], None);
        finish(HttpRequest::new(HttpMethod::Get, path).bearer(access_token))
    }

    /// Start or stop a typing notification. `timeout_ms` is only sent while typing.
    pub fn build_room_typing(
        &self,
        access_token: &str,
        room_id: &str,
        user_id: &str,
        typing: bool,
        timeout_ms: u64,
    ) -> Result<HttpRequest, ApiError> {
        let body = TypingBody {
            typing,
            timeout: typing.then_some(timeout_ms),
        };
        let path = build_client_path(["rooms", room_id, "typing", user_id], None);
        let req = HttpRequest::new(HttpMethod::Put, path)
            .bearer(access_token)
            .body(to_json(&body)?);
        Ok(finish(req))
    }

    /// Move a receipt up to `event_id`. `thread_id` defaults to the main timeline.
    pub fn build_update_receipt_marker(
        &self,
        access_token: &str,
        room_id: &str,
        event_id: &str,
        receipt_type: ReceiptType,
        thread_id: Option<&str>,
    ) -> Result<HttpRequest, ApiError> {
        let body = json!({ "thread_id": thread_id.unwrap_or(MAIN_THREAD) });
        let path = build_client_path(["rooms", room_id, "receipt", receipt_type.as_str(), event_id], None);
        let req = HttpRequest::new(HttpMethod::Post, path)
            .bearer(access_token)
            .body(to_json(&body)?);
        Ok(finish(req))
    }

    /// Update the fully-read marker and, optionally, the read receipts.
    pub fn build_room_read_markers(
        &self,
        access_token: &str,
        room_id: &str,
        fully_read_event: &str,
        read_event: Option<&str>,
        private_read_event: Option<&str>,
    ) -> Result<HttpRequest, ApiError> {
        let body = ReadMarkersBody {
            fully_read: fully_read_event,
            read: non_empty(read_event),
            read_private: non_empty(private_read_event),
        };
        let path = build_client_path(["rooms", room_id, "read_markers"], None);
        let req = HttpRequest::new(HttpMethod::Post, path)
            .bearer(access_token)
            .body(to_json(&body)?);
        Ok(finish(req))
    }

    /// Events around `event_id`.
    pub fn build_room_context(
        &self,
        access_token: &str,
        room_id: &str,
        event_id: &str,
        limit: Option<u32>,
    ) -> HttpRequest {
        let query = Query::new().with_opt("limit", limit.filter(|l| *l > 0));
        let path = build_client_path(["rooms", room_id, "context", event_id], Some(&query));
        finish(HttpRequest::new(HttpMethod::Get, path).bearer(access_token))
    }

    /// Rooms and subspaces below a space.
    pub fn build_space_get_hierarchy(
        &self,
        access_token: &str,
        space_id: &str,
        opts: &HierarchyOptions,
    ) -> HttpRequest {
        let query = Query::new()
            .with_opt("from", non_empty(opts.from.as_deref()))
            .with_opt("limit", opts.limit.filter(|l| *l > 0))
            .with_opt("max_depth", opts.max_depth.filter(|d| *d > 0))
            .with_opt("suggested_only", opts.suggested_only.then_some(true));
        let path = build_path(["rooms", space_id, "hierarchy"], Some(&query), MATRIX_API_PATH_V1);
        finish(HttpRequest::new(HttpMethod::Get, path).bearer(access_token))
    }

    fn membership<const N: usize>(
        &self,
        access_token: &str,
        segments: [&str; N],
        user_id: Option<&str>,
        reason: Option<&str>,
    ) -> Result<HttpRequest, ApiError> {
        let body = MembershipBody {
            user_id,
            reason: non_empty(reason),
        };
        let req = HttpRequest::new(HttpMethod::Post, build_client_path(segments, None))
            .bearer(access_token)
            .body(to_json(&body)?);
        Ok(finish(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{assert_authed, body_json, TOKEN};

    const ROOM: &str = "!testroom:example.org";

    #[test]
    fn send_message_event() {
        let content = json!({"msgtype": "m.text", "body": "hello"});
        let tx = TransactionId::from("txn1");
        let req = Api::new()
            .build_room_send(TOKEN, ROOM, "m.room.message", &content, &tx)
            .unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(
            req.path,
            "/_matrix/client/v3/rooms/%21testroom%3Aexample.org/send/m.room.message/txn1"
        );
        assert_eq!(req.body.as_deref(), Some(r#"{"body":"hello","msgtype":"m.text"}"#));
        assert_authed(&req);
    }

    #[test]
    fn identical_arguments_give_identical_requests() {
        let api = Api::new();
        let content = json!({"body": "x"});
        let tx = TransactionId::from("t");
        let a = api.build_room_send(TOKEN, ROOM, "m.room.message", &content, &tx).unwrap();
        let b = api.build_room_send(TOKEN, ROOM, "m.room.message", &content, &tx).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn state_with_empty_key_has_no_trailing_slash() {
        let api = Api::new();
        let put = api
            .build_room_put_state(TOKEN, ROOM, "m.room.topic", &json!({"topic": "t"}), "")
            .unwrap();
        assert_eq!(put.path, "/_matrix/client/v3/rooms/%21testroom%3Aexample.org/state/m.room.topic");

        let get = api.build_room_get_state_event(TOKEN, ROOM, "m.room.member", "@a:b");
        assert_eq!(
            get.path,
            "/_matrix/client/v3/rooms/%21testroom%3Aexample.org/state/m.room.member/%40a%3Ab"
        );
        assert!(get.body.is_none());
    }

    #[test]
    fn relations_default_to_backwards() {
        let req = Api::new().build_room_get_event_relations(TOKEN, ROOM, "$ev", &RelationsOptions::default());
        assert_eq!(
            req.path,
            "/_matrix/client/v1/rooms/%21testroom%3Aexample.org/relations/%24ev?dir=b"
        );
    }

    #[test]
    fn relations_with_type_and_pagination() {
        let opts = RelationsOptions {
            rel_type: Some(RelationshipType::Thread),
            event_type: Some("m.room.message".into()),
            direction: MessageDirection::Forward,
            from: Some("p1".into()),
            to: Some("p2".into()),
            limit: Some(20),
        };
        let req = Api::new().build_room_get_event_relations(TOKEN, ROOM, "$ev", &opts);
        assert_eq!(
            req.path,
            "/_matrix/client/v1/rooms/%21testroom%3Aexample.org/relations/%24ev/m.thread/m.room.message?dir=f&from=p1&to=p2&limit=20"
        );
    }

    #[test]
    fn relation_event_type_needs_rel_type() {
        let opts = RelationsOptions {
            event_type: Some("m.room.message".into()),
            ..Default::default()
        };
        let req = Api::new().build_room_get_event_relations(TOKEN, ROOM, "$ev", &opts);
        assert!(!req.path.contains("m.room.message"));
    }

    #[test]
    fn threads_query() {
        let opts = ThreadsOptions {
            include: ThreadInclusion::Participated,
            from: Some("tok".into()),
            limit: Some(5),
        };
        let req = Api::new().build_room_get_threads(TOKEN, ROOM, &opts);
        assert_eq!(
            req.path,
            "/_matrix/client/v1/rooms/%21testroom%3Aexample.org/threads?include=participated&from=tok&limit=5"
        );
    }

    #[test]
    fn redact_with_and_without_reason() {
        let api = Api::new();
        let tx = TransactionId::from("t1");
        let with = api.build_room_redact(TOKEN, ROOM, "$ev", &tx, Some("spam")).unwrap();
        let without = api.build_room_redact(TOKEN, ROOM, "$ev", &tx, None).unwrap();
        assert_eq!(with.method, HttpMethod::Put);
        assert_eq!(with.path, "/_matrix/client/v3/rooms/%21testroom%3Aexample.org/redact/%24ev/t1");
        assert_eq!(with.body.as_deref(), Some(r#"{"reason":"spam"}"#));
        assert_eq!(without.body.as_deref(), Some("{}"));
    }

    #[test]
    fn membership_bodies() {
        let api = Api::new();
        let kick = api.build_room_kick(TOKEN, ROOM, "@bad:example.org", Some("rude")).unwrap();
        assert_eq!(kick.path, "/_matrix/client/v3/rooms/%21testroom%3Aexample.org/kick");
        assert_eq!(body_json(&kick), json!({"user_id": "@bad:example.org", "reason": "rude"}));

        let unban = api.build_room_unban(TOKEN, ROOM, "@bad:example.org").unwrap();
        assert_eq!(body_json(&unban), json!({"user_id": "@bad:example.org"}));

        let knock = api.build_room_knock(TOKEN, "#room:example.org", None).unwrap();
        assert_eq!(knock.path, "/_matrix/client/v3/knock/%23room%3Aexample.org");
        assert_eq!(knock.body.as_deref(), Some("{}"));
    }

    #[test]
    fn join_leave_forget() {
        let api = Api::new();
        let join = api.build_join(TOKEN, "#a:b");
        assert_eq!(join.path, "/_matrix/client/v3/join/%23a%3Ab");
        assert_eq!(join.body.as_deref(), Some("{}"));
        assert_eq!(api.build_room_leave(TOKEN, ROOM).body.as_deref(), Some("{}"));
        assert!(api.build_room_forget(TOKEN, ROOM).body.is_none());
    }

    #[test]
    fn default_room_create() {
        let req = Api::new().build_room_create(TOKEN, &RoomCreateOptions::default()).unwrap();
        assert_eq!(req.path, "/_matrix/client/v3/createRoom");
        assert_eq!(
            req.body.as_deref(),
            Some(r#"{"visibility":"private","creation_content":{"m.federate":true},"is_direct":false}"#)
        );
    }

    #[test]
    fn empty_predecessor_and_power_levels_are_omitted() {
        let opts = RoomCreateOptions {
            predecessor: Some(json!({})),
            power_level_override: Some(json!({})),
            ..Default::default()
        };
        let req = Api::new().build_room_create(TOKEN, &opts).unwrap();
        assert_eq!(
            req.body.as_deref(),
            Some(r#"{"visibility":"private","creation_content":{"m.federate":true},"is_direct":false}"#)
        );
    }

    #[test]
    fn space_overrides_room_type() {
        let opts = RoomCreateOptions {
            visibility: RoomVisibility::Public,
            alias: Some("foo".into()),
            name: Some("Foo".into()),
            room_type: Some("org.example.custom".into()),
            federate: false,
            preset: Some(RoomPreset::PublicChat),
            invite: vec!["@a:b".into()],
            predecessor: Some(json!({"room_id": "!old:b"})),
            space: true,
            ..Default::default()
        };
        let body = body_json(&Api::new().build_room_create(TOKEN, &opts).unwrap());
        assert_eq!(
            body,
            json!({
                "visibility": "public",
                "creation_content": {"m.federate": false, "type": "m.space", "predecessor": {"room_id": "!old:b"}},
                "is_direct": false,
                "room_alias_name": "foo",
                "name": "Foo",
                "preset": "public_chat",
                "invite": ["@a:b"]
            })
        );
    }

    #[test]
    fn messages_query_order() {
        let opts = RoomMessagesOptions {
            start: Some("s1".into()),
            filter: Some(json!({"types": ["m.room.message"]})),
            ..Default::default()
        };
        let req = Api::new().build_room_messages(TOKEN, ROOM, &opts).unwrap();
        assert_eq!(
            req.path,
            "/_matrix/client/v3/rooms/%21testroom%3Aexample.org/messages?limit=10&from=s1&dir=b&filter=%7B%22types%22%3A%5B%22m.room.message%22%5D%7D"
        );
    }

    #[test]
    fn typing_timeout_only_while_typing() {
        let api = Api::new();
        let on = api.build_room_typing(TOKEN, ROOM, "@a:b", true, DEFAULT_TYPING_TIMEOUT_MS).unwrap();
        let off = api.build_room_typing(TOKEN, ROOM, "@a:b", false, DEFAULT_TYPING_TIMEOUT_MS).unwrap();
        assert_eq!(on.body.as_deref(), Some(r#"{"typing":true,"timeout":30000}"#));
        assert_eq!(off.body.as_deref(), Some(r#"{"typing":false}"#));
    }

    #[test]
    fn receipts_and_markers() {
        let api = Api::new();
        let receipt = api
            .build_update_receipt_marker(TOKEN, ROOM, "$ev", ReceiptType::Read, None)
            .unwrap();
        assert_eq!(receipt.path, "/_matrix/client/v3/rooms/%21testroom%3Aexample.org/receipt/m.read/%24ev");
        assert_eq!(body_json(&receipt), json!({"thread_id": "main"}));

        let markers = api
            .build_room_read_markers(TOKEN, ROOM, "$a", None, Some("$b"))
            .unwrap();
        assert_eq!(body_json(&markers), json!({"m.fully_read": "$a", "m.read.private": "$b"}));
    }

    #[test]
    fn hierarchy_flags() {
        let opts = HierarchyOptions {
            limit: Some(10),
            suggested_only: true,
            ..Default::default()
        };
        let req = Api::new().build_space_get_hierarchy(TOKEN, "!space:b", &opts);
        assert_eq!(
            req.path,
            "/_matrix/client/v1/rooms/%21space%3Ab/hierarchy?limit=10&suggested_only=true"
        );
        let bare = Api::new().build_space_get_hierarchy(TOKEN, "!space:b", &HierarchyOptions::default());
        assert_eq!(bare.path, "/_matrix/client/v1/rooms/%21space%3Ab/hierarchy");
    }

    #[test]
    fn context_and_member_lists() {
        let api = Api::new();
        assert_eq!(
            api.build_room_context(TOKEN, ROOM, "$e", Some(3)).path,
            "/_matrix/client/v3/rooms/%21testroom%3Aexample.org/context/%24e?limit=3"
        );
        assert_eq!(api.build_joined_rooms(TOKEN).path, "/_matrix/client/v3/joined_rooms");
        assert_eq!(
            api.build_direct_room_list(TOKEN, "@a:b").path,
            "/_matrix/client/v3/user/%40a%3Ab/account_data/m.direct"
        );
    }
}
