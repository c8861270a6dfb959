//! Profile and presence.

use serde::Serialize;

use super::{finish, non_empty, to_json, Api};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest};
use crate::path::build_client_path;
use crate::types::Presence;

#[derive(Serialize)]
struct PresenceBody<'a> {
    presence: Presence,
    #[serde(skip_serializing_if = "Option::is_none")]
    status_msg: Option<&'a str>,
}

impl Api {
    /// Full profile of `user_id`. Servers may allow this without a token.
    pub fn build_profile_get(&self, user_id: &str, access_token: Option<&str>) -> HttpRequest {
        let path = build_client_path(["profile", user_id], None);
        finish(HttpRequest::new(HttpMethod::Get, path).maybe_bearer(non_empty(access_token)))
    }

    pub fn build_profile_get_displayname(&self, user_id: &str, access_token: Option<&str>) -> HttpRequest {
        let path = build_client_path(["profile", user_id, "displayname"], None);
        finish(HttpRequest::new(HttpMethod::Get, path).maybe_bearer(non_empty(access_token)))
    }

    pub fn build_profile_get_avatar(&self, user_id: &str, access_token: Option<&str>) -> HttpRequest {
        let path = build_client_path(["profile", user_id, "avatar_url"], None);
        finish(HttpRequest::new(HttpMethod::Get, path).maybe_bearer(non_empty(access_token)))
    }

    pub fn build_profile_set_displayname(
        &self,
        access_token: &str,
        user_id: &str,
        display_name: &str,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::json!({ "displayname": display_name });
        let path = build_client_path(["profile", user_id, "displayname"], None);
        let req = HttpRequest::new(HttpMethod::Put, path)
            .bearer(access_token)
            .body(to_json(&body)?);
        Ok(finish(req))
    }

    /// Set the avatar to an `mxc://` URI previously returned by an upload.
    pub fn build_profile_set_avatar(
        &self,
        access_token: &str,
        user_id: &str,
        avatar_url: &str,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::json!({ "avatar_url": avatar_url });
        let path = build_client_path(["profile", user_id, "avatar_url"], None);
        let req = HttpRequest::new(HttpMethod::Put, path)
            .bearer(access_token)
            .body(to_json(&body)?);
        Ok(finish(req))
    }

    pub fn build_get_presence(&self, access_token: &str, user_id: &str) -> HttpRequest {
        let path = build_client_path(["presence", user_id, "status"], None);
        finish(HttpRequest::new(HttpMethod::Get, path).bearer(access_token))
    }

    pub fn build_set_presence(
        &self,
        access_token: &str,
        user_id: &str,
        presence: Presence,
        status_msg: Option<&str>,
    ) -> Result<HttpRequest, ApiError> {
        let body = PresenceBody {
            presence,
            status_msg: non_empty(status_msg),
        };
        let path = build_client_path(["presence", user_id, "status"], None);
        let req = HttpRequest::new(HttpMethod::Put, path)
            .bearer(access_token)
            .body(to_json(&body)?);
        Ok(finish(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{assert_authed, TOKEN};

    #[test]
    fn profile_reads_are_optionally_authenticated() {
        let api = Api::new();
        let anon = api.build_profile_get("@alice:example.org", None);
        assert_eq!(anon.path, "/_matrix/client/v3/profile/%40alice%3Aexample.org");
        assert!(anon.headers.is_empty());

        let authed = api.build_profile_get_displayname("@alice:example.org", Some(TOKEN));
        assert_eq!(
            authed.path,
            "/_matrix/client/v3/profile/%40alice%3Aexample.org/displayname"
        );
        assert_authed(&authed);

        let avatar = api.build_profile_get_avatar("@alice:example.org", Some(""));
        assert!(avatar.path.ends_with("/avatar_url"));
        assert!(avatar.headers.is_empty());
    }

    #[test]
    fn profile_writes() {
        let api = Api::new();
        let name = api
            .build_profile_set_displayname(TOKEN, "@alice:example.org", "Alice")
            .unwrap();
        assert_eq!(name.method, HttpMethod::Put);
        assert_eq!(name.body.as_deref(), Some(r#"{"displayname":"Alice"}"#));

        let avatar = api
            .build_profile_set_avatar(TOKEN, "@alice:example.org", "mxc://example.org/abc")
            .unwrap();
        assert_eq!(
            avatar.body.as_deref(),
            Some(r#"{"avatar_url":"mxc://example.org/abc"}"#)
        );
        assert_authed(&avatar);
    }

    #[test]
    fn presence_status_message_is_optional() {
        let api = Api::new();
        let bare = api
            .build_set_presence(TOKEN, "@a:x", Presence::Unavailable, None)
            .unwrap();
        assert_eq!(bare.path, "/_matrix/client/v3/presence/%40a%3Ax/status");
        assert_eq!(bare.body.as_deref(), Some(r#"{"presence":"unavailable"}"#));

        let with_msg = api
            .build_set_presence(TOKEN, "@a:x", Presence::Online, Some("lunch"))
            .unwrap();
        assert_eq!(
            with_msg.body.as_deref(),
            Some(r#"{"presence":"online","status_msg":"lunch"}"#)
        );

        let get = api.build_get_presence(TOKEN, "@a:x");
        assert_eq!(get.method, HttpMethod::Get);
        assert_authed(&get);
    }
}
