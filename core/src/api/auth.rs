//! Discovery, registration, login and session endpoints.

use serde::Serialize;
use serde_json::{Map, Value};

use super::{finish, non_empty, to_json, Api};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest};
use crate::path::{build_client_path, build_path};

/// Server-defined authentication dictionary (`{"type": ..., ...}`).
pub type AuthDict = Map<String, Value>;

/// Credentials and device details for `build_login`.
///
/// When both `password` and `token` are set the password is used.
#[derive(Debug, Clone, Default)]
pub struct LoginOptions {
    pub password: Option<String>,
    pub token: Option<String>,
    /// Display name for a newly created device.
    pub device_name: Option<String>,
    /// Reuse an existing device; a new one is created if unknown.
    pub device_id: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RegisterOptions {
    pub password: Option<String>,
    pub device_name: Option<String>,
    pub device_id: Option<String>,
    /// Auth stage to complete. Defaults to `m.login.dummy`.
    pub auth: Option<AuthDict>,
}

/// How the server should look up the user logging in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum LoginIdentifier<'a> {
    #[serde(rename = "m.id.user")]
    User { user: &'a str },
    #[serde(rename = "m.id.thirdparty")]
    ThirdParty { medium: &'static str, address: &'a str },
}

impl<'a> LoginIdentifier<'a> {
    /// `alice@example.org` is an email address; `alice` and
    /// `@alice:example.org` are Matrix users.
    pub fn classify(user: &'a str) -> Self {
        if user.contains('@') && !user.starts_with('@') {
            LoginIdentifier::ThirdParty {
                medium: "email",
                address: user,
            }
        } else {
            LoginIdentifier::User { user }
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum LoginBody<'a> {
    #[serde(rename = "m.login.password")]
    Password {
        identifier: LoginIdentifier<'a>,
        password: &'a str,
        #[serde(skip_serializing_if = "Option::is_none")]
        device_id: Option<&'a str>,
        #[serde(skip_serializing_if = "Option::is_none")]
        initial_device_display_name: Option<&'a str>,
    },
    #[serde(rename = "m.login.token")]
    Token {
        token: &'a str,
        #[serde(skip_serializing_if = "Option::is_none")]
        device_id: Option<&'a str>,
        #[serde(skip_serializing_if = "Option::is_none")]
        initial_device_display_name: Option<&'a str>,
    },
}

#[derive(Serialize)]
struct RegisterBody<'a> {
    username: &'a str,
    /// Always sent; `null` without a password.
    password: Option<&'a str>,
    auth: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    device_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    initial_device_display_name: Option<&'a str>,
}

impl Api {
    /// Client discovery information for a domain (`/.well-known/matrix/client`).
    pub fn build_discovery_info(&self) -> HttpRequest {
        let path = build_path([".well-known", "matrix", "client"], None, "");
        finish(HttpRequest::new(HttpMethod::Get, path))
    }

    /// Login types supported by the homeserver.
    pub fn build_login_info(&self) -> HttpRequest {
        finish(HttpRequest::new(HttpMethod::Get, build_client_path(["login"], None)))
    }

    /// Register a new account. `user` is the desired local part.
    pub fn build_register(&self, user: &str, opts: &RegisterOptions) -> Result<HttpRequest, ApiError> {
        let auth = match &opts.auth {
            Some(auth) if !auth.is_empty() => Value::Object(auth.clone()),
            _ => serde_json::json!({ "type": "m.login.dummy" }),
        };
        let body = RegisterBody {
            username: user,
            password: opts.password.as_deref(),
            auth,
            device_id: non_empty(opts.device_id.as_deref()),
            initial_device_display_name: non_empty(opts.device_name.as_deref()),
        };
        let req = HttpRequest::new(HttpMethod::Post, build_client_path(["register"], None))
            .body(to_json(&body)?);
        Ok(finish(req))
    }

    /// Log in with a password or a login token.
    ///
    /// Fails with `MissingCredentials` when neither is supplied.
    pub fn build_login(&self, user: &str, opts: &LoginOptions) -> Result<HttpRequest, ApiError> {
        let device_id = non_empty(opts.device_id.as_deref());
        let initial_device_display_name = non_empty(opts.device_name.as_deref());

        let body = match (opts.password.as_deref(), opts.token.as_deref()) {
            (Some(password), _) => LoginBody::Password {
                identifier: LoginIdentifier::classify(user),
                password,
                device_id,
                initial_device_display_name,
            },
            (None, Some(token)) => LoginBody::Token {
                token,
                device_id,
                initial_device_display_name,
            },
            (None, None) => return Err(ApiError::MissingCredentials),
        };

        let req = HttpRequest::new(HttpMethod::Post, build_client_path(["login"], None))
            .body(to_json(&body)?);
        Ok(finish(req))
    }

    /// Log in with a caller-assembled auth dictionary, sent verbatim.
    pub fn build_login_raw(&self, auth: &AuthDict) -> Result<HttpRequest, ApiError> {
        if auth.is_empty() {
            return Err(ApiError::EmptyAuthDict);
        }
        let req = HttpRequest::new(HttpMethod::Post, build_client_path(["login"], None))
            .body(to_json(auth)?);
        Ok(finish(req))
    }

    /// Invalidate this session, or every session of the user with `all_devices`.
    pub fn build_logout(&self, access_token: &str, all_devices: bool) -> HttpRequest {
        let path = if all_devices {
            build_client_path(["logout", "all"], None)
        } else {
            build_client_path(["logout"], None)
        };
        finish(HttpRequest::new(HttpMethod::Post, path).bearer(access_token))
    }

    pub fn build_whoami(&self, access_token: &str) -> HttpRequest {
        let path = build_client_path(["account", "whoami"], None);
        finish(HttpRequest::new(HttpMethod::Get, path).bearer(access_token))
    }

    /// Request an OpenID token to prove the user's identity to a third party.
    pub fn build_get_openid_token(&self, access_token: &str, user_id: &str) -> HttpRequest {
        let path = build_client_path(["user", user_id, "openid", "request_token"], None);
        finish(
            HttpRequest::new(HttpMethod::Post, path)
                .bearer(access_token)
                .body("{}".to_string()),
        )
    }
}
