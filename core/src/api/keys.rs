//! End-to-end key distribution, to-device messages and device management.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use super::auth::AuthDict;
use super::{finish, non_empty, to_json, Api};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest};
use crate::path::build_client_path;
use crate::types::TransactionId;

/// One-time key algorithm requested by `build_keys_claim`.
pub const ONE_TIME_KEY_ALGORITHM: &str = "signed_curve25519";

#[derive(Serialize)]
struct KeysQueryBody<'a> {
    device_keys: BTreeMap<&'a str, [&'a str; 0]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<&'a str>,
}

#[derive(Serialize)]
struct KeysClaimBody<'a> {
    one_time_keys: BTreeMap<&'a str, BTreeMap<&'a str, &'static str>>,
}

#[derive(Serialize)]
struct DeleteDevicesBody<'a> {
    devices: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    auth: Option<&'a AuthDict>,
}

impl Api {
    /// Publish device and one-time keys. `keys` is sent verbatim.
    pub fn build_keys_upload(&self, access_token: &str, keys: &Value) -> Result<HttpRequest, ApiError> {
        let req = HttpRequest::new(HttpMethod::Post, build_client_path(["keys", "upload"], None))
            .bearer(access_token)
            .body(to_json(keys)?);
        Ok(finish(req))
    }

    /// Fetch all device keys of `users`. `token` is a sync token the
    /// results must be at least as recent as.
    pub fn build_keys_query<I, S>(
        &self,
        access_token: &str,
        users: I,
        token: Option<&str>,
    ) -> Result<HttpRequest, ApiError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let users: Vec<S> = users.into_iter().collect();
        let device_keys: BTreeMap<&str, [&str; 0]> = users.iter().map(|u| (u.as_ref(), [])).collect();
        let body = KeysQueryBody {
            device_keys,
            token: non_empty(token),
        };
        let req = HttpRequest::new(HttpMethod::Post, build_client_path(["keys", "query"], None))
            .bearer(access_token)
            .body(to_json(&body)?);
        Ok(finish(req))
    }

    /// Claim one one-time key for every listed device.
    pub fn build_keys_claim(
        &self,
        access_token: &str,
        devices: &BTreeMap<String, Vec<String>>,
    ) -> Result<HttpRequest, ApiError> {
        let one_time_keys: BTreeMap<&str, BTreeMap<&str, &'static str>> = devices
            .iter()
            .map(|(user, device_ids)| {
                let per_device: BTreeMap<&str, &'static str> = device_ids
                    .iter()
                    .map(|d| (d.as_str(), ONE_TIME_KEY_ALGORITHM))
                    .collect();
                (user.as_str(), per_device)
            })
            .collect();
        let body = KeysClaimBody { one_time_keys };
        let req = HttpRequest::new(HttpMethod::Post, build_client_path(["keys", "claim"], None))
            .bearer(access_token)
            .body(to_json(&body)?);
        Ok(finish(req))
    }

    /// Send events directly to devices. `content` maps user to device to payload.
    pub fn build_to_device(
        &self,
        access_token: &str,
        event_type: &str,
        content: &Value,
        tx_id: &TransactionId,
    ) -> Result<HttpRequest, ApiError> {
        let path = build_client_path(["sendToDevice", event_type, tx_id.as_str()], None);
        let req = HttpRequest::new(HttpMethod::Put, path)
            .bearer(access_token)
            .body(to_json(content)?);
        Ok(finish(req))
    }

    pub fn build_devices(&self, access_token: &str) -> HttpRequest {
        finish(HttpRequest::new(HttpMethod::Get, build_client_path(["devices"], None)).bearer(access_token))
    }

    /// Update device metadata, e.g. `{"display_name": "laptop"}`.
    pub fn build_update_device(
        &self,
        access_token: &str,
        device_id: &str,
        content: &Value,
    ) -> Result<HttpRequest, ApiError> {
        let req = HttpRequest::new(HttpMethod::Put, build_client_path(["devices", device_id], None))
            .bearer(access_token)
            .body(to_json(content)?);
        Ok(finish(req))
    }

    /// Delete devices. The first attempt usually omits `auth` and receives
    /// the interactive-auth flows to complete.
    pub fn build_delete_devices(
        &self,
        access_token: &str,
        devices: &[String],
        auth: Option<&AuthDict>,
    ) -> Result<HttpRequest, ApiError> {
        let body = DeleteDevicesBody {
            devices,
            auth: auth.filter(|a| !a.is_empty()),
        };
        let req = HttpRequest::new(HttpMethod::Post, build_client_path(["delete_devices"], None))
            .bearer(access_token)
            .body(to_json(&body)?);
        Ok(finish(req))
    }
}
