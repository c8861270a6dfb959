//! C-ABI wrapper around `mxreq-core`.
//!
//! # Overview
//! Exposes the most common request builders through `extern "C"` functions
//! so any language with a C FFI can construct Matrix requests and execute
//! them with its own HTTP stack.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Every `mx_build_*` returns an `FfiBuildResult` envelope; null required
//!   arguments come back as `NullArg` results rather than null pointers.
//! - Optional arguments are nullable pointers or negative integers.
//! - The C caller owns all returned pointers and must call the matching
//!   `mx_free_*` function to release them.

pub mod types;

use std::any::Any;
use std::ffi::CStr;
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use mxreq_core::api::{LoginOptions, PublicRoomsOptions, SyncOptions};
use mxreq_core::{HttpRequest, TransactionId};

use types::*;

// ---------------------------------------------------------------------------
// Argument helpers
// ---------------------------------------------------------------------------

/// Borrow a required C string argument.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string that outlives the call.
unsafe fn required<'a>(ptr: *const c_char, name: &'static str) -> Result<&'a str, Failure> {
    if ptr.is_null() {
        return Err(Failure::NullArg(name));
    }
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map_err(|_| Failure::InvalidUtf8(name))
}

/// Borrow an optional C string argument; null means absent.
///
/// # Safety
/// Same contract as [`required`].
unsafe fn optional<'a>(ptr: *const c_char, name: &'static str) -> Result<Option<&'a str>, Failure> {
    if ptr.is_null() {
        return Ok(None);
    }
    unsafe { required(ptr, name) }.map(Some)
}

fn api_ref<'a>(api: *const FfiApi) -> Result<&'a FfiApi, Failure> {
    if api.is_null() {
        return Err(Failure::NullArg("api"));
    }
    Ok(unsafe { &*api })
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "panic in mxreq".to_string())
}

/// Run a builder and package its outcome as an `FfiBuildResult`.
fn guarded(f: impl FnOnce() -> Result<HttpRequest, Failure>) -> *mut FfiBuildResult {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(req)) => FfiBuildResult::ok(req),
        Ok(Err(failure)) => FfiBuildResult::from_failure(failure),
        Err(payload) => FfiBuildResult::panic(&panic_message(payload)),
    }
}

// ---------------------------------------------------------------------------
// Api lifecycle
// ---------------------------------------------------------------------------

/// Create a new `Api` that logs diagnostics through `tracing`.
///
/// The caller must free the returned pointer with `mx_api_free`.
#[unsafe(no_mangle)]
pub extern "C" fn mx_api_new() -> *mut FfiApi {
    catch_unwind(|| {
        Box::into_raw(Box::new(FfiApi {
            inner: mxreq_core::Api::new(),
        }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free an `Api` created by `mx_api_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn mx_api_free(api: *mut FfiApi) {
    if !api.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(api) });
        }));
    }
}

// ---------------------------------------------------------------------------
// Build request functions
// ---------------------------------------------------------------------------

/// Build a login request.
///
/// `password`, `token`, `device_name` and `device_id` may be null. With
/// both `password` and `token` the password is used; with neither the
/// result carries `MissingCredentials`.
#[unsafe(no_mangle)]
pub extern "C" fn mx_build_login(
    api: *const FfiApi,
    user: *const c_char,
    password: *const c_char,
    token: *const c_char,
    device_name: *const c_char,
    device_id: *const c_char,
) -> *mut FfiBuildResult {
    guarded(|| {
        let api = api_ref(api)?;
        let user = unsafe { required(user, "user") }?;
        let opts = LoginOptions {
            password: unsafe { optional(password, "password") }?.map(str::to_string),
            token: unsafe { optional(token, "token") }?.map(str::to_string),
            device_name: unsafe { optional(device_name, "device_name") }?.map(str::to_string),
            device_id: unsafe { optional(device_id, "device_id") }?.map(str::to_string),
        };
        Ok(api.inner.build_login(user, &opts)?)
    })
}

/// Build a sync request. `since` may be null; a negative `timeout_ms`
/// leaves the timeout to the server.
#[unsafe(no_mangle)]
pub extern "C" fn mx_build_sync(
    api: *const FfiApi,
    access_token: *const c_char,
    since: *const c_char,
    timeout_ms: i64,
) -> *mut FfiBuildResult {
    guarded(|| {
        let api = api_ref(api)?;
        let access_token = unsafe { required(access_token, "access_token") }?;
        let opts = SyncOptions {
            since: unsafe { optional(since, "since") }?.map(str::to_string),
            timeout: u64::try_from(timeout_ms).ok(),
            ..Default::default()
        };
        Ok(api.inner.build_sync(access_token, &opts)?)
    })
}

/// Build a room message send. `content_json` must be a JSON document;
/// a null `tx_id` generates a fresh transaction id.
#[unsafe(no_mangle)]
pub extern "C" fn mx_build_room_send(
    api: *const FfiApi,
    access_token: *const c_char,
    room_id: *const c_char,
    event_type: *const c_char,
    content_json: *const c_char,
    tx_id: *const c_char,
) -> *mut FfiBuildResult {
    guarded(|| {
        let api = api_ref(api)?;
        let access_token = unsafe { required(access_token, "access_token") }?;
        let room_id = unsafe { required(room_id, "room_id") }?;
        let event_type = unsafe { required(event_type, "event_type") }?;
        let content_json = unsafe { required(content_json, "content_json") }?;
        let content: serde_json::Value = serde_json::from_str(content_json)
            .map_err(|e| Failure::InvalidJson(format!("content_json: {e}")))?;
        let tx_id = match unsafe { optional(tx_id, "tx_id") }? {
            Some(id) => TransactionId::from(id),
            None => TransactionId::generate(),
        };
        Ok(api
            .inner
            .build_room_send(access_token, room_id, event_type, &content, &tx_id)?)
    })
}

/// Build a join request for a room id or alias.
#[unsafe(no_mangle)]
pub extern "C" fn mx_build_join(
    api: *const FfiApi,
    access_token: *const c_char,
    room_id: *const c_char,
) -> *mut FfiBuildResult {
    guarded(|| {
        let api = api_ref(api)?;
        let access_token = unsafe { required(access_token, "access_token") }?;
        let room_id = unsafe { required(room_id, "room_id") }?;
        Ok(api.inner.build_join(access_token, room_id))
    })
}

/// Build a public room list request. `access_token` and `search_term` may
/// be null; `limit <= 0` means no limit. A search term turns the request
/// into a POST.
#[unsafe(no_mangle)]
pub extern "C" fn mx_build_public_rooms(
    api: *const FfiApi,
    access_token: *const c_char,
    limit: i32,
    search_term: *const c_char,
) -> *mut FfiBuildResult {
    guarded(|| {
        let api = api_ref(api)?;
        let access_token = unsafe { optional(access_token, "access_token") }?;
        let opts = PublicRoomsOptions {
            limit: u32::try_from(limit).ok().filter(|l| *l > 0),
            filter_generic_search_term: unsafe { optional(search_term, "search_term") }?.map(str::to_string),
            ..Default::default()
        };
        Ok(api.inner.build_public_rooms(access_token, &opts)?)
    })
}

/// Convert an `mxc://` URI into an HTTP download URL.
///
/// `homeserver` may be null, in which case the URI's own server is used.
/// Returns null if `mxc` is null or not a valid content URI. The caller
/// must free the returned string with `mx_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn mx_mxc_to_http(mxc: *const c_char, homeserver: *const c_char) -> *mut c_char {
    catch_unwind(|| {
        let mxc = unsafe { required(mxc, "mxc") }.ok()?;
        let homeserver = unsafe { optional(homeserver, "homeserver") }.ok()?;
        mxreq_core::content_uri::mxc_to_http(mxc, homeserver)
    })
    .ok()
    .flatten()
    .map_or(std::ptr::null_mut(), into_c_string)
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiBuildResult` returned by any `mx_build_*` function,
/// including its request. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn mx_free_result(result: *mut FfiBuildResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let result = unsafe { Box::from_raw(result) };
        unsafe {
            free_c_string(result.error_message);
            FfiHttpRequest::free(result.request);
        }
    }));
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn mx_free_string(s: *mut c_char) {
    let _ = catch_unwind(AssertUnwindSafe(|| unsafe { free_c_string(s) }));
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
