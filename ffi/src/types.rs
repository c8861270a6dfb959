//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of collections,
//! and enums with explicit discriminants. Conversion functions live here to
//! keep `lib.rs` focused on the `extern "C"` surface.

use std::ffi::CString;
use std::os::raw::c_char;

use mxreq_core::{ApiError, HttpMethod, HttpRequest};

/// Opaque handle to an `Api`. C callers receive a pointer to this and pass
/// it back into every `mx_build_*` function.
pub struct FfiApi {
    pub(crate) inner: mxreq_core::Api,
}

/// Move `s` onto the C heap. Strings with interior NULs become null.
pub(crate) fn into_c_string(s: String) -> *mut c_char {
    CString::new(s).map(CString::into_raw).unwrap_or(std::ptr::null_mut())
}

/// Reclaim a string produced by `into_c_string`. Null is ignored.
///
/// # Safety
/// `ptr` must come from `into_c_string` and not have been freed.
pub(crate) unsafe fn free_c_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(unsafe { CString::from_raw(ptr) });
    }
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
    Put = 2,
    Delete = 3,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
            HttpMethod::Put => FfiHttpMethod::Put,
            HttpMethod::Delete => FfiHttpMethod::Delete,
        }
    }
}

/// A single HTTP header as a name-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub name: *mut c_char,
    pub value: *mut c_char,
}

/// A request descriptor as C-compatible plain data.
///
/// `path` is relative to the homeserver origin and already percent-encoded.
/// `headers` is null when `headers_len` is zero; `body` is null when the
/// request has no body.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub path: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: HttpRequest) -> *mut Self {
        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .into_iter()
                .map(|(name, value)| FfiHeader {
                    name: into_c_string(name),
                    value: into_c_string(value),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            path: into_c_string(req.path),
            headers,
            headers_len,
            body: req.body.map_or(std::ptr::null_mut(), into_c_string),
        }))
    }

    /// Free a request produced by `from_core`, including every string it owns.
    ///
    /// # Safety
    /// `req` must come from `from_core` and not have been freed.
    pub(crate) unsafe fn free(req: *mut Self) {
        if req.is_null() {
            return;
        }
        let req = unsafe { Box::from_raw(req) };
        unsafe {
            free_c_string(req.path);
            free_c_string(req.body);
        }
        if !req.headers.is_null() && req.headers_len > 0 {
            let slice = std::ptr::slice_from_raw_parts_mut(req.headers, req.headers_len as usize);
            let headers = unsafe { Box::from_raw(slice) };
            for header in headers.iter() {
                unsafe {
                    free_c_string(header.name);
                    free_c_string(header.value);
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiBuildResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    MissingCredentials = 1,
    InvalidArgument = 2,
    Serialization = 3,
    InvalidJson = 4,
    InvalidUtf8 = 5,
    Panic = 6,
    NullArg = 7,
}

/// Why a build call did not produce a request.
#[derive(Debug)]
pub(crate) enum Failure {
    NullArg(&'static str),
    InvalidUtf8(&'static str),
    InvalidJson(String),
    Api(ApiError),
}

impl From<ApiError> for Failure {
    fn from(err: ApiError) -> Self {
        Failure::Api(err)
    }
}

/// Result envelope for every `mx_build_*` function.
///
/// On success `error_code` is `Ok`, `error_message` is null and `request`
/// points to the descriptor. On failure `request` is null and
/// `error_message` is a human-readable C string.
#[repr(C)]
pub struct FfiBuildResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub request: *mut FfiHttpRequest,
}

impl FfiBuildResult {
    pub(crate) fn ok(req: HttpRequest) -> *mut Self {
        Box::into_raw(Box::new(FfiBuildResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            request: FfiHttpRequest::from_core(req),
        }))
    }

    fn error(error_code: FfiErrorCode, msg: String) -> *mut Self {
        Box::into_raw(Box::new(FfiBuildResult {
            error_code,
            error_message: into_c_string(msg),
            request: std::ptr::null_mut(),
        }))
    }

    pub(crate) fn from_failure(failure: Failure) -> *mut Self {
        match failure {
            Failure::NullArg(name) => Self::error(FfiErrorCode::NullArg, format!("null argument: {name}")),
            Failure::InvalidUtf8(name) => {
                Self::error(FfiErrorCode::InvalidUtf8, format!("argument is not valid UTF-8: {name}"))
            }
            Failure::InvalidJson(msg) => Self::error(FfiErrorCode::InvalidJson, msg),
            Failure::Api(err) => {
                let code = match &err {
                    ApiError::MissingCredentials => FfiErrorCode::MissingCredentials,
                    ApiError::Serialization(_) => FfiErrorCode::Serialization,
                    ApiError::EmptyAuthDict
                    | ApiError::ConflictingPosition { .. }
                    | ApiError::PatternNotAllowed { .. }
                    | ApiError::ConditionsNotAllowed { .. }
                    | ApiError::InvalidDirection(_) => FfiErrorCode::InvalidArgument,
                };
                Self::error(code, err.to_string())
            }
        }
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::error(FfiErrorCode::Panic, msg.to_string())
    }
}
