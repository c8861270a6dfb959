//! Content repository: upload, download, thumbnails and content-URI conversion.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{finish, non_empty, Api};
use crate::content_uri::{self, EncryptionInfo};
use crate::diagnostics::Diagnostic;
use crate::http::{HttpMethod, HttpRequest};
use crate::path::{build_path, Query, MATRIX_LEGACY_MEDIA_API_PATH, MATRIX_MEDIA_API_PATH};
use crate::types::ResizingMethod;

static CONTENT_TYPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9!#$&^_.+-]*/[a-zA-Z0-9][a-zA-Z0-9!#$&^_.+-]* *(;.*=.*)?$")
        .expect("content type pattern is valid")
});

#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// Name the server should suggest in `Content-Disposition`.
    pub filename: Option<String>,
    /// Let the server fetch remote media it does not hold yet.
    pub allow_remote: bool,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            filename: None,
            allow_remote: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ThumbnailOptions {
    pub method: ResizingMethod,
    pub allow_remote: bool,
}

impl Default for ThumbnailOptions {
    fn default() -> Self {
        Self {
            method: ResizingMethod::Scale,
            allow_remote: true,
        }
    }
}

/// Whether `content_type` looks like `type/subtype[; param=value]`.
pub fn looks_like_content_type(content_type: &str) -> bool {
    CONTENT_TYPE.is_match(content_type)
}

impl Api {
    /// Upload limits and other content repository settings.
    pub fn build_content_repository_config(&self, access_token: &str) -> HttpRequest {
        let path = build_path(["config"], None, MATRIX_MEDIA_API_PATH);
        finish(HttpRequest::new(HttpMethod::Get, path).bearer(access_token))
    }

    /// Start an upload. The transport streams the file as the request body,
    /// so the descriptor itself carries none.
    ///
    /// A `content_type` that does not look like a MIME type is still used,
    /// but reported as a `SuspiciousContentType` diagnostic.
    pub fn build_upload(&self, access_token: &str, content_type: &str, filename: Option<&str>) -> HttpRequest {
        if !looks_like_content_type(content_type) {
            self.sink().emit(Diagnostic::SuspiciousContentType {
                content_type: content_type.to_string(),
            });
        }
        let query = Query::new().with_opt("filename", non_empty(filename));
        let path = build_path(["upload"], Some(&query), MATRIX_LEGACY_MEDIA_API_PATH);
        finish(
            HttpRequest::new(HttpMethod::Post, path)
                .bearer(access_token)
                .header("Content-Type", content_type),
        )
    }

    pub fn build_download(
        &self,
        server_name: &str,
        media_id: &str,
        opts: &DownloadOptions,
        access_token: Option<&str>,
    ) -> HttpRequest {
        let filename = opts.filename.as_deref().unwrap_or("");
        let query = Query::new().with("allow_remote", opts.allow_remote);
        let path = build_path(
            ["download", server_name, media_id, filename],
            Some(&query),
            MATRIX_MEDIA_API_PATH,
        );
        finish(HttpRequest::new(HttpMethod::Get, path).maybe_bearer(access_token))
    }

    pub fn build_thumbnail(
        &self,
        server_name: &str,
        media_id: &str,
        width: u32,
        height: u32,
        opts: &ThumbnailOptions,
        access_token: Option<&str>,
    ) -> HttpRequest {
        let query = Query::new()
            .with("width", width)
            .with("height", height)
            .with("method", opts.method.as_str())
            .with("allow_remote", opts.allow_remote);
        let path = build_path(["thumbnail", server_name, media_id], Some(&query), MATRIX_MEDIA_API_PATH);
        finish(HttpRequest::new(HttpMethod::Get, path).maybe_bearer(access_token))
    }

    /// HTTP URL for an `mxc://` URI, or `None` if it is not a valid one.
    ///
    /// With an access token the token lands in the URL's query string; this
    /// form is deprecated and reported as `DeprecatedTokenInUrl`.
    pub fn mxc_to_http(&self, mxc: &str, homeserver: Option<&str>, access_token: Option<&str>) -> Option<String> {
        match non_empty(access_token) {
            None => content_uri::mxc_to_http(mxc, homeserver),
            Some(token) => {
                let url = content_uri::mxc_to_http_with_token(mxc, homeserver, token)?;
                self.sink().emit(Diagnostic::DeprecatedTokenInUrl);
                Some(url)
            }
        }
    }

    /// `emxc://` URI carrying decryption parameters for an external plumber.
    /// See [`content_uri::encrypted_mxc_to_plumb`].
    pub fn encrypted_mxc_to_plumb(
        &self,
        mxc: &str,
        info: EncryptionInfo<'_>,
        homeserver: Option<&str>,
        mimetype: Option<&str>,
        access_token: Option<&str>,
    ) -> Option<String> {
        content_uri::encrypted_mxc_to_plumb(mxc, info, homeserver, mimetype, access_token)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::api::test_support::{assert_authed, TOKEN};
    use crate::diagnostics::MemorySink;

    fn capturing() -> (Api, MemorySink) {
        let sink = MemorySink::new();
        (Api::with_sink(Arc::new(sink.clone())), sink)
    }

    #[test]
    fn upload_uses_legacy_prefix_and_content_type_header() {
        let (api, sink) = capturing();
        let req = api.build_upload(TOKEN, "image/png", Some("cat picture.png"));
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "/_matrix/media/v3/upload?filename=cat+picture.png");
        assert_eq!(req.headers.get("Content-Type").map(String::as_str), Some("image/png"));
        assert!(req.body.is_none());
        assert_authed(&req);
        assert!(sink.diagnostics().is_empty());
    }

    #[test]
    fn suspicious_content_type_warns_but_builds() {
        let (api, sink) = capturing();
        let req = api.build_upload(TOKEN, "cat.png", None);
        assert_eq!(req.path, "/_matrix/media/v3/upload");
        assert_eq!(
            sink.diagnostics(),
            vec![Diagnostic::SuspiciousContentType { content_type: "cat.png".into() }]
        );
    }

    #[test]
    fn content_type_pattern() {
        assert!(looks_like_content_type("text/plain; charset=utf-8"));
        assert!(looks_like_content_type("application/vnd.api+json"));
        assert!(!looks_like_content_type("picture.jpg"));
        assert!(!looks_like_content_type("/plain"));
    }

    #[test]
    fn download_with_and_without_filename() {
        let api = Api::new();
        let bare = api.build_download("example.org", "abc", &DownloadOptions::default(), None);
        assert_eq!(bare.path, "/_matrix/client/v1/media/download/example.org/abc?allow_remote=true");
        assert!(bare.headers.is_empty());

        let opts = DownloadOptions {
            filename: Some("a b.txt".into()),
            allow_remote: false,
        };
        let named = api.build_download("example.org", "abc", &opts, Some(TOKEN));
        assert_eq!(
            named.path,
            "/_matrix/client/v1/media/download/example.org/abc/a%20b.txt?allow_remote=false"
        );
        assert_authed(&named);
    }

    #[test]
    fn thumbnail_query() {
        let opts = ThumbnailOptions {
            method: ResizingMethod::Crop,
            ..Default::default()
        };
        let req = Api::new().build_thumbnail("example.org", "abc", 64, 32, &opts, None);
        assert_eq!(
            req.path,
            "/_matrix/client/v1/media/thumbnail/example.org/abc?width=64&height=32&method=crop&allow_remote=true"
        );
    }

    #[test]
    fn repository_config_path() {
        let req = Api::new().build_content_repository_config(TOKEN);
        assert_eq!(req.path, "/_matrix/client/v1/media/config");
    }

    #[test]
    fn mxc_without_token_is_silent() {
        let (api, sink) = capturing();
        assert_eq!(
            api.mxc_to_http("mxc://example.org/abc123", None, None).as_deref(),
            Some("https://example.org/_matrix/client/v1/media/download/example.org/abc123")
        );
        assert!(api.mxc_to_http("https://example.org/abc123", None, None).is_none());
        assert!(sink.diagnostics().is_empty());
    }

    #[test]
    fn mxc_with_token_warns() {
        let (api, sink) = capturing();
        let url = api
            .mxc_to_http("mxc://example.org/abc123", Some("https://hs.example.org"), Some(TOKEN))
            .unwrap();
        assert_eq!(
            url,
            "https://hs.example.org/_matrix/client/v1/media/download/example.org/abc123?access_token=SECRET_TOKEN"
        );
        assert_eq!(sink.diagnostics(), vec![Diagnostic::DeprecatedTokenInUrl]);
    }

    #[test]
    fn invalid_mxc_with_token_is_silent() {
        let (api, sink) = capturing();
        assert!(api.mxc_to_http("https://example.org/abc", None, Some(TOKEN)).is_none());
        assert!(api.mxc_to_http("mxc://example.org/", None, Some(TOKEN)).is_none());
        assert!(sink.diagnostics().is_empty());
    }
}
