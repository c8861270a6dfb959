//! Matrix content URIs (`mxc://<server>/<media id>`) and their HTTP forms.
//!
//! # Design
//! Conversion never fails loudly: a URI with the wrong scheme, no server or
//! no media id simply has no HTTP form and yields `None`. The builders that
//! need an `Api` (because they emit diagnostics) live in `api::media` and
//! delegate here.

use url::Url;

use crate::path::{build_path, Query, MATRIX_LEGACY_MEDIA_API_PATH, MATRIX_MEDIA_API_PATH};

/// A parsed content URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentUri {
    pub scheme: String,
    /// Lowercased host, used as the `serverName` path segment.
    pub server_name: String,
    /// Host and optional port as written, used to derive an origin.
    pub authority: String,
    pub media_id: String,
}

impl ContentUri {
    /// Parse any `scheme://server/media` URI. Both the server and the media
    /// id must be non-empty.
    ///
    /// `Url` only validates the URI and yields the lowercased host. The
    /// authority and media id are taken from the input text as written, so
    /// dot segments and unescaped characters survive untouched.
    pub fn parse(uri: &str) -> Option<Self> {
        let url = Url::parse(uri).ok()?;
        let server_name = url.host_str().filter(|h| !h.is_empty())?.to_ascii_lowercase();

        let (_, rest) = uri.split_once("://")?;
        let rest = rest.split(['?', '#']).next().unwrap_or(rest);
        let (authority, media_id) = rest.split_once('/')?;
        if media_id.is_empty() {
            return None;
        }
        Some(Self {
            scheme: url.scheme().to_string(),
            server_name,
            authority: authority.to_string(),
            media_id: media_id.to_string(),
        })
    }

    /// Parse and require the `mxc` scheme.
    pub fn parse_mxc(uri: &str) -> Option<Self> {
        Self::parse(uri).filter(|c| c.scheme == "mxc")
    }

    fn origin(&self, homeserver: Option<&str>, scheme: &str) -> String {
        match homeserver {
            Some(hs) => hs.trim_end_matches('/').to_string(),
            None => format!("{scheme}://{}", self.authority),
        }
    }
}

/// Unauthenticated download URL for an `mxc://` URI.
pub fn mxc_to_http(mxc: &str, homeserver: Option<&str>) -> Option<String> {
    let uri = ContentUri::parse_mxc(mxc)?;
    Some(format!(
        "{}{MATRIX_MEDIA_API_PATH}/download/{}/{}",
        uri.origin(homeserver, "https"),
        uri.server_name,
        uri.media_id
    ))
}

/// Download URL carrying `access_token` in its query string.
///
/// Prefer an authenticated `download` request; `Api::mxc_to_http` emits a
/// diagnostic whenever this form is produced.
pub fn mxc_to_http_with_token(mxc: &str, homeserver: Option<&str>, access_token: &str) -> Option<String> {
    let uri = ContentUri::parse_mxc(mxc)?;
    let query = Query::new().with("access_token", access_token);
    Some(format!(
        "{}{}",
        uri.origin(homeserver, "https"),
        build_path(
            ["download", uri.server_name.as_str(), uri.media_id.as_str()],
            Some(&query),
            MATRIX_MEDIA_API_PATH
        )
    ))
}

/// Decryption material for an encrypted attachment.
#[derive(Debug, Clone, Copy)]
pub struct EncryptionInfo<'a> {
    pub key: &'a str,
    pub hash: &'a str,
    pub iv: &'a str,
}

/// Rewrite an `mxc://` URI into an `emxc://` URI for an external plumber
/// program, with the decryption parameters in the query string.
///
/// The result must never be turned back into an HTTP URL and fetched
/// directly; that would hand the key to every intermediary. Provisional:
/// the `emxc` scheme has no settled definition upstream.
pub fn encrypted_mxc_to_plumb(
    mxc: &str,
    info: EncryptionInfo<'_>,
    homeserver: Option<&str>,
    mimetype: Option<&str>,
    access_token: Option<&str>,
) -> Option<String> {
    let uri = ContentUri::parse_mxc(mxc)?;
    let host = match homeserver {
        Some(hs) => {
            let hs = hs.trim_end_matches('/');
            match hs.split_once("://") {
                Some((_, rest)) => format!("emxc://{rest}"),
                None => format!("emxc://{hs}"),
            }
        }
        None => format!("emxc://{}", uri.authority),
    };
    let prefix = match access_token {
        Some(_) => MATRIX_MEDIA_API_PATH,
        None => MATRIX_LEGACY_MEDIA_API_PATH,
    };
    let query = Query::new()
        .with("key", info.key)
        .with("hash", info.hash)
        .with("iv", info.iv)
        .with_opt("mimetype", mimetype)
        .with_opt("access_token", access_token.filter(|t| !t.is_empty()));

    Some(format!(
        "{host}{prefix}/download/{}/{}?{}",
        uri.server_name,
        uri.media_id,
        query.encode()
    ))
}

/// Message type for a file of the given MIME type.
pub fn mimetype_to_msgtype(mimetype: &str) -> &'static str {
    if mimetype.starts_with("image/") {
        "m.image"
    } else if mimetype.starts_with("video/") {
        "m.video"
    } else if mimetype.starts_with("audio/") {
        "m.audio"
    } else {
        "m.file"
    }
}
