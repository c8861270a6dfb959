//! Percent-encoded path and query construction.
//!
//! # Design
//! Matrix identifiers legitimately contain `/`, `:`, `#`, `!` and `@`, so
//! each path segment is encoded on its own with every byte escaped except
//! ASCII alphanumerics and `-._~`. A slash inside a room alias becomes
//! `%2F` instead of a new segment.
//!
//! Query strings use form encoding (space as `+`) over the same safe set and
//! keep insertion order, so the same arguments always produce the same
//! bytes. `Query` never sees absent values: callers use `with_opt` and
//! friends, which skip `None` rather than serializing it.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Client-server API, unstable-to-stable v1 endpoints (threads, relations, hierarchy).
pub const MATRIX_API_PATH_V1: &str = "/_matrix/client/v1";
/// Client-server API, v3 endpoints. The default prefix.
pub const MATRIX_API_PATH_V3: &str = "/_matrix/client/v3";
/// Authenticated media endpoints.
pub const MATRIX_MEDIA_API_PATH: &str = "/_matrix/client/v1/media";
/// Legacy media endpoints, still used for uploads.
pub const MATRIX_LEGACY_MEDIA_API_PATH: &str = "/_matrix/media/v3";

const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encode a single path segment, including any `/` it contains.
pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, COMPONENT).to_string()
}

/// Form-encode a query key or value.
pub fn encode_query_component(component: &str) -> String {
    // A literal '%' is escaped to "%25" first, so every "%20" left is a space.
    utf8_percent_encode(component, COMPONENT)
        .to_string()
        .replace("%20", "+")
}

/// Scalar values accepted as query parameters.
pub trait QueryValue {
    fn to_query_value(&self) -> String;
}

impl QueryValue for str {
    fn to_query_value(&self) -> String {
        self.to_string()
    }
}

impl QueryValue for String {
    fn to_query_value(&self) -> String {
        self.clone()
    }
}

impl QueryValue for bool {
    fn to_query_value(&self) -> String {
        let v = if *self { "true" } else { "false" };
        v.to_string()
    }
}

macro_rules! integer_query_value {
    ($($t:ty),*) => {
        $(impl QueryValue for $t {
            fn to_query_value(&self) -> String {
                self.to_string()
            }
        })*
    };
}

integer_query_value!(u8, u16, u32, u64, usize, i32, i64);

impl<T: QueryValue + ?Sized> QueryValue for &T {
    fn to_query_value(&self) -> String {
        (**self).to_query_value()
    }
}

/// Ordered query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `key=value`, replacing an earlier value for the same key in place.
    pub fn with<V: QueryValue>(mut self, key: &str, value: V) -> Self {
        self.insert(key, value.to_query_value());
        self
    }

    /// Add `key=value` only when `value` is present.
    pub fn with_opt<V: QueryValue>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.with(key, v),
            None => self,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Render as `k=v&k2=v2` without the leading `?`.
    pub fn encode(&self) -> String {
        self.pairs
            .iter()
            .map(|(k, v)| format!("{}={}", encode_query_component(k), encode_query_component(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    fn insert(&mut self, key: &str, value: String) {
        match self.pairs.iter_mut().find(|(k, _)| k == key) {
            Some(pair) => pair.1 = value,
            None => self.pairs.push((key.to_string(), value)),
        }
    }
}

/// Build `<base_path>/<seg>/<seg>...[?query]`.
///
/// Each segment is encoded independently. A single trailing `/` left by an
/// empty final segment (for example an empty state key) is dropped.
pub fn build_path<I, S>(segments: I, query: Option<&Query>, base_path: &str) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let encoded: Vec<String> = segments
        .into_iter()
        .map(|s| encode_segment(s.as_ref()))
        .collect();

    let mut path = format!("{base_path}/{}", encoded.join("/"));
    if path.ends_with('/') {
        path.pop();
    }

    if let Some(query) = query.filter(|q| !q.is_empty()) {
        path.push('?');
        path.push_str(&query.encode());
    }
    path
}

/// [`build_path`] with the default v3 client prefix.
pub fn build_client_path<I, S>(segments: I, query: Option<&Query>) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    build_path(segments, query, MATRIX_API_PATH_V3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use percent_encoding::percent_decode_str;

    #[test]
    fn joins_segments_and_query() {
        let query = Query::new().with("x", 1u32);
        assert_eq!(
            build_client_path(["a", "b"], Some(&query)),
            "/_matrix/client/v3/a/b?x=1"
        );
    }

    #[test]
    fn reserved_characters_stay_inside_their_segment() {
        let segments = ["rooms", "!abc:example.org", "#a/b c@d", "state"];
        let path = build_client_path(segments, None);
        let tail = path.strip_prefix("/_matrix/client/v3/").unwrap();

        let decoded: Vec<String> = tail
            .split('/')
            .map(|s| percent_decode_str(s).decode_utf8().unwrap().into_owned())
            .collect();
        assert_eq!(decoded, segments);
    }

    #[test]
    fn irregular_user_id_is_fully_escaped() {
        assert_eq!(
            encode_segment("@a-z0-9._=-/:example.com"),
            "%40a-z0-9._%3D-%2F%3Aexample.com"
        );
    }

    #[test]
    fn empty_trailing_segment_is_stripped_once() {
        let path = build_client_path(["rooms", "!r:x", "state", "m.room.name", ""], None);
        assert_eq!(path, "/_matrix/client/v3/rooms/%21r%3Ax/state/m.room.name");
    }

    #[test]
    fn empty_base_path() {
        assert_eq!(
            build_path([".well-known", "matrix", "client"], None, ""),
            "/.well-known/matrix/client"
        );
    }

    #[test]
    fn empty_query_adds_no_question_mark() {
        let query = Query::new();
        assert_eq!(build_client_path(["login"], Some(&query)), "/_matrix/client/v3/login");
    }

    #[test]
    fn query_values_are_form_encoded() {
        let query = Query::new()
            .with("filter", r#"{"room":{"timeline":{"limit":1}}}"#)
            .with("term", "a b&c")
            .with("full_state", true);
        assert_eq!(
            query.encode(),
            "filter=%7B%22room%22%3A%7B%22timeline%22%3A%7B%22limit%22%3A1%7D%7D%7D&term=a+b%26c&full_state=true"
        );
    }

    #[test]
    fn absent_values_are_skipped() {
        let query = Query::new()
            .with_opt("since", None::<&str>)
            .with_opt("limit", Some(5u32));
        assert_eq!(query.encode(), "limit=5");
        assert_eq!(query.len(), 1);
    }

    #[test]
    fn repeated_key_keeps_first_position() {
        let query = Query::new().with("a", "1").with("b", "2").with("a", "3");
        assert_eq!(query.encode(), "a=3&b=2");
    }

    #[test]
    fn literal_percent_twenty_survives() {
        assert_eq!(encode_query_component("%20"), "%2520");
    }
}
