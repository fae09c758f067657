//! Stored response snapshots.

use axum::body::{Body, Bytes};
use axum::http::header::{CACHE_CONTROL, SET_COOKIE, VARY};
use axum::http::{HeaderMap, Response, StatusCode};

/// A complete response held by a cache store.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl CachedResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// True if the response sets any cookie. Such responses are client
    /// specific and must not be shared through the cache.
    pub fn sets_cookies(&self) -> bool {
        self.headers.contains_key(SET_COOKIE)
    }

    /// Rebuild an HTTP response from the snapshot.
    pub fn to_response(&self) -> Response<Body> {
        let mut response = Response::new(Body::from(self.body.clone()));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers.clone();
        response
    }
}

/// Whether the origin allows a response to be replayed to other clients.
///
/// `Cache-Control: private`, `no-store` or `no-cache` forbid it, as does a
/// `Vary` of `*` or one naming `Cookie`.
pub fn is_shareable(headers: &HeaderMap) -> bool {
    let restricted = header_tokens(headers, CACHE_CONTROL).any(|directive| {
        let name = directive.split('=').next().unwrap_or_default().trim();
        ["private", "no-store", "no-cache"]
            .iter()
            .any(|d| name.eq_ignore_ascii_case(d))
    });
    let varies_per_client = header_tokens(headers, VARY)
        .any(|field| field == "*" || field.eq_ignore_ascii_case("cookie"));

    !restricted && !varies_per_client
}

fn header_tokens(
    headers: &HeaderMap,
    name: axum::http::HeaderName,
) -> impl Iterator<Item = &str> + '_ {
    headers
        .get_all(name)
        .into_iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::LOCATION;
    use axum::http::HeaderValue;

    #[test]
    fn rebuilds_status_headers_and_body() {
        let mut headers = HeaderMap::new();
        headers.insert(LOCATION, HeaderValue::from_static("https://example.com/de/"));
        let cached = CachedResponse::new(StatusCode::FOUND, headers, Bytes::new());

        let response = cached.to_response();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[LOCATION], "https://example.com/de/");
        assert!(!cached.sets_cookies());
    }

    #[test]
    fn detects_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(SET_COOKIE, HeaderValue::from_static("sid=1"));
        let cached = CachedResponse::new(StatusCode::OK, headers, Bytes::from_static(b"hi"));
        assert!(cached.sets_cookies());
    }

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.append(*k, HeaderValue::from_static(*v));
        }
        map
    }

    #[test]
    fn private_and_uncacheable_directives_are_not_shareable() {
        for value in ["private", "no-store", "public, No-Cache", "private=\"set-cookie\", max-age=60"] {
            assert!(!is_shareable(&headers(&[("cache-control", value)])), "{value}");
        }
    }

    #[test]
    fn per_client_vary_is_not_shareable() {
        assert!(!is_shareable(&headers(&[("vary", "*")])));
        assert!(!is_shareable(&headers(&[("vary", "Accept-Encoding"), ("vary", "Cookie")])));
    }

    #[test]
    fn public_responses_are_shareable() {
        assert!(is_shareable(&HeaderMap::new()));
        assert!(is_shareable(&headers(&[
            ("cache-control", "public, max-age=60"),
            ("vary", "Accept-Encoding"),
        ])));
    }
}
