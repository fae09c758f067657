//! Request inspection helpers.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4)
//! - Reconstruct the public URL the client asked for
//! - Build the language-prefixed redirect target
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - `X-Forwarded-Proto` wins over the URI scheme, which wins over config
//! - A request without a usable host is never redirected

use axum::http::header::HOST;
use axum::http::request::Parts;
use axum::http::{HeaderName, HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use url::Url;
use uuid::Uuid;

use crate::language::LanguageTag;

/// Header carrying the request ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");

/// Generates UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// The request ID assigned to a request, or "unknown".
pub fn request_id(parts: &Parts) -> &str {
    parts
        .headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Rebuild the URL the client requested.
pub fn public_url(parts: &Parts, fallback_scheme: &str) -> Option<Url> {
    let forwarded = parts
        .headers
        .get(X_FORWARDED_PROTO)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|s| s.eq_ignore_ascii_case("http") || s.eq_ignore_ascii_case("https"));
    let scheme = forwarded
        .or_else(|| parts.uri.scheme_str())
        .unwrap_or(fallback_scheme);

    let host = parts
        .headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| parts.uri.authority().map(|a| a.as_str()))?;

    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    Url::parse(&format!("{scheme}://{host}{path_and_query}")).ok()
}

/// Insert `/{language}` as the first path segment, keeping the query.
pub fn prefixed_location(url: &Url, language: &LanguageTag) -> Url {
    let mut location = url.clone();
    let path = format!("/{}{}", language, url.path());
    location.set_path(&path);
    location
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn parts(uri: &str, headers: &[(&'static str, &'static str)]) -> Parts {
        let mut builder = Request::builder().uri(uri);
        for (k, v) in headers {
            builder = builder.header(*k, *v);
        }
        builder.body(Body::empty()).unwrap().into_parts().0
    }

    #[test]
    fn url_uses_host_header_and_fallback_scheme() {
        let p = parts("/shop?page=2", &[("host", "Example.COM")]);
        let url = public_url(&p, "https").unwrap();
        assert_eq!(url.as_str(), "https://example.com/shop?page=2");
    }

    #[test]
    fn forwarded_proto_overrides_fallback() {
        let p = parts("/", &[("host", "example.com"), ("x-forwarded-proto", "http, https")]);
        assert_eq!(public_url(&p, "https").unwrap().scheme(), "http");
    }

    #[test]
    fn absolute_uri_supplies_scheme_and_host() {
        let p = parts("http://example.com:8080/a", &[]);
        let url = public_url(&p, "https").unwrap();
        assert_eq!(url.as_str(), "http://example.com:8080/a");
    }

    #[test]
    fn missing_host_yields_none() {
        let p = parts("/a", &[]);
        assert!(public_url(&p, "https").is_none());
    }

    #[test]
    fn location_prefixes_path_and_keeps_query() {
        let url = Url::parse("https://example.com/shop/shoes?color=red").unwrap();
        let location = prefixed_location(&url, &LanguageTag::new("de"));
        assert_eq!(location.as_str(), "https://example.com/de/shop/shoes?color=red");

        let root = Url::parse("https://example.com/").unwrap();
        assert_eq!(
            prefixed_location(&root, &LanguageTag::new("fr")).as_str(),
            "https://example.com/fr/"
        );
    }
}
