//! Response construction and augmentation.
//!
//! # Responsibilities
//! - Build language redirects
//! - Append a currency cookie without touching status or body
//!
//! # Design Decisions
//! - Redirects carry no body and a fixed one hour shared-cache lifetime
//! - Redirects are a pure function of the location: replays are identical

use axum::body::Body;
use axum::http::header::{CACHE_CONTROL, LOCATION, SET_COOKIE};
use axum::http::{HeaderValue, Response, StatusCode};
use url::Url;

/// `Cache-Control` value sent with every redirect.
pub const REDIRECT_CACHE_CONTROL: &str = "public, max-age=3600";

/// Build a `302 Found` pointing at `location`.
pub fn redirect(location: &Url) -> Option<Response<Body>> {
    let location = match HeaderValue::from_str(location.as_str()) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(location = %location, error = %e, "Redirect location is not a valid header");
            return None;
        }
    };

    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::FOUND;
    response.headers_mut().insert(LOCATION, location);
    response
        .headers_mut()
        .insert(CACHE_CONTROL, HeaderValue::from_static(REDIRECT_CACHE_CONTROL));
    Some(response)
}

/// Append a `Set-Cookie` header, keeping any the response already has.
pub fn append_cookie(response: &mut Response<Body>, cookie: HeaderValue) {
    response.headers_mut().append(SET_COOKIE, cookie);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_has_location_and_cache_control() {
        let url = Url::parse("https://example.com/de/shop").unwrap();
        let response = redirect(&url).unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[LOCATION], "https://example.com/de/shop");
        assert_eq!(response.headers()[CACHE_CONTROL], "public, max-age=3600");
    }

    #[test]
    fn append_keeps_existing_cookies() {
        let mut response = Response::new(Body::empty());
        response
            .headers_mut()
            .insert(SET_COOKIE, HeaderValue::from_static("sid=1"));
        append_cookie(&mut response, HeaderValue::from_static("woocs_curr=EUR"));

        let cookies: Vec<_> = response.headers().get_all(SET_COOKIE).iter().collect();
        assert_eq!(cookies.len(), 2);
        assert_eq!(response.status(), StatusCode::OK);
    }
}
