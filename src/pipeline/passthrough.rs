//! Not-found probing for out-of-scope requests.
//!
//! With `always_on_not_found`, an out-of-scope request is first sent to the
//! origin. A 404 promotes it into the language pipeline; anything else is
//! the answer. A transport failure fails open: the original request is
//! forwarded again and that result returned as-is.

use axum::body::Body;
use axum::http::request::Parts;
use axum::http::{Request, Response, StatusCode};

use crate::http::origin::{Origin, OriginError};

/// Outcome of a trial fetch.
#[derive(Debug)]
pub enum ProbeOutcome {
    /// The origin answered 404; the response is kept in case the
    /// promoted request still ends up passing through.
    Promoted(Response<Body>),
    /// The origin answered something else; return it untouched.
    Answered(Response<Body>),
    /// The trial could not be completed.
    Failed(OriginError),
}

/// Send the trial request and classify the answer.
pub async fn probe(origin: &dyn Origin, parts: &Parts) -> ProbeOutcome {
    match origin.fetch(origin_request(parts)).await {
        Ok(response) if response.status() == StatusCode::NOT_FOUND => {
            ProbeOutcome::Promoted(response)
        }
        Ok(response) => ProbeOutcome::Answered(response),
        Err(e) => ProbeOutcome::Failed(e),
    }
}

/// Copy of a read-only request suitable for sending to the origin.
///
/// GET and HEAD are forwarded without a body so the same request can be
/// sent more than once.
pub fn origin_request(parts: &Parts) -> Request<Body> {
    let mut request = Request::new(Body::empty());
    *request.method_mut() = parts.method.clone();
    *request.uri_mut() = parts.uri.clone();
    *request.version_mut() = parts.version;
    *request.headers_mut() = parts.headers.clone();
    request
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::http::Method;

    struct Fixed(Option<StatusCode>);

    #[async_trait]
    impl Origin for Fixed {
        async fn fetch(&self, request: Request<Body>) -> Result<Response<Body>, OriginError> {
            assert_eq!(request.method(), Method::GET);
            match self.0 {
                Some(status) => {
                    let mut response = Response::new(Body::empty());
                    *response.status_mut() = status;
                    Ok(response)
                }
                None => Err(OriginError::Transport("connection refused".into())),
            }
        }
    }

    fn parts() -> Parts {
        Request::builder()
            .uri("/blog")
            .header("host", "example.com")
            .body(Body::empty())
            .unwrap()
            .into_parts()
            .0
    }

    #[tokio::test]
    async fn not_found_promotes() {
        let outcome = probe(&Fixed(Some(StatusCode::NOT_FOUND)), &parts()).await;
        assert!(matches!(outcome, ProbeOutcome::Promoted(r) if r.status() == StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn other_statuses_are_answers() {
        for status in [StatusCode::OK, StatusCode::INTERNAL_SERVER_ERROR, StatusCode::GONE] {
            let outcome = probe(&Fixed(Some(status)), &parts()).await;
            assert!(matches!(outcome, ProbeOutcome::Answered(r) if r.status() == status));
        }
    }

    #[tokio::test]
    async fn transport_error_is_failure() {
        let outcome = probe(&Fixed(None), &parts()).await;
        assert!(matches!(outcome, ProbeOutcome::Failed(OriginError::Transport(_))));
    }

    #[test]
    fn origin_request_copies_head() {
        let p = parts();
        let request = origin_request(&p);
        assert_eq!(request.uri().path(), "/blog");
        assert_eq!(request.headers()["host"], "example.com");
    }
}
