//! Origin fetch primitive.
//!
//! # Responsibilities
//! - Forward a request to the origin and return its response
//! - Rewrite the URI to the origin authority, keeping the client's Host
//! - Bound every fetch with the configured origin timeout
//!
//! # Design Decisions
//! - No retries: a failed probe fails open, a failed passthrough is a 502
//! - Dropping the returned future abandons the in-flight call, so a client
//!   disconnect cancels origin work
//! - Origin connections are plain HTTP/1.1

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::HOST;
use axum::http::uri::{Authority, PathAndQuery, Scheme};
use axum::http::{HeaderValue, Request, Response, Uri, Version};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;

/// Errors from a single origin fetch.
#[derive(Debug, Error)]
pub enum OriginError {
    #[error("invalid origin address {0:?}")]
    Address(String),

    #[error("could not build origin request: {0}")]
    Request(String),

    #[error("origin request failed: {0}")]
    Transport(String),

    #[error("origin did not answer within {0:?}")]
    Timeout(Duration),
}

/// Something that can answer a request on behalf of the website.
#[async_trait]
pub trait Origin: Send + Sync {
    async fn fetch(&self, request: Request<Body>) -> Result<Response<Body>, OriginError>;
}

/// Origin reached over HTTP with a pooled hyper client.
#[derive(Clone)]
pub struct HyperOrigin {
    client: Client<HttpConnector, Body>,
    authority: Authority,
    timeout: Duration,
}

impl HyperOrigin {
    pub fn new(address: &str, timeout: Duration) -> Result<Self, OriginError> {
        let authority =
            Authority::from_str(address).map_err(|_| OriginError::Address(address.to_string()))?;
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        Ok(Self {
            client,
            authority,
            timeout,
        })
    }
}

#[async_trait]
impl Origin for HyperOrigin {
    async fn fetch(&self, request: Request<Body>) -> Result<Response<Body>, OriginError> {
        let (mut parts, body) = request.into_parts();

        // HTTP/2 clients send the host as :authority only.
        if !parts.headers.contains_key(HOST) {
            if let Some(authority) = parts.uri.authority() {
                if let Ok(host) = HeaderValue::from_str(authority.as_str()) {
                    parts.headers.insert(HOST, host);
                }
            }
        }

        let mut uri_parts = parts.uri.clone().into_parts();
        uri_parts.scheme = Some(Scheme::HTTP);
        uri_parts.authority = Some(self.authority.clone());
        if uri_parts.path_and_query.is_none() {
            uri_parts.path_and_query = Some(PathAndQuery::from_static("/"));
        }
        parts.uri = Uri::from_parts(uri_parts).map_err(|e| OriginError::Request(e.to_string()))?;
        parts.version = Version::HTTP_11;

        let request = Request::from_parts(parts, body);
        match tokio::time::timeout(self.timeout, self.client.request(request)).await {
            Ok(Ok(response)) => {
                let (parts, body) = response.into_parts();
                Ok(Response::from_parts(parts, Body::new(body)))
            }
            Ok(Err(e)) => Err(OriginError::Transport(e.to_string())),
            Err(_) => Err(OriginError::Timeout(self.timeout)),
        }
    }
}

impl std::fmt::Debug for HyperOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperOrigin")
            .field("authority", &self.authority)
            .field("timeout", &self.timeout)
            .finish()
    }
}
