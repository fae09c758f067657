//! Per-request decision pipeline.
//!
//! # Data Flow
//! ```text
//! request
//!     → bypass guards ─────────────────────────────→ origin, untouched
//!     → negotiate language, resolve currency
//!     → cache lookup (url + language) ── hit ──────→ cached copy (+ fresh cookie)
//!     → scope guards
//!         Forward          → origin
//!         ProbeThenDecide  → trial fetch: 404 → promoted, else untouched
//!     → language guards
//!         Forward          → origin (or the trial 404 when promoted)
//!         Redirect         → 302
//!     → cache store (redirects; cookie-bearing passthroughs)
//!     → currency cookie appended
//! ```

use std::sync::Arc;
use std::time::Instant;

use axum::body::{Body, Bytes};
use axum::http::header::{CONTENT_LENGTH, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::{Method, Request, Response, StatusCode};
use url::Url;

use crate::cache::{cache_key, is_shareable, CachedResponse, RedirectCache};
use crate::config::validation::ValidationError;
use crate::config::ProxyConfig;
use crate::currency::{CurrencyResolution, CurrencyResolver};
use crate::http::origin::Origin;
use crate::http::request::{prefixed_location, public_url, request_id};
use crate::http::response::{append_cookie, redirect};
use crate::language::NegotiationResult;
use crate::observability::metrics;
use crate::pipeline::decision::{DecisionTable, Verdict};
use crate::pipeline::passthrough::{origin_request, probe, ProbeOutcome};

/// What the pipeline produced before cookie augmentation.
enum Outcome {
    /// Returned exactly as the origin sent it.
    Untouched(Response<Body>),
    /// Origin response that may carry a currency cookie.
    Passthrough(Response<Body>),
    /// Language redirect.
    Redirect(Response<Body>),
}

/// Composes guards, negotiation, probing, caching and currency.
pub struct Orchestrator {
    table: DecisionTable,
    public_scheme: String,
    origin: Arc<dyn Origin>,
    cache: RedirectCache,
    currency: Option<CurrencyResolver>,
}

impl Orchestrator {
    pub fn new(
        config: &ProxyConfig,
        origin: Arc<dyn Origin>,
        cache: RedirectCache,
    ) -> Result<Self, ValidationError> {
        let currency = config
            .currency
            .enabled
            .then(|| CurrencyResolver::from_config(&config.currency));

        Ok(Self {
            table: DecisionTable::from_config(config)?,
            public_scheme: config.redirect.public_scheme.clone(),
            origin,
            cache,
            currency,
        })
    }

    /// Answer one request.
    pub async fn handle(&self, request: Request<Body>) -> Response<Body> {
        let start_time = Instant::now();
        let (parts, body) = request.into_parts();
        let request_id = request_id(&parts).to_string();

        if let Some(verdict) = self.table.bypass(&parts) {
            tracing::debug!(
                request_id = %request_id,
                method = %parts.method,
                path = %parts.uri.path(),
                verdict = verdict.label(),
                "Bypassing"
            );
            let response = self.forward(Request::from_parts(parts, body), "bypass").await;
            metrics::record_request(verdict.label(), response.status().as_u16(), start_time);
            return response;
        }

        let negotiation = self.table.negotiate(&parts);
        let currency = self.currency.as_ref().map(|c| c.resolve(&parts.headers));
        let url = public_url(&parts, &self.public_scheme);
        let key = url.as_ref().map(|u| cache_key(u, &negotiation.language));

        if let Some(key) = &key {
            if let Some(hit) = self.cache.lookup(key).await {
                let mut response = hit.to_response();
                self.augment(&mut response, currency.as_ref());
                metrics::record_request("cache_hit", response.status().as_u16(), start_time);
                return response;
            }
        }

        let (label, outcome) = self
            .decide(&parts, &negotiation, url.as_ref(), &request_id)
            .await;

        let mut response = match outcome {
            Outcome::Untouched(response) => response,
            Outcome::Redirect(mut response) => {
                if let Some(key) = key {
                    self.cache.store(key, snapshot_head(&response, Bytes::new()));
                }
                self.augment(&mut response, currency.as_ref());
                response
            }
            Outcome::Passthrough(response) => {
                let fresh_cookie = currency.as_ref().is_some_and(|c| c.should_set);
                let mut response = match key {
                    Some(key) if fresh_cookie && self.is_cacheable(&parts, &response) => {
                        self.buffer_and_store(key, response, &request_id).await
                    }
                    _ => response,
                };
                self.augment(&mut response, currency.as_ref());
                response
            }
        };

        tracing::debug!(
            request_id = %request_id,
            path = %parts.uri.path(),
            outcome = label,
            status = %response.status(),
            "Request decided"
        );
        metrics::record_request(label, response.status().as_u16(), start_time);
        response
    }

    async fn decide(
        &self,
        parts: &Parts,
        negotiation: &NegotiationResult,
        url: Option<&Url>,
        request_id: &str,
    ) -> (&'static str, Outcome) {
        let mut trial = None;

        match self.table.scope(parts) {
            None => {}
            Some(Verdict::ProbeThenDecide) => match probe(self.origin.as_ref(), parts).await {
                ProbeOutcome::Promoted(response) => {
                    tracing::debug!(request_id = %request_id, path = %parts.uri.path(), "Origin 404, promoting");
                    trial = Some(response);
                }
                ProbeOutcome::Answered(response) => return ("probe_answered", Outcome::Untouched(response)),
                ProbeOutcome::Failed(e) => {
                    tracing::warn!(request_id = %request_id, error = %e, "Origin probe failed, passing through");
                    metrics::record_origin_error("probe");
                    let response = self.forward(origin_request(parts), "passthrough").await;
                    return ("probe_failed", Outcome::Untouched(response));
                }
            },
            Some(verdict) => {
                let response = self.forward(origin_request(parts), "passthrough").await;
                return (verdict.label(), Outcome::Passthrough(response));
            }
        }

        let verdict = self.table.language(negotiation);
        let label = match &verdict {
            Verdict::Redirect(language) => {
                let location = url.map(|u| prefixed_location(u, language));
                if let Some(response) = location.as_ref().and_then(redirect) {
                    return (verdict.label(), Outcome::Redirect(response));
                }
                tracing::warn!(request_id = %request_id, "No usable public URL, passing through");
                "no_public_url"
            }
            other => other.label(),
        };

        let response = match trial {
            Some(response) => response,
            None => self.forward(origin_request(parts), "passthrough").await,
        };
        (label, Outcome::Passthrough(response))
    }

    /// Forward to the origin. Only a complete failure yields a 502.
    async fn forward(&self, request: Request<Body>, stage: &'static str) -> Response<Body> {
        match self.origin.fetch(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, stage, "Origin error");
                metrics::record_origin_error(stage);
                let mut response = Response::new(Body::from("Upstream request failed"));
                *response.status_mut() = StatusCode::BAD_GATEWAY;
                response
            }
        }
    }

    fn augment(&self, response: &mut Response<Body>, currency: Option<&CurrencyResolution>) {
        let (Some(resolver), Some(resolution)) = (&self.currency, currency) else {
            return;
        };
        if !resolution.should_set {
            return;
        }
        if let Some(cookie) = resolver.set_cookie_header(&resolution.code) {
            append_cookie(response, cookie);
        }
    }

    // Only complete, shareable, successful GET bodies of known small size.
    fn is_cacheable(&self, parts: &Parts, response: &Response<Body>) -> bool {
        if !self.cache.is_enabled()
            || parts.method != Method::GET
            || !response.status().is_success()
            || response.headers().contains_key(SET_COOKIE)
            || !is_shareable(response.headers())
        {
            return false;
        }
        response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<usize>().ok())
            .is_some_and(|len| len <= self.cache.max_body_bytes())
    }

    async fn buffer_and_store(
        &self,
        key: String,
        response: Response<Body>,
        request_id: &str,
    ) -> Response<Body> {
        let (parts, body) = response.into_parts();
        match axum::body::to_bytes(body, self.cache.max_body_bytes()).await {
            Ok(bytes) => {
                let response = Response::from_parts(parts, Body::from(bytes.clone()));
                self.cache.store(key, snapshot_head(&response, bytes));
                response
            }
            Err(e) => {
                tracing::warn!(request_id = %request_id, error = %e, "Origin body could not be read");
                metrics::record_origin_error("body");
                Response::from_parts(parts, Body::empty())
            }
        }
    }
}

fn snapshot_head(response: &Response<Body>, body: Bytes) -> CachedResponse {
    CachedResponse::new(response.status(), response.headers().clone(), body)
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("table", &self.table)
            .field("cache", &self.cache)
            .field("currency", &self.currency)
            .finish()
    }
}
