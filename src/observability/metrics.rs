//! Metrics collection and exposition.
//!
//! # Metrics
//! - `lang_redirect_requests_total` (counter): requests by outcome, status
//! - `lang_redirect_request_duration_seconds` (histogram): latency by outcome
//! - `lang_redirect_cache_total` (counter): cache hits, misses and failures
//! - `lang_redirect_cache_entries` (gauge): entries held by the memory store
//! - `lang_redirect_origin_errors_total` (counter): origin failures by stage
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - Labels are static strings; no per-path cardinality

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one answered request.
pub fn record_request(outcome: &'static str, status: u16, start: Instant) {
    ::metrics::counter!(
        "lang_redirect_requests_total",
        "outcome" => outcome,
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!("lang_redirect_request_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_cache_event(result: &'static str) {
    ::metrics::counter!("lang_redirect_cache_total", "result" => result).increment(1);
}

pub fn record_cache_size(entries: usize) {
    ::metrics::gauge!("lang_redirect_cache_entries").set(entries as f64);
}

pub fn record_origin_error(stage: &'static str) {
    ::metrics::counter!("lang_redirect_origin_errors_total", "stage" => stage).increment(1);
}
