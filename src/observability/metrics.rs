//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_requests_total` (counter): chat requests by outcome
//! - `relay_request_duration_seconds` (histogram): chat latency by outcome
//! - `relay_upstream_attempts_total` (counter): upstream attempts by result
//!
//! Recording is a no-op until a recorder is installed by `init_metrics`.

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

/// Record a completed chat request.
pub fn record_chat(outcome: &'static str, start: Instant) {
    metrics::counter!("relay_requests_total", "outcome" => outcome).increment(1);
    metrics::histogram!("relay_request_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

/// Record one upstream attempt.
pub fn record_upstream_attempt(result: &'static str) {
    metrics::counter!("relay_upstream_attempts_total", "result" => result).increment(1);
}
