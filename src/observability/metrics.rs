//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define request metrics (count, latency, business outcome)
//! - Expose Prometheus-compatible metrics endpoint
//! - Track context pool occupancy
//!
//! # Metrics
//! - `http_requests_total` (counter): requests by method, status, bcode
//! - `http_request_duration_seconds` (histogram): dispatch latency by method
//! - `http_context_pool_idle` (gauge): contexts waiting for reuse
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade and is a no-op until an
//!   exporter is installed, so tests need no setup
//! - The business code is a label because HTTP status alone is almost
//!   always 200 for envelope responses

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

pub const REQUESTS_TOTAL: &str = "http_requests_total";
pub const REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";
pub const CONTEXT_POOL_IDLE: &str = "http_context_pool_idle";

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "metrics exporter listening"),
        Err(error) => tracing::error!(%error, address = %addr, "failed to install metrics exporter"),
    }
}

/// Record one dispatched request.
pub fn record_request(method: &str, status: u16, bcode: &str, start: Instant) {
    metrics::counter!(
        REQUESTS_TOTAL,
        "method" => method.to_string(),
        "status" => status.to_string(),
        "bcode" => bcode.to_string()
    )
    .increment(1);
    metrics::histogram!(REQUEST_DURATION_SECONDS, "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_pool_idle(idle: usize) {
    metrics::gauge!(CONTEXT_POOL_IDLE).set(idle as f64);
}
