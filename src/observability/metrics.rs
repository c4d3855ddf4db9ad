//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gate_requests_total` (counter): proxied requests by method, status, replica
//! - `gate_request_duration_seconds` (histogram): latency distribution
//! - `gate_guard_decisions_total` (counter): guard outcomes by route class
//! - `gate_store_retries_total` (counter): store retry attempts
//! - `gate_store_errors_total` (counter): store failures by kind
//! - `gate_rate_limited_total` (counter): rejected requests
//! - `gate_replica_health` (gauge): 1=healthy, 0=unhealthy
//!
//! # Design Decisions
//! - Low-overhead metric updates (atomic operations)
//! - Exposition via the Prometheus exporter's own HTTP listener

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
///
/// Call once at startup, from within the runtime.
pub fn init_metrics(addr: SocketAddr) {
    let builder = PrometheusBuilder::new().with_http_listener(addr);
    match builder.install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one proxied request.
pub fn record_request(method: &str, status: u16, replica: &str, start_time: Instant) {
    counter!(
        "gate_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "replica" => replica.to_string()
    )
    .increment(1);
    histogram!("gate_request_duration_seconds", "method" => method.to_string())
        .record(start_time.elapsed().as_secs_f64());
}

/// Record one guard evaluation.
pub fn record_guard_decision(class: &str, outcome: &str) {
    counter!(
        "gate_guard_decisions_total",
        "class" => class.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Record one store retry attempt.
pub fn record_store_retry() {
    counter!("gate_store_retries_total").increment(1);
}

/// Record one store failure by kind.
pub fn record_store_error(kind: &str) {
    counter!("gate_store_errors_total", "kind" => kind.to_string()).increment(1);
}

/// Record one rate-limited rejection.
pub fn record_rate_limited(reason: &str) {
    counter!("gate_rate_limited_total", "reason" => reason.to_string()).increment(1);
}

/// Record replica health after a proxy attempt.
pub fn record_replica_health(replica: &str, healthy: bool) {
    gauge!("gate_replica_health", "replica" => replica.to_string())
        .set(if healthy { 1.0 } else { 0.0 });
}
