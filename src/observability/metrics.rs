//! Metrics collection and exposition.
//!
//! # Metrics
//! - `trace_gate_requests_total` (counter): requests by pipeline outcome
//! - `trace_gate_rejections_total` (counter): gate rejections by reason
//! - `trace_gate_control_failures_total` (counter): control store read/write failures
//! - `trace_gate_trace_deliveries_total` (counter): trace deliveries by outcome
//! - `trace_gate_schedule_triggers_total` (counter): window open/close firings
//! - `trace_gate_request_duration_seconds` (histogram): pipeline entry to response completion
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Count a request by how the pipeline handled it
/// (`traced`, `untraced`, `rejected`, `degraded`).
pub fn record_request(outcome: &'static str) {
    counter!("trace_gate_requests_total", "outcome" => outcome).increment(1);
}

/// Count a gate rejection (`api_disabled`, `rate_limited`).
pub fn record_rejection(reason: &'static str) {
    counter!("trace_gate_rejections_total", "reason" => reason).increment(1);
}

/// Count a failed control store call (`fetch`, `persist`).
pub fn record_control_failure(operation: &'static str) {
    counter!("trace_gate_control_failures_total", "operation" => operation).increment(1);
}

/// Count a trace delivery (`sent`, `failed`, `dropped`).
pub fn record_trace_delivery(outcome: &'static str) {
    counter!("trace_gate_trace_deliveries_total", "outcome" => outcome).increment(1);
}

/// Count a schedule trigger firing (`open`, `close`).
pub fn record_schedule_trigger(edge: &'static str) {
    counter!("trace_gate_schedule_triggers_total", "edge" => edge).increment(1);
}

/// Record how long a traced request took.
pub fn record_duration(start: Instant) {
    histogram!("trace_gate_request_duration_seconds").record(start.elapsed().as_secs_f64());
}
