//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gate_requests_total` (counter): requests by method, status, route
//! - `gate_request_duration_seconds` (histogram): latency per route
//! - `gate_denials_total` (counter): guard denials by reason
//! - `gate_handler_duration_seconds` (histogram): header-to-reply time per handler
//!
//! # Design Decisions
//! - Low-overhead metric updates through the `metrics` facade
//! - Prometheus exporter installed only when enabled in config

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::gate::MetricsSink;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, route: &str, start: Instant) {
    counter!(
        "gate_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "route" => route.to_string()
    )
    .increment(1);
    histogram!("gate_request_duration_seconds", "route" => route.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_denial(reason: &'static str) {
    counter!("gate_denials_total", "reason" => reason).increment(1);
}

/// Sends handler durations to the installed metrics recorder.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrometheusSink;

impl MetricsSink for PrometheusSink {
    fn record_duration(&self, label: &str, elapsed: Duration) {
        histogram!("gate_handler_duration_seconds", "handler" => label.to_string())
            .record(elapsed.as_secs_f64());
    }
}

/// Logs handler durations at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl MetricsSink for TracingSink {
    fn record_duration(&self, label: &str, elapsed: Duration) {
        tracing::debug!(
            handler = label,
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
            "Handler finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_request("GET", 200, "users.get", Instant::now());
        record_denial("missing_credential");
        PrometheusSink.record_duration("users.get", Duration::from_millis(3));
        TracingSink.record_duration("users.get", Duration::from_millis(3));
    }
}
