//! Metrics collection and exposition.
//!
//! # Metrics
//! - `lifecycle_rpc_requests_total` (counter): JSON-RPC calls by method, result
//! - `lifecycle_submissions_total` (counter): `sendTransaction` by status
//! - `lifecycle_poll_attempts_total` (counter): `getTransaction` polls
//! - `lifecycle_confirmations_total` (counter): terminal results by outcome
//! - `lifecycle_confirmation_seconds` (histogram): first poll to terminal status
//! - `lifecycle_result_cache_size` (gauge): cached terminal results

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with an HTTP listener on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(%addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(%addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_rpc_request(method: &str, result: &'static str) {
    ::metrics::counter!(
        "lifecycle_rpc_requests_total",
        "method" => method.to_string(),
        "result" => result
    )
    .increment(1);
}

pub fn record_submission(status: &'static str) {
    ::metrics::counter!("lifecycle_submissions_total", "status" => status).increment(1);
}

pub fn record_poll_attempt() {
    ::metrics::counter!("lifecycle_poll_attempts_total").increment(1);
}

pub fn record_confirmation(outcome: &'static str, elapsed_secs: f64) {
    ::metrics::counter!("lifecycle_confirmations_total", "outcome" => outcome).increment(1);
    ::metrics::histogram!("lifecycle_confirmation_seconds", "outcome" => outcome).record(elapsed_secs);
}

pub fn record_cache_size(size: usize) {
    ::metrics::gauge!("lifecycle_result_cache_size").set(size as f64);
}
