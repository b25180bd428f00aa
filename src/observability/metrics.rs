//! Metrics collection and exposition.
//!
//! # Metrics
//! - `refresher_cycles_total` (counter): reconcile cycles by outcome,
//!   including batches rejected as malformed
//! - `refresher_cycle_duration_seconds` (histogram): latency of cycles that
//!   actually ran
//! - `refresher_lists_cleared_total` (counter): pre-clears by list
//! - `refresher_active_routes` (gauge): routes in the active table
//! - `refresher_source_reloads_total` (counter): source reloads by outcome

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its HTTP listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_cycle(outcome: &'static str, start_time: Instant) {
    metrics::counter!("refresher_cycles_total", "outcome" => outcome).increment(1);
    metrics::histogram!("refresher_cycle_duration_seconds")
        .record(start_time.elapsed().as_secs_f64());
}

/// Count a batch rejected before any phase ran. No latency is recorded.
pub fn record_rejected_batch() {
    metrics::counter!("refresher_cycles_total", "outcome" => "malformed").increment(1);
}

pub fn record_list_cleared(list: &str) {
    metrics::counter!("refresher_lists_cleared_total", "list" => list.to_string()).increment(1);
}

pub fn record_active_routes(count: usize) {
    metrics::gauge!("refresher_active_routes").set(count as f64);
}

pub fn record_source_reload(outcome: &'static str) {
    metrics::counter!("refresher_source_reloads_total", "outcome" => outcome).increment(1);
}
