//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_admissions_total` (counter): rate-limit decisions by endpoint, outcome
//! - `gateway_cache_lookups_total` (counter): single-symbol reads by result
//! - `gateway_refresh_fetches_total` (counter): per-symbol fetch outcomes
//! - `gateway_refresh_duration_seconds` (histogram): refresh cycle latency
//! - `gateway_snapshot_entities` (gauge): entities in the published snapshot
//! - `gateway_rate_limit_keys` (gauge): client keys currently tracked
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op, so tests need no setup

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with its own HTTP listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_admission(endpoint: &'static str, allowed: bool) {
    let outcome = if allowed { "allowed" } else { "rejected" };
    counter!("gateway_admissions_total", "endpoint" => endpoint, "outcome" => outcome).increment(1);
}

pub fn record_cache_lookup(hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    counter!("gateway_cache_lookups_total", "result" => result).increment(1);
}

pub fn record_refresh(fetched: usize, failed: usize, retained: usize, elapsed: Duration) {
    counter!("gateway_refresh_fetches_total", "outcome" => "ok").increment(fetched as u64);
    counter!("gateway_refresh_fetches_total", "outcome" => "failed").increment(failed as u64);
    counter!("gateway_refresh_fetches_total", "outcome" => "retained").increment(retained as u64);
    histogram!("gateway_refresh_duration_seconds").record(elapsed.as_secs_f64());
}

pub fn record_snapshot_size(entities: usize) {
    gauge!("gateway_snapshot_entities").set(entities as f64);
}

pub fn record_tracked_keys(keys: usize) {
    gauge!("gateway_rate_limit_keys").set(keys as f64);
}
