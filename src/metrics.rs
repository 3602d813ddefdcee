//! Prometheus metrics for request handling.
//!
//! This module provides:
//! - Request counters per endpoint
//! - Authorization rejection, store failure and upstream failure counters
//! - Store fetch and upstream lookup latency histograms
//! - An optional Prometheus scrape endpoint

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use tracing::{debug, info};

// === Metric Name Constants ===

/// Requests received counter metric name.
pub const METRIC_REQUESTS: &str = "http_requests_total";
/// Authorization rejections counter metric name.
pub const METRIC_AUTH_REJECTED: &str = "auth_rejected_total";
/// Store failures counter metric name.
pub const METRIC_STORE_FAILURES: &str = "store_failures_total";
/// Upstream failures counter metric name.
pub const METRIC_UPSTREAM_FAILURES: &str = "upstream_failures_total";
/// Store fetch latency metric name.
pub const METRIC_STORE_FETCH_LATENCY: &str = "store_fetch_latency_ms";
/// Upstream lookup latency metric name.
pub const METRIC_UPSTREAM_LATENCY: &str = "upstream_lookup_latency_ms";

/// Register descriptions for every metric with the installed recorder.
/// Descriptions sent before a recorder is installed are discarded.
pub fn init_metrics() {
    describe_counter!(METRIC_REQUESTS, "Total number of API requests by endpoint");
    describe_counter!(
        METRIC_AUTH_REJECTED,
        "Total number of requests rejected for a missing or wrong shared secret"
    );
    describe_counter!(
        METRIC_STORE_FAILURES,
        "Total number of requests that failed in the document store"
    );
    describe_counter!(
        METRIC_UPSTREAM_FAILURES,
        "Total number of failed certificate lookups"
    );
    describe_histogram!(
        METRIC_STORE_FETCH_LATENCY,
        "Connect, query and close latency for one collection read in milliseconds"
    );
    describe_histogram!(
        METRIC_UPSTREAM_LATENCY,
        "Certificate API round trip latency in milliseconds"
    );

    debug!("Metrics initialized");
}

/// Install the Prometheus recorder with an HTTP scrape listener on `port`,
/// then register metric descriptions with it.
pub fn install_exporter(port: u16) -> Result<(), BuildError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    init_metrics();
    info!("Prometheus exporter listening on {}", addr);
    Ok(())
}

/// Increment the request counter for an endpoint.
pub fn inc_requests(endpoint: &'static str) {
    counter!(METRIC_REQUESTS, "endpoint" => endpoint).increment(1);
}

/// Increment the authorization rejection counter for an endpoint.
pub fn inc_auth_rejected(endpoint: &'static str) {
    counter!(METRIC_AUTH_REJECTED, "endpoint" => endpoint).increment(1);
}

/// Increment the store failure counter.
pub fn inc_store_failures() {
    counter!(METRIC_STORE_FAILURES).increment(1);
}

/// Increment the upstream failure counter.
pub fn inc_upstream_failures() {
    counter!(METRIC_UPSTREAM_FAILURES).increment(1);
}

/// Record the latency of one collection read.
pub fn record_store_fetch_latency(start: Instant, collection: &'static str) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_STORE_FETCH_LATENCY, "collection" => collection).record(latency_ms);
}

/// RAII guard for timing operations.
/// Automatically records latency when dropped.
pub struct LatencyTimer {
    start: Instant,
    metric_name: &'static str,
}

impl LatencyTimer {
    /// Create a new latency timer for the given metric.
    pub fn new(metric_name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            metric_name,
        }
    }

    /// Get elapsed time in milliseconds (without recording).
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        histogram!(self.metric_name).record(self.elapsed_ms());
    }
}

/// Create a latency timer for a certificate lookup.
pub fn timer_upstream_lookup() -> LatencyTimer {
    LatencyTimer::new(METRIC_UPSTREAM_LATENCY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn latency_timer_measures_time() {
        let timer = LatencyTimer::new("test_metric");
        sleep(Duration::from_millis(10));
        assert!(timer.elapsed_ms() >= 9.0);
    }

    #[test]
    fn recording_without_recorder_is_a_no_op() {
        init_metrics();
        inc_requests("blogs");
        inc_auth_rejected("blogs");
        record_store_fetch_latency(Instant::now(), "Blogs");
    }

    #[test]
    fn descriptions_reach_the_installed_recorder() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        ::metrics::with_local_recorder(&recorder, || {
            init_metrics();
            inc_requests("blogs");
            inc_store_failures();
        });

        let rendered = handle.render();
        assert!(rendered.contains("# HELP http_requests_total Total number of API requests by endpoint"));
        assert!(rendered.contains("# HELP store_failures_total"));
        assert!(rendered.contains("http_requests_total{endpoint=\"blogs\"} 1"));
    }
}
