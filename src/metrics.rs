//! Prometheus metrics for dataset requests and upstream fetches.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::{debug, info};

// === Metric Name Constants ===

/// Dataset request latency metric name.
pub const METRIC_DATASET_REQUEST_LATENCY: &str = "dataset_request_latency_ms";
/// Upstream fetch latency metric name.
pub const METRIC_UPSTREAM_FETCH_LATENCY: &str = "upstream_fetch_latency_ms";
/// Dataset requests counter metric name.
pub const METRIC_DATASET_REQUESTS: &str = "dataset_requests_total";
/// Dataset failures counter metric name.
pub const METRIC_DATASET_FAILURES: &str = "dataset_failures_total";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_histogram!(
        METRIC_DATASET_REQUEST_LATENCY,
        "Time to build and serialize a dataset in milliseconds"
    );
    describe_histogram!(
        METRIC_UPSTREAM_FETCH_LATENCY,
        "Upstream provider or file read latency in milliseconds"
    );

    describe_counter!(METRIC_DATASET_REQUESTS, "Total number of dataset requests");
    describe_counter!(
        METRIC_DATASET_FAILURES,
        "Total number of dataset requests that failed"
    );

    debug!("Metrics initialized");
}

/// Install the Prometheus exporter with its own HTTP listener.
pub fn install_exporter(addr: SocketAddr) -> anyhow::Result<()> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    info!("Prometheus exporter listening on {}", addr);
    Ok(())
}

/// Record the latency of one dataset request.
pub fn record_dataset_latency(start: Instant, dataset: &str) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_DATASET_REQUEST_LATENCY, "dataset" => dataset.to_string()).record(latency_ms);
}

/// Increment dataset requests counter.
pub fn inc_dataset_requests(dataset: &str) {
    counter!(METRIC_DATASET_REQUESTS, "dataset" => dataset.to_string()).increment(1);
}

/// Increment dataset failures counter.
pub fn inc_dataset_failures(dataset: &str) {
    counter!(METRIC_DATASET_FAILURES, "dataset" => dataset.to_string()).increment(1);
}

/// RAII guard for timing upstream fetches.
/// Automatically records latency when dropped.
pub struct LatencyTimer {
    start: Instant,
    source: &'static str,
}

impl LatencyTimer {
    /// Create a new latency timer for the given source.
    pub fn new(source: &'static str) -> Self {
        Self {
            start: Instant::now(),
            source,
        }
    }

    /// Get elapsed time in milliseconds (without recording).
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        let latency_ms = self.elapsed_ms();
        histogram!(METRIC_UPSTREAM_FETCH_LATENCY, "source" => self.source).record(latency_ms);
    }
}

/// Create a latency timer for an upstream fetch.
pub fn timer_upstream(source: &'static str) -> LatencyTimer {
    LatencyTimer::new(source)
}
