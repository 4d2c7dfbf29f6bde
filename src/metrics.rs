//! Buffer instrumentation through the `metrics` facade.
//!
//! Without an installed recorder every call here is a no-op.

use std::time::Duration;

use anyhow::Context;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

pub const INSERTED_TOTAL: &str = "timed_buffer_inserted_total";
pub const EVICTED_TOTAL: &str = "timed_buffer_evicted_total";
pub const AGGREGATIONS_TOTAL: &str = "timed_buffer_aggregations_total";
pub const SAMPLES: &str = "timed_buffer_samples";
pub const AGGREGATE_MS: &str = "timed_buffer_aggregate_ms";

/// One-time metrics registration (so series show up on scrape).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(describe_all);
}

fn describe_all() {
    describe_counter!(INSERTED_TOTAL, "Samples inserted into timed buffers.");
    describe_counter!(EVICTED_TOTAL, "Samples evicted past the 60 minute horizon.");
    describe_counter!(AGGREGATIONS_TOTAL, "Windowed aggregations performed.");
    describe_gauge!(SAMPLES, "Retained samples after the last buffer call.");
    describe_histogram!(AGGREGATE_MS, "Accumulator fold time in milliseconds.");
}

pub(crate) fn record_insert(buffer: &str, len: usize) {
    counter!(INSERTED_TOTAL, "buffer" => buffer.to_string()).increment(1);
    record_len(buffer, len);
}

pub(crate) fn record_len(buffer: &str, len: usize) {
    gauge!(SAMPLES, "buffer" => buffer.to_string()).set(len as f64);
}

pub(crate) fn record_evicted(buffer: &str, n: u64) {
    counter!(EVICTED_TOTAL, "buffer" => buffer.to_string()).increment(n);
}

pub(crate) fn record_aggregation(buffer: &str, took: Duration) {
    counter!(AGGREGATIONS_TOTAL, "buffer" => buffer.to_string()).increment(1);
    histogram!(AGGREGATE_MS, "buffer" => buffer.to_string()).record(took.as_secs_f64() * 1_000.0);
}

/// Install a global Prometheus recorder and return the handle used to render
/// the exposition text.
pub fn install_prometheus() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .context("prometheus: install recorder")?;
    // Buffers built before this point described into the no-op recorder.
    describe_all();
    Ok(handle)
}
