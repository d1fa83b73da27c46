//! Prometheus recorder setup.
//!
//! The core crate emits through the `metrics` facade:
//! - `greenguard_pushes_total`
//! - `greenguard_refresh_passes_total`
//! - `greenguard_refresh_duration_seconds`
//! - `greenguard_fetch_failures_total{source}`

use anyhow::{Context, Result};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};

/// Refresh passes are bounded by the fetch timeout, so buckets stop at 10s.
const REFRESH_DURATION_BUCKETS: &[f64] = &[0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

/// Install the global recorder and return a handle for `/metrics`.
pub fn install_recorder() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("greenguard_refresh_duration_seconds".to_string()),
            REFRESH_DURATION_BUCKETS,
        )
        .context("Invalid histogram buckets")?
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;

    metrics::describe_counter!("greenguard_pushes_total", "Sensor readings accepted");
    metrics::describe_counter!("greenguard_refresh_passes_total", "Completed refresh passes");
    metrics::describe_histogram!(
        "greenguard_refresh_duration_seconds",
        "Wall time of a refresh pass"
    );
    metrics::describe_counter!(
        "greenguard_fetch_failures_total",
        "External conditions fetches that were unavailable"
    );

    Ok(handle)
}
