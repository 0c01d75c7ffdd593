// src/telemetry.rs
//! Counter registration and an optional Prometheus textfile dump for batch runs.

use anyhow::{Context, Result};
use metrics::{describe_counter, describe_gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use std::path::Path;

/// One-time metrics registration (so series show up in the dump even at zero).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_events_total", "Items returned by source providers.");
        describe_counter!(
            "ingest_kept_total",
            "Items kept after normalization + platform filtering."
        );
        describe_counter!(
            "ingest_filtered_total",
            "Items dropped as empty or outside the platform allowlist."
        );
        describe_counter!(
            "ingest_rejected_total",
            "Source elements that could not be read as items."
        );
        describe_counter!(
            "ingest_provider_errors_total",
            "Provider fetch/parse errors."
        );
        describe_counter!("classify_items_total", "Items passed to the classifier.");
        describe_counter!(
            "classify_records_total",
            "Classification records emitted (one per matched category)."
        );
        describe_counter!("aggregate_rows_total", "Aggregate rows emitted.");
        describe_counter!(
            "aggregate_rejected_total",
            "Records rejected by the aggregator as data errors."
        );
        describe_gauge!("pipeline_last_run_ts", "Unix ts when the pipeline last ran.");
    });
}

/// Recorder for a single batch run; rendered to a file at the end.
pub struct TextfileMetrics {
    handle: PrometheusHandle,
}

impl TextfileMetrics {
    /// Install the global Prometheus recorder. Only one recorder may exist per process.
    pub fn install() -> Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("installing prometheus recorder")?;
        ensure_metrics_described();
        Ok(Self { handle })
    }

    /// Write the current exposition text to `path`.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.handle.render())
            .with_context(|| format!("writing metrics to {}", path.display()))
    }
}
