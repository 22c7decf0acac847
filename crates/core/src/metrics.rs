//! Prometheus metrics for core components.
//!
//! This module provides metrics for the download pipeline: submissions,
//! in-flight jobs, outcomes per stage and stage timings.

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts};

// =============================================================================
// Download Pipeline Metrics
// =============================================================================

/// Download jobs accepted for processing.
pub static DOWNLOADS_SUBMITTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "depot_downloads_submitted_total",
        "Total download jobs submitted",
    )
    .unwrap()
});

/// Download jobs that have not reached done or failed yet.
pub static DOWNLOADS_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("depot_downloads_active", "Download jobs currently in flight").unwrap()
});

/// Download jobs relocated into the store.
pub static DOWNLOADS_COMPLETED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "depot_downloads_completed_total",
        "Total download jobs completed successfully",
    )
    .unwrap()
});

/// Download jobs that stopped with an error, by stage.
pub static DOWNLOADS_FAILED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("depot_downloads_failed_total", "Total download jobs that failed"),
        &["stage"], // "fetch", "hash", "relocate"
    )
    .unwrap()
});

/// Time spent in each pipeline stage.
pub static STAGE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "depot_download_stage_duration_seconds",
            "Duration of download pipeline stages",
        )
        .buckets(vec![
            0.005, 0.05, 0.25, 1.0, 5.0, 30.0, 120.0, 600.0, 1800.0,
        ]),
        &["stage"],
    )
    .unwrap()
});

/// Bytes written to disk by the fetch stage.
pub static FETCHED_BYTES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "depot_fetched_bytes_total",
        "Total bytes fetched from remote URLs",
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(DOWNLOADS_SUBMITTED.clone()),
        Box::new(DOWNLOADS_ACTIVE.clone()),
        Box::new(DOWNLOADS_COMPLETED.clone()),
        Box::new(DOWNLOADS_FAILED.clone()),
        Box::new(STAGE_DURATION.clone()),
        Box::new(FETCHED_BYTES.clone()),
    ]
}
