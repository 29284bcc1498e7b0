//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Workflow runs (outcomes, cases created, account tagging)
//! - External services (Salesforce, text generation)

use std::time::Instant;

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Workflow Metrics
// =============================================================================

/// Workflow runs total by result.
pub static WORKFLOW_RUNS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("casegen_workflow_runs_total", "Total workflow runs"),
        &["result"], // "success", "connection_failed", "generation_failed", "creation_failed"
    )
    .unwrap()
});

/// Cases created total.
pub static CASES_CREATED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("casegen_cases_created_total", "Total cases created in the CRM").unwrap()
});

/// Cases tagged with an existing account.
pub static ACCOUNTS_TAGGED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "casegen_accounts_tagged_total",
        "Total cases linked to a randomly selected account",
    )
    .unwrap()
});

// =============================================================================
// External Service Metrics
// =============================================================================

/// External service request duration.
pub static EXTERNAL_SERVICE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "casegen_external_service_duration_seconds",
            "Duration of external service calls",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["service", "operation"],
    )
    .unwrap()
});

/// External service requests total.
pub static EXTERNAL_SERVICE_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "casegen_external_service_requests_total",
            "Total external service requests",
        ),
        &["service", "operation", "status"], // status: "success", "error"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Record the outcome and duration of one external call started at `start`.
pub fn observe_external_call(service: &str, operation: &str, start: Instant, success: bool) {
    EXTERNAL_SERVICE_DURATION
        .with_label_values(&[service, operation])
        .observe(start.elapsed().as_secs_f64());
    let status = if success { "success" } else { "error" };
    EXTERNAL_SERVICE_REQUESTS
        .with_label_values(&[service, operation, status])
        .inc();
}

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Workflow
        Box::new(WORKFLOW_RUNS.clone()),
        Box::new(CASES_CREATED.clone()),
        Box::new(ACCOUNTS_TAGGED.clone()),
        // External services
        Box::new(EXTERNAL_SERVICE_DURATION.clone()),
        Box::new(EXTERNAL_SERVICE_REQUESTS.clone()),
    ]
}
