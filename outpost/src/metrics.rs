//! Metrics declaration and initialization.

use outpost_core::ResponseSource;

use crate::route::Strategy;

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
lazy_static! {
    // Interception metrics

    /// Track number of requests handled by a strategy.
    pub static ref REQUESTS_INTERCEPTED: &'static str = {
        metrics::describe_counter!(
            "outpost_requests_intercepted_total",
            "Total number of requests handled by a caching strategy."
        );
        "outpost_requests_intercepted_total"
    };
    /// Track number of requests left to the host default handling.
    pub static ref REQUESTS_PASSED_THROUGH: &'static str = {
        metrics::describe_counter!(
            "outpost_requests_passthrough_total",
            "Total number of requests passed through without interception."
        );
        "outpost_requests_passthrough_total"
    };
    /// Track responses by source (network, cache, fallback).
    pub static ref RESPONSES_SERVED: &'static str = {
        metrics::describe_counter!(
            "outpost_responses_total",
            "Total number of responses returned to pages, by source."
        );
        "outpost_responses_total"
    };
    /// Track requests that failed with no cached fallback.
    pub static ref FETCH_ERRORS: &'static str = {
        metrics::describe_counter!(
            "outpost_fetch_errors_total",
            "Total number of intercepted requests that ended with a fetch error."
        );
        "outpost_fetch_errors_total"
    };

    // Offload manager metrics

    /// Track number of offload tasks spawned.
    pub static ref OFFLOAD_TASKS_SPAWNED: &'static str = {
        metrics::describe_counter!(
            "outpost_offload_tasks_spawned_total",
            "Total number of offload tasks spawned."
        );
        "outpost_offload_tasks_spawned_total"
    };
    /// Track number of offload tasks completed successfully.
    pub static ref OFFLOAD_TASKS_COMPLETED: &'static str = {
        metrics::describe_counter!(
            "outpost_offload_tasks_completed_total",
            "Total number of offload tasks completed successfully."
        );
        "outpost_offload_tasks_completed_total"
    };
    /// Track number of offload tasks that timed out.
    pub static ref OFFLOAD_TASKS_TIMEOUT: &'static str = {
        metrics::describe_counter!(
            "outpost_offload_tasks_timeout_total",
            "Total number of offload tasks that timed out."
        );
        "outpost_offload_tasks_timeout_total"
    };
    /// Track number of offload tasks deduplicated (skipped).
    pub static ref OFFLOAD_TASKS_DEDUPLICATED: &'static str = {
        metrics::describe_counter!(
            "outpost_offload_tasks_deduplicated_total",
            "Total number of offload tasks deduplicated (skipped because already in flight)."
        );
        "outpost_offload_tasks_deduplicated_total"
    };
    /// Gauge of currently active offload tasks.
    pub static ref OFFLOAD_TASKS_ACTIVE: &'static str = {
        metrics::describe_gauge!(
            "outpost_offload_tasks_active",
            "Number of currently active offload tasks."
        );
        "outpost_offload_tasks_active"
    };
    /// Histogram of offload task duration.
    pub static ref OFFLOAD_TASK_DURATION: &'static str = {
        metrics::describe_histogram!(
            "outpost_offload_task_duration_seconds",
            metrics::Unit::Seconds,
            "Duration of offload tasks in seconds."
        );
        "outpost_offload_task_duration_seconds"
    };
}

/// Record a request that was not intercepted.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_passthrough(reason: &'static str) {
    metrics::counter!(*REQUESTS_PASSED_THROUGH, "reason" => reason).increment(1);
}

/// No-op version when metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_passthrough(_reason: &'static str) {}

/// Record the outcome of an intercepted request.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_outcome(strategy: Strategy, source: Option<&ResponseSource>) {
    metrics::counter!(*REQUESTS_INTERCEPTED, "strategy" => strategy.as_str()).increment(1);
    match source {
        Some(source) => metrics::counter!(
            *RESPONSES_SERVED,
            "strategy" => strategy.as_str(),
            "source" => source.as_str()
        )
        .increment(1),
        None => metrics::counter!(*FETCH_ERRORS, "strategy" => strategy.as_str()).increment(1),
    }
}

/// No-op version when metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_outcome(_strategy: Strategy, _source: Option<&ResponseSource>) {}
