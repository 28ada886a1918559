// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for the Yandex Cloud DNS-01 webhook.
//!
//! All metrics carry the namespace prefix `ycdns_webhook_` and are exposed on the
//! webhook's `/metrics` endpoint.
//!
//! # Metrics Categories
//!
//! - **Challenge Metrics** - `Present`/`CleanUp` calls and their outcome
//! - **API Metrics** - Calls to the Yandex Cloud IAM and DNS APIs
//!
//! # Example
//!
//! ```rust,no_run
//! use ycdns_webhook::metrics::record_challenge;
//!
//! record_challenge("Present", true, std::time::Duration::from_millis(350));
//! ```

use prometheus::{CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use std::sync::LazyLock;
use std::time::Duration;

// ============================================================================
// Metric Name Constants
// ============================================================================

/// Namespace prefix for all webhook metrics
const METRICS_NAMESPACE: &str = "ycdns_webhook";

/// `operation` label for the IAM token exchange
pub const API_OP_IAM_TOKEN: &str = "iam_token";

/// `operation` label for `getRecordSet`
pub const API_OP_GET_RECORD_SET: &str = "get_record_set";

/// `operation` label for `updateRecordSets`
pub const API_OP_UPDATE_RECORD_SETS: &str = "update_record_sets";

const CHALLENGE_ACTIONS: [&str; 2] = ["Present", "CleanUp"];
const API_OPERATIONS: [&str; 3] = [
    API_OP_IAM_TOKEN,
    API_OP_GET_RECORD_SET,
    API_OP_UPDATE_RECORD_SETS,
];
const STATUSES: [&str; 2] = ["success", "error"];

// ============================================================================
// Global Metrics Registry
// ============================================================================

/// Global Prometheus metrics registry
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// ============================================================================
// Challenge Metrics
// ============================================================================

/// Total number of challenge requests by action and status
///
/// Labels:
/// - `action`: `Present` or `CleanUp`
/// - `status`: `success` or `error`
pub static CHALLENGES_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_challenges_total"),
        "Total number of challenge requests by action and status",
    );
    let counter = CounterVec::new(opts, &["action", "status"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Duration of challenge requests in seconds
///
/// Labels:
/// - `action`: `Present` or `CleanUp`
pub static CHALLENGE_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_challenge_duration_seconds"),
        "Duration of challenge requests in seconds by action",
    )
    .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0]);
    let histogram = HistogramVec::new(opts, &["action"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .unwrap();
    histogram
});

// ============================================================================
// API Metrics
// ============================================================================

/// Total number of Yandex Cloud API calls by operation and status
///
/// Labels:
/// - `operation`: `iam_token`, `get_record_set`, `update_record_sets`
/// - `status`: `success` or `error`
pub static API_REQUESTS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_api_requests_total"),
        "Total number of Yandex Cloud API calls by operation and status",
    );
    let counter = CounterVec::new(opts, &["operation", "status"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Helper Functions
// ============================================================================

fn status_label(success: bool) -> &'static str {
    if success {
        "success"
    } else {
        "error"
    }
}

/// Record a finished challenge request
///
/// # Arguments
/// * `action` - `Present` or `CleanUp`
/// * `success` - Whether the solver succeeded
/// * `duration` - Time spent in the solver
pub fn record_challenge(action: &str, success: bool, duration: Duration) {
    CHALLENGES_TOTAL
        .with_label_values(&[action, status_label(success)])
        .inc();
    CHALLENGE_DURATION_SECONDS
        .with_label_values(&[action])
        .observe(duration.as_secs_f64());
}

/// Record a Yandex Cloud API call
pub fn record_api_call(operation: &str, success: bool) {
    API_REQUESTS_TOTAL
        .with_label_values(&[operation, status_label(success)])
        .inc();
}

/// Register every metric family and create its known label sets at zero.
///
/// Families without children are left out of the exposition, so without this
/// `/metrics` stays empty until the first challenge. Safe to call repeatedly.
pub fn init_metrics() {
    for action in CHALLENGE_ACTIONS {
        for status in STATUSES {
            CHALLENGES_TOTAL.with_label_values(&[action, status]);
        }
        CHALLENGE_DURATION_SECONDS.with_label_values(&[action]);
    }
    for operation in API_OPERATIONS {
        for status in STATUSES {
            API_REQUESTS_TOTAL.with_label_values(&[operation, status]);
        }
    }
}

/// Gather and encode all metrics in Prometheus text format
///
/// # Errors
/// Returns error if encoding fails
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    init_metrics();
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}
