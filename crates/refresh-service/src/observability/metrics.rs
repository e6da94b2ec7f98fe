//! Metrics for the refresh service.
//!
//! Prometheus naming: `refresh_` prefix, `_total` counters, `_seconds`
//! histograms.
//!
//! # Cardinality
//!
//! - `status`: success, error
//! - `error_category`: authentication, invalid_input, internal, plus the
//!   token categories (malformed, cryptographic, expired, revoked)

use metrics::{counter, histogram};
use std::time::Duration;

/// Record a refresh attempt and its duration.
///
/// Metrics: `refresh_token_refresh_total`, `refresh_token_refresh_duration_seconds`
/// Labels: `status`, `error_category`
pub fn record_refresh(status: &str, error_category: Option<&str>, duration: Duration) {
    let category = error_category.unwrap_or("none");

    histogram!("refresh_token_refresh_duration_seconds", "status" => status.to_string())
        .record(duration.as_secs_f64());

    counter!("refresh_token_refresh_total", "status" => status.to_string(), "error_category" => category.to_string())
        .increment(1);
}

/// Record the outcome of reading and validating an incoming bearer token.
///
/// Metric: `refresh_token_validations_total`
/// Labels: `status`, `error_category`
pub fn record_token_validation(status: &str, error_category: Option<&str>) {
    let category = error_category.unwrap_or("none");
    counter!("refresh_token_validations_total", "status" => status.to_string(), "error_category" => category.to_string())
        .increment(1);
}
