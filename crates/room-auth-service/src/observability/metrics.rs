//! Metrics definitions for the room auth service.
//!
//! All metrics follow Prometheus naming conventions:
//! - `room_auth_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded:
//! - `role`: participant, elevated
//! - `status`: success or an `ErrorCategory` label for issuance,
//!   accepted/ignored/rejected for webhooks
//! - `event`: participant_joined, participant_left, other, unverified
//! - `endpoint`: fixed route set, everything else collapses to `/other`
//!
//! Room names and identities are never labels.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Initialize the Prometheus recorder and return the handle used by `/metrics`.
///
/// Must be called before any metrics are recorded.
///
/// # Errors
///
/// Returns error if the recorder fails to install (e.g., already installed).
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Prefix("room_auth_http_request".to_string()),
            &[
                0.005, 0.010, 0.025, 0.050, 0.100, 0.150, 0.200, 0.300, 0.500, 1.000, 2.000,
            ],
        )
        .map_err(|e| format!("Failed to set HTTP request buckets: {e}"))?
        // Issuance is HMAC signing plus one counter increment
        .set_buckets_for_metric(
            Matcher::Prefix("room_auth_token_issuance".to_string()),
            &[0.0005, 0.001, 0.002, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250],
        )
        .map_err(|e| format!("Failed to set token issuance buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

// ============================================================================
// HTTP Request Metrics
// ============================================================================

/// Record HTTP request completion
///
/// Metric: `room_auth_http_requests_total`, `room_auth_http_request_duration_seconds`
/// Labels: `method`, `endpoint`, `status` / `status_code`
///
/// Called by the outermost middleware, so framework rejections (404, 405,
/// 413, timeouts) are counted too.
pub fn record_http_request(method: &str, endpoint: &str, status_code: u16, duration: Duration) {
    let normalized_endpoint = normalize_endpoint(endpoint);
    let status = categorize_status_code(status_code);

    histogram!("room_auth_http_request_duration_seconds",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint,
        "status" => status
    )
    .record(duration.as_secs_f64());

    counter!("room_auth_http_requests_total",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint,
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

fn categorize_status_code(status_code: u16) -> &'static str {
    match status_code {
        200..=299 => "success",
        408 | 504 => "timeout",
        _ => "error",
    }
}

/// Collapse request paths onto the fixed route set.
fn normalize_endpoint(path: &str) -> &'static str {
    match path {
        "/" => "/",
        "/health" => "/health",
        "/metrics" => "/metrics",
        "/token" => "/token",
        "/webhook" => "/webhook",
        _ => "/other",
    }
}

// ============================================================================
// Token Issuance Metrics
// ============================================================================

/// Record one token issuance attempt
///
/// Metric: `room_auth_token_issuance_total`, `room_auth_token_issuance_duration_seconds`
/// Labels: `role`, `status`
pub fn record_token_issuance(role: &str, status: &str, duration: Duration) {
    histogram!("room_auth_token_issuance_duration_seconds",
        "role" => role.to_string()
    )
    .record(duration.as_secs_f64());

    counter!("room_auth_token_issuance_total",
        "role" => role.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

// ============================================================================
// Webhook Metrics
// ============================================================================

/// Record one webhook delivery outcome
///
/// Metric: `room_auth_webhook_events_total`
/// Labels: `event`, `status`
///
/// Unrecognized event kinds are recorded as `other` so a sender cannot grow
/// the label set.
pub fn record_webhook_event(event: &str, status: &str) {
    counter!("room_auth_webhook_events_total",
        "event" => webhook_event_label(event),
        "status" => status.to_string()
    )
    .increment(1);
}

fn webhook_event_label(event: &str) -> &'static str {
    match event {
        "participant_joined" => "participant_joined",
        "participant_left" => "participant_left",
        "unverified" => "unverified",
        _ => "other",
    }
}
