//! Prometheus scrape endpoint.
//!
//! Unauthenticated. Labels carry no room names or identities.

use axum::{extract::State, response::IntoResponse};
use metrics_exporter_prometheus::PrometheusHandle;

/// Handler for GET /metrics
#[tracing::instrument(skip_all, name = "room_auth.metrics.scrape")]
pub async fn metrics_handler(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    handle.render()
}

// Rendering needs a PrometheusHandle; the endpoint is covered by the
// integration tests in health_tests.rs.
