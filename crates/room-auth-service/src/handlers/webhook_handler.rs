use crate::config::WebhookFailureMode;
use crate::observability::metrics::record_webhook_event;
use crate::routes::AppState;
use crate::services::webhook_dispatch::DispatchOutcome;
use axum::{
    body::Bytes,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// Handle webhook delivery
///
/// POST /webhook
///
/// The body is taken as raw bytes because the signature covers exactly what
/// was sent. Verified deliveries get `200` with an empty body whether or not
/// any handler is registered for their kind.
pub async fn handle_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    // A non-ASCII header value cannot be a JWT; treat it as absent.
    let signature = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let event = match state.verifier.verify(&body, signature) {
        Ok(event) => event,
        Err(err) => {
            return match state.config.webhook_failure_mode {
                WebhookFailureMode::Reject => err.into_response(),
                WebhookFailureMode::Absorb => StatusCode::OK.into_response(),
            }
        }
    };

    let status = match state.dispatcher.dispatch(&event) {
        DispatchOutcome::Handled(_) => "accepted",
        DispatchOutcome::Ignored => "ignored",
    };
    record_webhook_event(event.event.as_str(), status);

    tracing::info!(
        target: "room_auth.webhook",
        event = %event.event,
        room = event.room_name().unwrap_or_default(),
        status = status,
        "Webhook event received"
    );

    StatusCode::OK.into_response()
}
