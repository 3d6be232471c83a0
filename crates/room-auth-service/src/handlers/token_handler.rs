use crate::errors::ApiError;
use crate::models::{TokenRequest, TokenResponse};
use crate::routes::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use std::sync::Arc;

/// Handle participant token request
///
/// POST /token
///
/// A body that is not a JSON object (wrong content type, syntax error, wrong
/// field types) is answered like any other invalid request.
pub async fn handle_token_request(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TokenRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!(target: "room_auth.token", error = %rejection, "Rejected token request body");
        ApiError::InvalidRequest(format!("Invalid request body: {}", rejection.body_text()))
    })?;

    let credential = state
        .issuer
        .issue(
            request.room_name.as_deref().unwrap_or_default(),
            request.participant_name.as_deref().unwrap_or_default(),
            request.is_seller.unwrap_or(false),
        )
        .await?;

    Ok(Json(TokenResponse {
        token: credential.token,
    }))
}
