use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Generic message returned for every webhook verification failure.
///
/// Signature mismatches, malformed tokens and unparsable bodies all look the
/// same from the outside; the specific reason is only logged.
pub const VERIFICATION_FAILED_MESSAGE: &str = "Webhook verification failed";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Webhook verification failed")]
    VerificationFailed,

    #[error("Signing failure: {0}")]
    SigningFailure(String),

    #[error("Session store error: {0}")]
    SessionStore(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::VerificationFailed => StatusCode::UNAUTHORIZED,
            ApiError::SigningFailure(_) | ApiError::SessionStore(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidRequest(_) => "INVALID_REQUEST",
            ApiError::VerificationFailed => "VERIFICATION_FAILED",
            ApiError::SigningFailure(_) => "SIGNING_FAILURE",
            ApiError::SessionStore(_) => "SESSION_STORE_ERROR",
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error_message: String,
    pub code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            ApiError::InvalidRequest(reason) => reason.clone(),
            ApiError::VerificationFailed => VERIFICATION_FAILED_MESSAGE.to_string(),
            ApiError::SigningFailure(detail) => {
                // Signing only fails when the issuer secret is misconfigured.
                tracing::error!(target: "room_auth.errors", error = %detail, "Token signing failed");
                "An internal error occurred while issuing the token".to_string()
            }
            ApiError::SessionStore(detail) => {
                tracing::error!(target: "room_auth.errors", error = %detail, "Session store failure");
                "An internal error occurred while issuing the token".to_string()
            }
        };

        let body = ErrorResponse {
            error_message: message,
            code: self.code().to_string(),
        };

        (self.status_code(), Json(body)).into_response()
    }
}
