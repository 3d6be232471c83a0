use crate::config::ApiCredentials;
use crate::errors::ApiError;
use crate::models::VideoGrant;
use base64::{engine::general_purpose, Engine as _};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error;
use tracing::instrument;

/// Maximum accepted JWT size in bytes (8KB).
///
/// Checked before any base64 decoding or signature verification so that
/// oversized headers are rejected with minimal work.
pub const MAX_JWT_SIZE_BYTES: usize = 8192;

/// Participant access token claims.
///
/// `sub` and `jti` carry the participant identity and are redacted in Debug
/// output.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessClaims {
    /// Issuer API key
    pub iss: String,
    /// Participant identity
    pub sub: String,
    /// Token identifier (the participant identity, as the room service expects)
    pub jti: String,
    /// Not-before timestamp
    pub nbf: i64,
    /// Expiration timestamp
    pub exp: i64,
    /// Room grants
    pub video: VideoGrant,
    /// Per-room issuance sequence number
    pub session_number: u64,
}

impl fmt::Debug for AccessClaims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessClaims")
            .field("iss", &self.iss)
            .field("sub", &"[REDACTED]")
            .field("jti", &"[REDACTED]")
            .field("nbf", &self.nbf)
            .field("exp", &self.exp)
            .field("video", &self.video)
            .field("session_number", &self.session_number)
            .finish()
    }
}

/// Claims of the token the room service puts in a webhook's `Authorization`
/// header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookClaims {
    /// API key the delivery was signed for
    pub iss: String,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
    /// Standard base64 SHA-256 digest of the raw request body
    pub sha256: String,
}

/// Internal reason a webhook delivery was rejected.
///
/// Only ever logged. Callers outside this service see
/// [`ApiError::VerificationFailed`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WebhookRejection {
    #[error("authorization header missing")]
    MissingHeader,

    #[error("authorization token too large")]
    TokenTooLarge,

    #[error("authorization token invalid: {0}")]
    InvalidToken(String),

    #[error("body digest does not match signed digest")]
    DigestMismatch,

    #[error("body is not a valid event: {0}")]
    MalformedBody(String),
}

/// Sign participant claims into an HS256 JWT with the issuer secret.
#[instrument(skip_all)]
pub fn sign_access_token(
    claims: &AccessClaims,
    credentials: &ApiCredentials,
) -> Result<String, ApiError> {
    let secret = credentials.api_secret.expose_secret();
    if secret.is_empty() {
        return Err(ApiError::SigningFailure(
            "Issuer secret is empty".to_string(),
        ));
    }

    let mut header = Header::new(Algorithm::HS256);
    header.typ = Some("JWT".to_string());

    encode(&header, claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| ApiError::SigningFailure(format!("JWT signing operation failed: {}", e)))
}

/// Verify a participant token issued by [`sign_access_token`].
///
/// Validates size, HS256 signature, issuer, `exp` and `nbf` (with
/// `clock_skew_seconds` leeway).
#[instrument(skip_all)]
pub fn verify_access_token(
    token: &str,
    credentials: &ApiCredentials,
    clock_skew_seconds: i64,
) -> Result<AccessClaims, ApiError> {
    if token.len() > MAX_JWT_SIZE_BYTES {
        tracing::debug!(
            target: "crypto",
            token_size = token.len(),
            max_size = MAX_JWT_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(ApiError::VerificationFailed);
    }

    let validation = hs256_validation(
        &credentials.api_key,
        clock_skew_seconds,
        &["exp", "nbf", "iss", "sub"],
    );
    let key = DecodingKey::from_secret(credentials.api_secret.expose_secret().as_bytes());

    decode::<AccessClaims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::debug!(target: "crypto", error = %e, "Token verification failed");
            ApiError::VerificationFailed
        })
}

/// Standard base64 SHA-256 digest of `body`.
pub fn body_digest(body: &[u8]) -> String {
    general_purpose::STANDARD.encode(Sha256::digest(body))
}

/// Authenticate a webhook body against its authorization token.
///
/// The token must be an HS256 JWT signed with the webhook secret, issued for
/// the webhook API key, unexpired, and must carry the SHA-256 digest of
/// exactly these body bytes. The body itself is not inspected here.
#[instrument(skip_all)]
pub fn verify_webhook_token(
    token: &str,
    body: &[u8],
    credentials: &ApiCredentials,
    clock_skew_seconds: i64,
) -> Result<WebhookClaims, WebhookRejection> {
    if token.len() > MAX_JWT_SIZE_BYTES {
        return Err(WebhookRejection::TokenTooLarge);
    }

    let validation = hs256_validation(&credentials.api_key, clock_skew_seconds, &["exp", "iss"]);
    let key = DecodingKey::from_secret(credentials.api_secret.expose_secret().as_bytes());

    let claims = decode::<WebhookClaims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| WebhookRejection::InvalidToken(e.to_string()))?;

    let signed_digest = general_purpose::STANDARD
        .decode(claims.sha256.trim())
        .map_err(|_| WebhookRejection::DigestMismatch)?;

    if signed_digest.as_slice() != Sha256::digest(body).as_slice() {
        return Err(WebhookRejection::DigestMismatch);
    }

    Ok(claims)
}

fn hs256_validation(issuer: &str, clock_skew_seconds: i64, required: &[&str]) -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[issuer]);
    validation.set_required_spec_claims(required);
    validation.validate_exp = true;
    validation.validate_nbf = true;
    validation.leeway = u64::try_from(clock_skew_seconds).unwrap_or(0);
    validation
}
