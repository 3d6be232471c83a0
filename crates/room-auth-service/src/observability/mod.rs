//! Observability for the room auth service.
//!
//! # Privacy by Default
//!
//! Service functions use `#[instrument(skip_all)]` and log an explicit
//! allow-list of fields:
//! - **SAFE**: room names, roles, event kinds, session numbers
//! - **HASHED**: participant identities (see [`hash_for_correlation`])
//! - **NEVER**: tokens, API secrets, webhook authorization headers

pub mod metrics;

use sha2::{Digest, Sha256};

/// Hash a field value for correlation in logs (SHA-256, first 8 hex chars)
///
/// Lets operators follow one participant across log lines without the
/// identity itself appearing in the logs. Not a secret-protection mechanism.
pub fn hash_for_correlation(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    hex::encode(digest.get(..4).unwrap_or_default())
}

/// Error categories for metrics labels (bounded cardinality)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Caller sent an unusable request
    Validation,
    /// Webhook could not be authenticated
    Verification,
    /// Signing or session store failure
    Internal,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Validation => "validation",
            ErrorCategory::Verification => "verification",
            ErrorCategory::Internal => "internal",
        }
    }
}

impl From<&crate::errors::ApiError> for ErrorCategory {
    fn from(err: &crate::errors::ApiError) -> Self {
        use crate::errors::ApiError;
        match err {
            ApiError::InvalidRequest(_) => ErrorCategory::Validation,
            ApiError::VerificationFailed => ErrorCategory::Verification,
            ApiError::SigningFailure(_) | ApiError::SessionStore(_) => ErrorCategory::Internal,
        }
    }
}
