use crate::config::ApiCredentials;
use crate::crypto::{self, WebhookRejection};
use crate::errors::ApiError;
use crate::models::WebhookEvent;
use crate::observability::metrics::record_webhook_event;
use tracing::instrument;

/// Authenticates webhook deliveries and decodes them into events.
#[derive(Debug, Clone)]
pub struct WebhookVerifier {
    credentials: ApiCredentials,
    clock_skew_seconds: i64,
}

impl WebhookVerifier {
    pub fn new(credentials: ApiCredentials, clock_skew_seconds: i64) -> Self {
        Self {
            credentials,
            clock_skew_seconds,
        }
    }

    /// Verify `raw_payload` against the `Authorization` header value.
    ///
    /// Every failure maps to [`ApiError::VerificationFailed`]. The specific
    /// reason is logged here and nowhere else.
    #[instrument(skip_all)]
    pub fn verify(
        &self,
        raw_payload: &[u8],
        signature_header: Option<&str>,
    ) -> Result<WebhookEvent, ApiError> {
        self.authenticate(raw_payload, signature_header)
            .map_err(|rejection| {
                tracing::warn!(
                    target: "room_auth.webhook",
                    reason = %rejection,
                    body_size = raw_payload.len(),
                    "Rejected webhook delivery"
                );
                record_webhook_event("unverified", "rejected");
                ApiError::VerificationFailed
            })
    }

    fn authenticate(
        &self,
        raw_payload: &[u8],
        signature_header: Option<&str>,
    ) -> Result<WebhookEvent, WebhookRejection> {
        let token = signature_header
            .map(str::trim)
            .map(|value| value.strip_prefix("Bearer ").unwrap_or(value).trim())
            .filter(|value| !value.is_empty())
            .ok_or(WebhookRejection::MissingHeader)?;

        crypto::verify_webhook_token(
            token,
            raw_payload,
            &self.credentials,
            self.clock_skew_seconds,
        )?;

        // Only parsed once the digest has matched.
        serde_json::from_slice::<WebhookEvent>(raw_payload)
            .map_err(|e| WebhookRejection::MalformedBody(e.to_string()))
    }
}
