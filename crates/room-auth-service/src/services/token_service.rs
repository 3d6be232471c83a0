use crate::config::ApiCredentials;
use crate::crypto::{self, AccessClaims};
use crate::errors::ApiError;
use crate::models::{Credential, ParticipantRole};
use crate::observability::{hash_for_correlation, ErrorCategory};
use crate::observability::metrics::record_token_issuance;
use crate::services::session_counter::SessionCounter;
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;

/// Issues participant tokens scoped to a single room.
#[derive(Clone)]
pub struct TokenIssuer {
    credentials: ApiCredentials,
    token_ttl_seconds: i64,
    sessions: Arc<dyn SessionCounter>,
}

impl TokenIssuer {
    pub fn new(
        credentials: ApiCredentials,
        token_ttl_seconds: i64,
        sessions: Arc<dyn SessionCounter>,
    ) -> Self {
        Self {
            credentials,
            token_ttl_seconds,
            sessions,
        }
    }

    pub fn sessions(&self) -> &Arc<dyn SessionCounter> {
        &self.sessions
    }

    /// Issue a token for `participant_identity` in `room_name`.
    ///
    /// Always advances the room's session sequence, even if the caller ends
    /// up discarding the token.
    #[instrument(skip_all, fields(elevated = elevated))]
    pub async fn issue(
        &self,
        room_name: &str,
        participant_identity: &str,
        elevated: bool,
    ) -> Result<Credential, ApiError> {
        let start = Instant::now();
        let role = ParticipantRole::from_elevated(elevated);

        let result = self.issue_inner(room_name, participant_identity, role).await;

        let status = match &result {
            Ok(_) => "success",
            Err(e) => ErrorCategory::from(e).as_str(),
        };
        record_token_issuance(role.as_str(), status, start.elapsed());

        result
    }

    async fn issue_inner(
        &self,
        room_name: &str,
        participant_identity: &str,
        role: ParticipantRole,
    ) -> Result<Credential, ApiError> {
        validate_request(room_name, participant_identity)?;

        let session_number = self.sessions.next_sequence(room_name).await?;

        let now = Utc::now().timestamp();
        let claims = AccessClaims {
            iss: self.credentials.api_key.clone(),
            sub: participant_identity.to_string(),
            jti: participant_identity.to_string(),
            nbf: now,
            exp: now + self.token_ttl_seconds,
            video: role.grants_for(room_name),
            session_number,
        };

        let token = crypto::sign_access_token(&claims, &self.credentials)?;

        tracing::info!(
            target: "room_auth.token",
            participant = %hash_for_correlation(participant_identity),
            room = %room_name,
            role = role.as_str(),
            session_number = session_number,
            backend = self.sessions.backend(),
            "Issued participant token"
        );

        Ok(Credential {
            token,
            session_number,
        })
    }
}

fn validate_request(room_name: &str, participant_identity: &str) -> Result<(), ApiError> {
    match (room_name.is_empty(), participant_identity.is_empty()) {
        (true, true) => Err(ApiError::InvalidRequest(
            "roomName and participantName are required".to_string(),
        )),
        (true, false) => Err(ApiError::InvalidRequest(
            "roomName is required".to_string(),
        )),
        (false, true) => Err(ApiError::InvalidRequest(
            "participantName is required".to_string(),
        )),
        (false, false) => Ok(()),
    }
}
