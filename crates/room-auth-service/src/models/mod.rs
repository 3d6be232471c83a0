mod grants;
mod webhook;

pub use grants::{ParticipantRole, VideoGrant};
pub use webhook::{EventKind, ParticipantInfo, RoomInfo, WebhookEvent};

use serde::{Deserialize, Serialize};

/// Token request body (`POST /token`).
///
/// Missing strings deserialize to `None` so that validation can answer with a
/// descriptive message instead of a framework rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRequest {
    #[serde(default)]
    pub room_name: Option<String>,
    #[serde(default)]
    pub participant_name: Option<String>,
    /// Sellers (hosts) receive the elevated grant set.
    #[serde(default)]
    pub is_seller: Option<bool>,
}

/// Token response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Issued participant credential.
#[derive(Debug, Clone)]
pub struct Credential {
    /// Signed JWT handed to the participant.
    pub token: String,
    /// Per-room sequence number assigned to this issuance.
    pub session_number: u64,
}
