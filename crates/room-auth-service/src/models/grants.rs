//! Room grants carried in participant tokens.
//!
//! Grants are always scoped to a single room. The JSON shape (camelCase
//! field names, `roomCreate` omitted unless set) is what the room service
//! expects under the `video` claim.

use serde::{Deserialize, Serialize};

/// Capability flags for one room.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoGrant {
    /// Permission to create (and manage) the room.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub room_create: bool,

    /// Permission to join the room.
    #[serde(default)]
    pub room_join: bool,

    /// Name of the room all other grants apply to.
    #[serde(default)]
    pub room: String,
}

/// Requester classification that selects the grant tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipantRole {
    /// Regular participant: may join the room.
    Participant,
    /// Host/seller: may also create the room.
    Elevated,
}

impl ParticipantRole {
    pub fn from_elevated(elevated: bool) -> Self {
        if elevated {
            ParticipantRole::Elevated
        } else {
            ParticipantRole::Participant
        }
    }

    /// Bounded label for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipantRole::Participant => "participant",
            ParticipantRole::Elevated => "elevated",
        }
    }

    /// Grant set for this role in `room`.
    pub fn grants_for(&self, room: &str) -> VideoGrant {
        VideoGrant {
            room_create: matches!(self, ParticipantRole::Elevated),
            room_join: true,
            room: room.to_string(),
        }
    }
}
