//! Webhook event records delivered by the room service.
//!
//! Only fields this service reads are typed; everything else is kept in the
//! `extra` maps so that new fields from the sender never break decoding.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Kind of a webhook event.
///
/// Unknown kinds are preserved verbatim in [`EventKind::Other`] rather than
/// rejected; the sender may introduce new kinds at any time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventKind {
    ParticipantJoined,
    ParticipantLeft,
    Other(String),
}

impl EventKind {
    pub const PARTICIPANT_JOINED: &'static str = "participant_joined";
    pub const PARTICIPANT_LEFT: &'static str = "participant_left";

    pub fn as_str(&self) -> &str {
        match self {
            EventKind::ParticipantJoined => Self::PARTICIPANT_JOINED,
            EventKind::ParticipantLeft => Self::PARTICIPANT_LEFT,
            EventKind::Other(kind) => kind,
        }
    }
}

impl From<String> for EventKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            Self::PARTICIPANT_JOINED => EventKind::ParticipantJoined,
            Self::PARTICIPANT_LEFT => EventKind::ParticipantLeft,
            _ => EventKind::Other(value),
        }
    }
}

impl From<&str> for EventKind {
    fn from(value: &str) -> Self {
        EventKind::from(value.to_string())
    }
}

impl From<EventKind> for String {
    fn from(kind: EventKind) -> Self {
        match kind {
            EventKind::Other(kind) => kind,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_participants: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    #[serde(default)]
    pub identity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub joined_at: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A verified webhook event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEvent {
    pub event: EventKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<RoomInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participant: Option<ParticipantInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Unix seconds.
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WebhookEvent {
    pub fn room_name(&self) -> Option<&str> {
        self.room.as_ref().map(|r| r.name.as_str())
    }

    pub fn participant_identity(&self) -> Option<&str> {
        self.participant.as_ref().map(|p| p.identity.as_str())
    }
}

/// 64-bit timestamps arrive either as JSON numbers or as numeric strings.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Str(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Int(value)) => Ok(Some(value)),
        Some(Raw::Str(value)) => value
            .parse::<i64>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
