//! Builders for webhook deliveries
//!
//! Bodies are built as JSON bytes and signed the way the room service signs
//! them: an HS256 JWT whose `sha256` claim is the base64 SHA-256 of the exact
//! body bytes.

use crate::crypto_fixtures::{TEST_WEBHOOK_KEY, TEST_WEBHOOK_SECRET};
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use room_auth_service::crypto::{body_digest, WebhookClaims};
use serde_json::{json, Map, Value};

/// Builder for webhook event bodies
///
/// # Example
/// ```rust,ignore
/// let body = WebhookEventBuilder::participant_joined("room1", "alice")
///     .with_id("EV_1")
///     .build();
/// ```
pub struct WebhookEventBuilder {
    payload: Map<String, Value>,
}

impl WebhookEventBuilder {
    /// Event of an arbitrary kind with no room or participant.
    pub fn new(kind: &str) -> Self {
        let mut payload = Map::new();
        payload.insert("event".to_string(), Value::String(kind.to_string()));
        payload.insert("createdAt".to_string(), json!(Utc::now().timestamp()));
        Self { payload }
    }

    pub fn participant_joined(room: &str, identity: &str) -> Self {
        Self::new("participant_joined")
            .with_room(room)
            .with_participant(identity)
    }

    pub fn participant_left(room: &str, identity: &str) -> Self {
        Self::new("participant_left")
            .with_room(room)
            .with_participant(identity)
    }

    pub fn with_room(mut self, name: &str) -> Self {
        self.payload.insert(
            "room".to_string(),
            json!({"sid": format!("RM_{}", name), "name": name}),
        );
        self
    }

    pub fn with_participant(mut self, identity: &str) -> Self {
        self.payload.insert(
            "participant".to_string(),
            json!({"sid": format!("PA_{}", identity), "identity": identity}),
        );
        self
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.payload
            .insert("id".to_string(), Value::String(id.to_string()));
        self
    }

    /// Set any top-level field, e.g. ones the service does not model.
    pub fn with_field(mut self, key: &str, value: Value) -> Self {
        self.payload.insert(key.to_string(), value);
        self
    }

    /// Serialize to the exact bytes that will be signed and sent.
    pub fn build(self) -> Vec<u8> {
        serde_json::to_vec(&Value::Object(self.payload)).expect("JSON object should serialize")
    }
}

/// Signs webhook bodies into `Authorization` header values
///
/// Defaults produce a delivery the test server accepts; the setters produce
/// the failure cases.
pub struct WebhookSigner {
    key: String,
    secret: String,
    expires_in: i64,
    not_before_in: Option<i64>,
    digest_override: Option<String>,
}

impl WebhookSigner {
    pub fn new(key: &str, secret: &str) -> Self {
        Self {
            key: key.to_string(),
            secret: secret.to_string(),
            expires_in: 300,
            not_before_in: Some(0),
            digest_override: None,
        }
    }

    /// Signer matching the fixture webhook credentials.
    pub fn for_test_server() -> Self {
        Self::new(TEST_WEBHOOK_KEY, TEST_WEBHOOK_SECRET)
    }

    /// Seconds from now until `exp`; negative for an already expired token.
    pub fn expires_in(mut self, seconds: i64) -> Self {
        self.expires_in = seconds;
        self
    }

    /// Seconds from now until `nbf`; `None` omits the claim.
    pub fn not_before_in(mut self, seconds: Option<i64>) -> Self {
        self.not_before_in = seconds;
        self
    }

    /// Put `digest` in the `sha256` claim instead of the body's digest.
    pub fn with_digest(mut self, digest: &str) -> Self {
        self.digest_override = Some(digest.to_string());
        self
    }

    /// Header value (bare JWT, no `Bearer` prefix) for `body`.
    pub fn sign(&self, body: &[u8]) -> String {
        let now = Utc::now().timestamp();
        let claims = WebhookClaims {
            iss: self.key.clone(),
            exp: now + self.expires_in,
            nbf: self.not_before_in.map(|offset| now + offset),
            sha256: self
                .digest_override
                .clone()
                .unwrap_or_else(|| body_digest(body)),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .expect("HS256 signing should succeed")
    }
}

/// Sign `body` with `key`/`secret` using default claims.
pub fn sign_webhook(body: &[u8], key: &str, secret: &str) -> String {
    WebhookSigner::new(key, secret).sign(body)
}
