//! Custom test assertions for expressive tests
//!
//! Provides trait-based assertions for issued participant tokens. Tokens are
//! decoded with the fixture issuer credentials, so every assertion also
//! proves the signature.

use crate::crypto_fixtures::test_issuer_credentials;
use jsonwebtoken::{decode_header, Algorithm};
use room_auth_service::crypto::{verify_access_token, AccessClaims};

/// Custom assertions for issued tokens
///
/// # Example
/// ```rust,ignore
/// token
///     .assert_valid_jwt()
///     .assert_for_identity("alice")
///     .assert_participant_in("room1")
///     .assert_session_number(1);
/// ```
pub trait TokenAssertions {
    /// Assert that the token is an HS256 JWT signed by the fixture issuer
    fn assert_valid_jwt(&self) -> &Self;

    /// Assert that `sub` is the given identity
    fn assert_for_identity(&self, identity: &str) -> &Self;

    /// Assert standard participant grants scoped to `room`
    fn assert_participant_in(&self, room: &str) -> &Self;

    /// Assert elevated (room-create) grants scoped to `room`
    fn assert_elevated_in(&self, room: &str) -> &Self;

    /// Assert the embedded per-room session number
    fn assert_session_number(&self, expected: u64) -> &Self;

    /// Assert the token lifetime (`exp - nbf`) in seconds
    fn assert_lifetime(&self, seconds: i64) -> &Self;

    /// Decoded claims, for assertions not covered above
    fn claims(&self) -> AccessClaims;
}

impl TokenAssertions for String {
    fn assert_valid_jwt(&self) -> &Self {
        assert_eq!(
            self.split('.').count(),
            3,
            "JWT must have 3 parts (header.payload.signature)"
        );

        let header = decode_header(self).expect("JWT header should decode");
        assert_eq!(header.alg, Algorithm::HS256, "Expected HS256 algorithm");
        assert_eq!(header.typ.as_deref(), Some("JWT"), "Expected JWT type");

        self.claims();
        self
    }

    fn assert_for_identity(&self, identity: &str) -> &Self {
        let claims = self.claims();
        assert_eq!(claims.sub, identity, "Token subject mismatch");
        assert_eq!(claims.jti, identity, "Token jti should carry the identity");
        self
    }

    fn assert_participant_in(&self, room: &str) -> &Self {
        let claims = self.claims();
        assert!(claims.video.room_join, "Participant must be able to join");
        assert!(
            !claims.video.room_create,
            "Standard participant must not have roomCreate"
        );
        assert_eq!(claims.video.room, room, "Grant scoped to wrong room");
        self
    }

    fn assert_elevated_in(&self, room: &str) -> &Self {
        let claims = self.claims();
        assert!(claims.video.room_join, "Elevated participant must be able to join");
        assert!(claims.video.room_create, "Elevated participant must have roomCreate");
        assert_eq!(claims.video.room, room, "Grant scoped to wrong room");
        self
    }

    fn assert_session_number(&self, expected: u64) -> &Self {
        assert_eq!(self.claims().session_number, expected, "Session number mismatch");
        self
    }

    fn assert_lifetime(&self, seconds: i64) -> &Self {
        let claims = self.claims();
        assert_eq!(claims.exp - claims.nbf, seconds, "Token lifetime mismatch");
        self
    }

    fn claims(&self) -> AccessClaims {
        verify_access_token(self, &test_issuer_credentials(), 0)
            .expect("token should verify with the fixture issuer credentials")
    }
}
