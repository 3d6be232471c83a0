//! # Room Auth Test Utilities
//!
//! Shared test utilities for the room auth service.
//!
//! This crate provides:
//! - Deterministic credential fixtures (fixed keys and secrets)
//! - Webhook builders that sign deliveries the way the room service does
//! - Server test harness (TestRoomAuthServer for E2E tests)
//! - Custom assertions (TokenAssertions trait)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use room_auth_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() -> anyhow::Result<()> {
//!     let server = TestRoomAuthServer::spawn_default().await?;
//!
//!     let body = WebhookEventBuilder::participant_joined("room1", "alice").build();
//!     let authorization = WebhookSigner::for_test_server().sign(&body);
//!
//!     let token = server.request_token("room1", "alice", true).await?;
//!     token
//!         .assert_valid_jwt()
//!         .assert_for_identity("alice")
//!         .assert_elevated_in("room1");
//!     Ok(())
//! }
//! ```

pub mod assertions;
pub mod crypto_fixtures;
pub mod server_harness;
pub mod webhook_builders;

// Re-export commonly used items
pub use assertions::*;
pub use crypto_fixtures::*;
pub use server_harness::*;
pub use webhook_builders::*;
