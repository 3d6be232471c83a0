//! Deterministic credential fixtures for testing
//!
//! Fixed API keys and secrets so tokens and webhook signatures are
//! reproducible across runs. The issuer and webhook pairs differ on purpose:
//! a test that signs a webhook with the issuer secret must fail.

use room_auth_service::config::{ApiCredentials, Config};
use std::collections::HashMap;

/// Issuer API key used by the test server.
pub const TEST_API_KEY: &str = "APItestissuer";

/// Issuer signing secret used by the test server.
pub const TEST_API_SECRET: &str = "test-issuer-secret-0123456789abcdef";

/// Webhook API key the test server expects as `iss`.
pub const TEST_WEBHOOK_KEY: &str = "APItestwebhook";

/// Webhook secret the test server verifies with.
pub const TEST_WEBHOOK_SECRET: &str = "test-webhook-secret-fedcba9876543210";

/// Token lifetime configured on the test server.
pub const TEST_TOKEN_TTL_SECONDS: i64 = 3600;

/// Issuer credentials matching the test server.
pub fn test_issuer_credentials() -> ApiCredentials {
    ApiCredentials::new(TEST_API_KEY, TEST_API_SECRET)
}

/// Webhook credentials matching the test server.
pub fn test_webhook_credentials() -> ApiCredentials {
    ApiCredentials::new(TEST_WEBHOOK_KEY, TEST_WEBHOOK_SECRET)
}

/// Environment variables for a test server bound to an ephemeral port.
///
/// Tests add or override entries before calling [`Config::from_vars`].
pub fn test_config_vars() -> HashMap<String, String> {
    [
        ("BIND_ADDRESS", "127.0.0.1:0"),
        ("ROOM_API_KEY", TEST_API_KEY),
        ("ROOM_API_SECRET", TEST_API_SECRET),
        ("WEBHOOK_API_KEY", TEST_WEBHOOK_KEY),
        ("WEBHOOK_API_SECRET", TEST_WEBHOOK_SECRET),
        ("TOKEN_TTL_SECONDS", "3600"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Test configuration built from [`test_config_vars`].
pub fn test_config() -> Config {
    Config::from_vars(&test_config_vars()).expect("test config vars should be valid")
}
