//! Integration tests for `POST /webhook`
//!
//! Deliveries are signed with the fixture webhook credentials exactly as the
//! room service would sign them; each failure case changes one thing.

use reqwest::StatusCode;
use room_auth_service::config::Config;
use room_auth_test_utils::{
    sign_webhook, test_config_vars, TestRoomAuthServer, WebhookEventBuilder, WebhookSigner,
    TEST_API_KEY, TEST_API_SECRET, TEST_WEBHOOK_KEY, TEST_WEBHOOK_SECRET,
};
use serde_json::{json, Value};

async fn deliver(
    server: &TestRoomAuthServer,
    body: Vec<u8>,
    authorization: Option<String>,
) -> reqwest::Response {
    let mut request = reqwest::Client::new()
        .post(format!("{}/webhook", server.url()))
        .header("content-type", "application/webhook+json")
        .body(body);

    if let Some(value) = authorization {
        request = request.header("authorization", value);
    }

    request
        .send()
        .await
        .expect("request should reach the test server")
}

async fn assert_rejected(response: reqwest::Response) -> Result<(), anyhow::Error> {
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await?;
    assert_eq!(body["errorMessage"], "Webhook verification failed");
    assert_eq!(body["code"], "VERIFICATION_FAILED");
    Ok(())
}

// ============================================================================
// Accepted deliveries
// ============================================================================

#[tokio::test]
async fn test_participant_joined_accepted() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestRoomAuthServer::spawn_default().await?;
    let body = WebhookEventBuilder::participant_joined("room1", "alice")
        .with_id("EV_1")
        .build();
    let authorization = WebhookSigner::for_test_server().sign(&body);

    // Act
    let response = deliver(&server, body, Some(authorization)).await;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await?.is_empty(), "Accepted delivery has an empty body");

    Ok(())
}

#[tokio::test]
async fn test_participant_left_accepted_with_bearer_prefix() -> Result<(), anyhow::Error> {
    let server = TestRoomAuthServer::spawn_default().await?;
    let body = WebhookEventBuilder::participant_left("room1", "alice").build();
    let authorization = format!("Bearer {}", WebhookSigner::for_test_server().sign(&body));

    let response = deliver(&server, body, Some(authorization)).await;

    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn test_unknown_event_kinds_accepted() -> Result<(), anyhow::Error> {
    let server = TestRoomAuthServer::spawn_default().await?;

    for kind in ["room_started", "room_finished", "track_published", "egress_ended"] {
        let body = WebhookEventBuilder::new(kind).with_room("room1").build();
        let authorization = WebhookSigner::for_test_server().sign(&body);

        let response = deliver(&server, body, Some(authorization)).await;

        assert_eq!(response.status(), StatusCode::OK, "kind {} should be accepted", kind);
    }

    Ok(())
}

#[tokio::test]
async fn test_unmodelled_fields_accepted() -> Result<(), anyhow::Error> {
    let server = TestRoomAuthServer::spawn_default().await?;
    let body = WebhookEventBuilder::participant_joined("room1", "alice")
        .with_field("track", json!({"sid": "TR_1", "type": "VIDEO"}))
        .with_field("numDropped", json!(0))
        .build();
    let authorization = sign_webhook(&body, TEST_WEBHOOK_KEY, TEST_WEBHOOK_SECRET);

    let response = deliver(&server, body, Some(authorization)).await;

    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn test_webhook_does_not_touch_session_numbers() -> Result<(), anyhow::Error> {
    let server = TestRoomAuthServer::spawn_default().await?;
    let body = WebhookEventBuilder::participant_joined("room1", "alice").build();
    let authorization = WebhookSigner::for_test_server().sign(&body);

    deliver(&server, body, Some(authorization)).await;

    assert_eq!(server.sessions().current("room1").await?, 0);

    Ok(())
}

#[tokio::test]
async fn test_sender_clock_slightly_ahead_accepted() -> Result<(), anyhow::Error> {
    let server = TestRoomAuthServer::spawn_default().await?;
    let body = WebhookEventBuilder::participant_joined("room1", "alice").build();
    let authorization = WebhookSigner::for_test_server()
        .not_before_in(Some(60))
        .expires_in(3600)
        .sign(&body);

    let response = deliver(&server, body, Some(authorization)).await;

    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}

// ============================================================================
// Rejected deliveries
// ============================================================================

#[tokio::test]
async fn test_missing_authorization_rejected() -> Result<(), anyhow::Error> {
    let server = TestRoomAuthServer::spawn_default().await?;
    let body = WebhookEventBuilder::participant_joined("room1", "alice").build();

    assert_rejected(deliver(&server, body, None).await).await
}

#[tokio::test]
async fn test_tampered_body_rejected() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestRoomAuthServer::spawn_default().await?;
    let body = WebhookEventBuilder::participant_joined("room1", "alice").build();
    let authorization = WebhookSigner::for_test_server().sign(&body);

    // Act: same signature, different identity in the body
    let tampered = WebhookEventBuilder::participant_joined("room1", "mallory").build();
    let response = deliver(&server, tampered, Some(authorization)).await;

    // Assert
    assert_rejected(response).await
}

#[tokio::test]
async fn test_reformatted_body_rejected() -> Result<(), anyhow::Error> {
    let server = TestRoomAuthServer::spawn_default().await?;
    let body = WebhookEventBuilder::participant_joined("room1", "alice").build();
    let authorization = WebhookSigner::for_test_server().sign(&body);

    // Semantically identical JSON, different bytes
    let mut reformatted = body;
    reformatted.push(b'\n');

    assert_rejected(deliver(&server, reformatted, Some(authorization)).await).await
}

#[tokio::test]
async fn test_issuer_secret_does_not_verify_webhooks() -> Result<(), anyhow::Error> {
    let server = TestRoomAuthServer::spawn_default().await?;
    let body = WebhookEventBuilder::participant_joined("room1", "alice").build();
    let authorization = sign_webhook(&body, TEST_WEBHOOK_KEY, TEST_API_SECRET);

    assert_rejected(deliver(&server, body, Some(authorization)).await).await
}

#[tokio::test]
async fn test_wrong_issuer_key_rejected() -> Result<(), anyhow::Error> {
    let server = TestRoomAuthServer::spawn_default().await?;
    let body = WebhookEventBuilder::participant_joined("room1", "alice").build();
    let authorization = sign_webhook(&body, TEST_API_KEY, TEST_WEBHOOK_SECRET);

    assert_rejected(deliver(&server, body, Some(authorization)).await).await
}

#[tokio::test]
async fn test_expired_signature_rejected() -> Result<(), anyhow::Error> {
    let server = TestRoomAuthServer::spawn_default().await?;
    let body = WebhookEventBuilder::participant_joined("room1", "alice").build();
    // Well past the default 300 second leeway
    let authorization = WebhookSigner::for_test_server()
        .expires_in(-3600)
        .not_before_in(Some(-7200))
        .sign(&body);

    assert_rejected(deliver(&server, body, Some(authorization)).await).await
}

#[tokio::test]
async fn test_not_yet_valid_signature_rejected() -> Result<(), anyhow::Error> {
    let server = TestRoomAuthServer::spawn_default().await?;
    let body = WebhookEventBuilder::participant_joined("room1", "alice").build();
    // Valid an hour from now, far outside the leeway
    let authorization = WebhookSigner::for_test_server()
        .not_before_in(Some(3600))
        .expires_in(7200)
        .sign(&body);

    assert_rejected(deliver(&server, body, Some(authorization)).await).await
}

#[tokio::test]
async fn test_wrong_digest_claim_rejected() -> Result<(), anyhow::Error> {
    let server = TestRoomAuthServer::spawn_default().await?;
    let body = WebhookEventBuilder::participant_joined("room1", "alice").build();
    let other_digest = room_auth_service::crypto::body_digest(b"some other body");
    let authorization = WebhookSigner::for_test_server()
        .with_digest(&other_digest)
        .sign(&body);

    assert_rejected(deliver(&server, body, Some(authorization)).await).await
}

#[tokio::test]
async fn test_garbage_authorization_rejected() -> Result<(), anyhow::Error> {
    let server = TestRoomAuthServer::spawn_default().await?;
    let body = WebhookEventBuilder::participant_joined("room1", "alice").build();

    assert_rejected(deliver(&server, body, Some("not-a-jwt".to_string())).await).await
}

#[tokio::test]
async fn test_signed_non_json_body_rejected() -> Result<(), anyhow::Error> {
    let server = TestRoomAuthServer::spawn_default().await?;
    let body = b"participant_joined room1 alice".to_vec();
    let authorization = WebhookSigner::for_test_server().sign(&body);

    assert_rejected(deliver(&server, body, Some(authorization)).await).await
}

// ============================================================================
// Failure modes and credential fallback
// ============================================================================

#[tokio::test]
async fn test_absorb_mode_answers_ok_on_failure() -> Result<(), anyhow::Error> {
    // Arrange
    let mut vars = test_config_vars();
    vars.insert("WEBHOOK_FAILURE_MODE".to_string(), "absorb".to_string());
    let server = TestRoomAuthServer::spawn(Config::from_vars(&vars)?).await?;
    let body = WebhookEventBuilder::participant_joined("room1", "alice").build();

    // Act
    let response = deliver(&server, body, Some("not-a-jwt".to_string())).await;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_webhook_credentials_default_to_issuer_pair() -> Result<(), anyhow::Error> {
    let mut vars = test_config_vars();
    vars.remove("WEBHOOK_API_KEY");
    vars.remove("WEBHOOK_API_SECRET");
    let server = TestRoomAuthServer::spawn(Config::from_vars(&vars)?).await?;

    let body = WebhookEventBuilder::participant_joined("room1", "alice").build();
    let accepted = deliver(
        &server,
        body.clone(),
        Some(sign_webhook(&body, TEST_API_KEY, TEST_API_SECRET)),
    )
    .await;
    assert_eq!(accepted.status(), StatusCode::OK);

    let rejected = deliver(
        &server,
        body.clone(),
        Some(sign_webhook(&body, TEST_WEBHOOK_KEY, TEST_WEBHOOK_SECRET)),
    )
    .await;
    assert_rejected(rejected).await
}
