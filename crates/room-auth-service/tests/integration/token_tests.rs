//! Integration tests for `POST /token`

use reqwest::StatusCode;
use room_auth_test_utils::{
    test_config_vars, TestRoomAuthServer, TokenAssertions, TEST_TOKEN_TTL_SECONDS,
};
use room_auth_service::config::Config;
use serde_json::{json, Value};
use std::collections::HashSet;

async fn post_token(server: &TestRoomAuthServer, body: Value) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("{}/token", server.url()))
        .json(&body)
        .send()
        .await
        .expect("request should reach the test server")
}

// ============================================================================
// Successful issuance
// ============================================================================

#[tokio::test]
async fn test_participant_token_has_join_only_grants() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestRoomAuthServer::spawn_default().await?;

    // Act
    let response = post_token(
        &server,
        json!({"roomName": "room1", "participantName": "alice", "isSeller": false}),
    )
    .await;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    let token = body["token"].as_str().expect("token field").to_string();

    token
        .assert_valid_jwt()
        .assert_for_identity("alice")
        .assert_participant_in("room1")
        .assert_lifetime(TEST_TOKEN_TTL_SECONDS);

    Ok(())
}

#[tokio::test]
async fn test_seller_token_has_elevated_grants() -> Result<(), anyhow::Error> {
    let server = TestRoomAuthServer::spawn_default().await?;

    let token = server.request_token("room1", "seller", true).await?;

    token
        .assert_valid_jwt()
        .assert_for_identity("seller")
        .assert_elevated_in("room1");

    Ok(())
}

#[tokio::test]
async fn test_missing_is_seller_defaults_to_participant() -> Result<(), anyhow::Error> {
    let server = TestRoomAuthServer::spawn_default().await?;

    let response = post_token(&server, json!({"roomName": "room1", "participantName": "bob"})).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    body["token"]
        .as_str()
        .expect("token field")
        .to_string()
        .assert_participant_in("room1");

    Ok(())
}

#[tokio::test]
async fn test_non_ascii_identity_round_trips() -> Result<(), anyhow::Error> {
    let server = TestRoomAuthServer::spawn_default().await?;

    let token = server.request_token("가게-1", "판매자", true).await?;

    token.assert_for_identity("판매자").assert_elevated_in("가게-1");

    Ok(())
}

#[tokio::test]
async fn test_response_body_only_contains_token() -> Result<(), anyhow::Error> {
    let server = TestRoomAuthServer::spawn_default().await?;

    let response = post_token(
        &server,
        json!({"roomName": "room1", "participantName": "alice"}),
    )
    .await;
    let body: Value = response.json().await?;

    let keys: Vec<&String> = body.as_object().expect("object body").keys().collect();
    assert_eq!(keys, vec!["token"]);

    Ok(())
}

// ============================================================================
// Session sequence
// ============================================================================

#[tokio::test]
async fn test_session_numbers_advance_per_room() -> Result<(), anyhow::Error> {
    let server = TestRoomAuthServer::spawn_default().await?;

    server
        .request_token("room1", "alice", false)
        .await?
        .assert_session_number(1);
    server
        .request_token("room1", "alice", false)
        .await?
        .assert_session_number(2);
    server
        .request_token("room2", "bob", true)
        .await?
        .assert_session_number(1);
    server
        .request_token("room1", "carol", true)
        .await?
        .assert_session_number(3);

    assert_eq!(server.sessions().current("room1").await?, 3);
    assert_eq!(server.sessions().current("room2").await?, 1);

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_get_distinct_session_numbers() -> Result<(), anyhow::Error> {
    // Arrange
    let server = std::sync::Arc::new(TestRoomAuthServer::spawn_default().await?);
    let requests = 40u64;

    // Act
    let mut handles = Vec::new();
    for i in 0..requests {
        let server = std::sync::Arc::clone(&server);
        handles.push(tokio::spawn(async move {
            server
                .request_token("busy-room", &format!("viewer-{}", i), false)
                .await
        }));
    }

    let mut numbers = HashSet::new();
    for handle in handles {
        let token = handle.await??;
        numbers.insert(token.claims().session_number);
    }

    // Assert
    let expected: HashSet<u64> = (1..=requests).collect();
    assert_eq!(numbers, expected);

    Ok(())
}

// ============================================================================
// Validation
// ============================================================================

#[tokio::test]
async fn test_empty_room_name_rejected() -> Result<(), anyhow::Error> {
    let server = TestRoomAuthServer::spawn_default().await?;

    let response = post_token(&server, json!({"roomName": "", "participantName": "alice"})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    assert_eq!(body["errorMessage"], "roomName is required");
    assert_eq!(body["code"], "INVALID_REQUEST");

    Ok(())
}

#[tokio::test]
async fn test_missing_participant_name_rejected() -> Result<(), anyhow::Error> {
    let server = TestRoomAuthServer::spawn_default().await?;

    let response = post_token(&server, json!({"roomName": "room1"})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    assert_eq!(body["errorMessage"], "participantName is required");

    Ok(())
}

#[tokio::test]
async fn test_empty_body_object_rejected() -> Result<(), anyhow::Error> {
    let server = TestRoomAuthServer::spawn_default().await?;

    let response = post_token(&server, json!({})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    assert_eq!(
        body["errorMessage"],
        "roomName and participantName are required"
    );

    Ok(())
}

#[tokio::test]
async fn test_rejected_request_does_not_consume_session_number() -> Result<(), anyhow::Error> {
    let server = TestRoomAuthServer::spawn_default().await?;

    let response = post_token(&server, json!({"roomName": "room1", "participantName": ""})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    server
        .request_token("room1", "alice", false)
        .await?
        .assert_session_number(1);

    Ok(())
}

#[tokio::test]
async fn test_malformed_json_rejected() -> Result<(), anyhow::Error> {
    let server = TestRoomAuthServer::spawn_default().await?;

    let response = reqwest::Client::new()
        .post(format!("{}/token", server.url()))
        .header("content-type", "application/json")
        .body("{\"roomName\": \"room1\", ")
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    assert_eq!(body["code"], "INVALID_REQUEST");

    Ok(())
}

#[tokio::test]
async fn test_wrongly_typed_is_seller_rejected() -> Result<(), anyhow::Error> {
    let server = TestRoomAuthServer::spawn_default().await?;

    let response = post_token(
        &server,
        json!({"roomName": "room1", "participantName": "alice", "isSeller": "yes"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    Ok(())
}

// ============================================================================
// Configuration
// ============================================================================

#[tokio::test]
async fn test_configured_ttl_applies() -> Result<(), anyhow::Error> {
    let mut vars = test_config_vars();
    vars.insert("TOKEN_TTL_SECONDS".to_string(), "600".to_string());
    let server = TestRoomAuthServer::spawn(Config::from_vars(&vars)?).await?;

    server
        .request_token("room1", "alice", false)
        .await?
        .assert_lifetime(600);

    Ok(())
}
