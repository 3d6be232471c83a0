//! Test server harness for E2E testing
//!
//! Provides TestRoomAuthServer for spawning real room auth server instances
//! in tests.

use crate::crypto_fixtures::test_config;
use room_auth_service::config::Config;
use room_auth_service::observability::metrics::init_metrics_recorder;
use room_auth_service::routes::{self, AppState};
use room_auth_service::services::session_counter::{InMemorySessionCounter, SessionCounter};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Test harness for spawning the room auth server in E2E tests
///
/// # Example
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_token_flow_e2e() -> Result<()> {
///     let server = TestRoomAuthServer::spawn_default().await?;
///     let client = reqwest::Client::new();
///
///     let response = client
///         .post(format!("{}/token", server.url()))
///         .json(&json!({"roomName": "room1", "participantName": "alice"}))
///         .send()
///         .await?;
///
///     assert_eq!(response.status(), 200);
///     Ok(())
/// }
/// ```
pub struct TestRoomAuthServer {
    addr: SocketAddr,
    sessions: Arc<dyn SessionCounter>,
    handle: JoinHandle<()>,
}

impl TestRoomAuthServer {
    /// Spawn a server with the fixture configuration and an in-memory counter.
    pub async fn spawn_default() -> Result<Self, anyhow::Error> {
        Self::spawn(test_config()).await
    }

    /// Spawn a server with `config` and a fresh in-memory counter.
    ///
    /// `config.bind_address` is ignored; the server always binds
    /// `127.0.0.1:0`.
    pub async fn spawn(config: Config) -> Result<Self, anyhow::Error> {
        Self::spawn_with_sessions(config, Arc::new(InMemorySessionCounter::new())).await
    }

    /// Spawn a server around a caller-supplied session counter.
    pub async fn spawn_with_sessions(
        config: Config,
        sessions: Arc<dyn SessionCounter>,
    ) -> Result<Self, anyhow::Error> {
        let state = Arc::new(AppState::new(config, Arc::clone(&sessions)));

        // The global recorder can only be installed once per test process;
        // later servers get a standalone one.
        let metrics_handle = match init_metrics_recorder() {
            Ok(handle) => handle,
            Err(_) => {
                use metrics_exporter_prometheus::PrometheusBuilder;
                PrometheusBuilder::new().build_recorder().handle()
            }
        };

        let app = routes::build_routes(state, metrics_handle);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            sessions,
            handle,
        })
    }

    /// Get the base URL of the test server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Session counter shared with the running server.
    pub fn sessions(&self) -> &Arc<dyn SessionCounter> {
        &self.sessions
    }

    /// Request a token over HTTP and return it, failing on any non-200.
    pub async fn request_token(
        &self,
        room_name: &str,
        participant_name: &str,
        is_seller: bool,
    ) -> Result<String, anyhow::Error> {
        let response = reqwest::Client::new()
            .post(format!("{}/token", self.url()))
            .json(&serde_json::json!({
                "roomName": room_name,
                "participantName": participant_name,
                "isSeller": is_seller,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("token request failed with {}: {}", status, body);
        }

        let body: serde_json::Value = response.json().await?;
        body.get("token")
            .and_then(|t| t.as_str())
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("token response missing 'token' field: {}", body))
    }
}

impl Drop for TestRoomAuthServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
