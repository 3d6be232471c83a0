//! Liveness handlers. Neither checks dependencies.

/// `GET /`
pub async fn root_check() -> &'static str {
    "Server is running"
}

/// `GET /health`
pub async fn health_check() -> &'static str {
    "OK"
}
