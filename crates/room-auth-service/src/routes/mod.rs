//! HTTP routes for the room auth service.
//!
//! Defines the Axum router and application state.

use crate::config::Config;
use crate::handlers;
use crate::middleware::http_metrics_middleware;
use crate::services::session_counter::SessionCounter;
use crate::services::token_service::TokenIssuer;
use crate::services::webhook_dispatch::WebhookDispatcher;
use crate::services::webhook_service::WebhookVerifier;
use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration.
    pub config: Config,

    /// Signs participant tokens and assigns session numbers.
    pub issuer: TokenIssuer,

    /// Authenticates webhook deliveries.
    pub verifier: WebhookVerifier,

    /// Routes verified events to handlers.
    pub dispatcher: WebhookDispatcher,
}

impl AppState {
    /// Wire the services from `config` around the given session counter,
    /// with the default webhook handlers registered.
    pub fn new(config: Config, sessions: Arc<dyn SessionCounter>) -> Self {
        let issuer = TokenIssuer::new(config.issuer.clone(), config.token_ttl_seconds, sessions);
        let verifier = WebhookVerifier::new(config.webhook.clone(), config.jwt_clock_skew_seconds);

        Self {
            config,
            issuer,
            verifier,
            dispatcher: WebhookDispatcher::with_default_handlers(),
        }
    }
}

/// Build the application routes.
///
/// - `/` and `/health` - liveness
/// - `/metrics` - Prometheus scrape endpoint
/// - `/token` - participant token issuance
/// - `/webhook` - webhook delivery
/// - CORS, TraceLayer, 30 second timeout, HTTP metrics (outermost)
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let cors = cors_layer(state.config.cors_allowed_origins.as_deref());

    let app_routes = Router::new()
        .route("/", get(handlers::root_check))
        .route("/health", get(handlers::health_check))
        .route("/token", post(handlers::handle_token_request))
        .route("/webhook", post(handlers::handle_webhook))
        .with_state(state);

    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    // Layer order (bottom-to-top execution):
    // 1. CorsLayer - answers preflights before the timeout starts (innermost)
    // 2. TimeoutLayer
    // 3. TraceLayer
    // 4. http_metrics_middleware - sees every response (outermost)
    app_routes
        .merge(metrics_routes)
        .layer(cors)
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(http_metrics_middleware))
}

/// Any origin when `allowed_origins` is `None`, otherwise only the listed ones.
fn cors_layer(allowed_origins: Option<&[String]>) -> CorsLayer {
    match allowed_origins {
        None => CorsLayer::permissive(),
        Some(origins) => {
            // Origins were validated as header values when config was loaded.
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|origin| HeaderValue::from_str(origin).ok())
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        }
    }
}
