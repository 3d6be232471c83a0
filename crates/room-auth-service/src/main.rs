use room_auth_service::config::{load_dotenv, Config, LogFormat};
use room_auth_service::observability::metrics::init_metrics_recorder;
use room_auth_service::routes::{self, AppState};
use room_auth_service::services::session_counter::{
    InMemorySessionCounter, RedisSessionCounter, SessionCounter,
};
use secrecy::ExposeSecret;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv = load_dotenv();

    let config = Config::from_env();
    init_tracing(
        config
            .as_ref()
            .map_or(LogFormat::Text, |config| config.log_format),
    );

    if let Err(e) = &dotenv {
        warn!(error = %e, "Failed to load .env file");
    }

    let config = config.map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!("Starting Room Auth Service");
    info!(
        api_key = %config.issuer.api_key,
        webhook_key = %config.webhook.api_key,
        token_ttl_seconds = config.token_ttl_seconds,
        webhook_failure_mode = ?config.webhook_failure_mode,
        "Configuration loaded successfully"
    );

    if config.shares_issuer_secret() {
        warn!("Webhook verification uses the token signing secret; set WEBHOOK_API_SECRET to separate them");
    }

    let sessions: Arc<dyn SessionCounter> = match &config.session_store_redis_url {
        Some(url) => {
            info!("Connecting to Redis session store...");
            let counter = RedisSessionCounter::connect(url.expose_secret())
                .await
                .map_err(|e| {
                    error!("Failed to initialize session store: {}", e);
                    e
                })?;
            Arc::new(counter)
        }
        None => Arc::new(InMemorySessionCounter::new()),
    };
    info!(backend = sessions.backend(), "Session counter ready");

    let metrics_handle = init_metrics_recorder().map_err(|e| {
        error!("Failed to initialize metrics recorder: {}", e);
        e
    })?;

    let addr: SocketAddr = config.bind_address.parse().map_err(|e| {
        error!("Invalid bind address: {}", e);
        e
    })?;

    let state = Arc::new(AppState::new(config, sessions));
    let app = routes::build_routes(state, metrics_handle);

    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        error!("Failed to bind {}: {}", addr, e);
        e
    })?;

    info!("Room Auth Service listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Room Auth Service shutdown complete");

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "room_auth_service=info,room_auth=info,tower_http=info".into());

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

/// Returns when SIGINT or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received SIGINT, starting graceful shutdown..."),
            Err(e) => {
                error!("Failed to listen for SIGINT: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received SIGTERM, starting graceful shutdown...");
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
