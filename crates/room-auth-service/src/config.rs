use axum::http::HeaderValue;
use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::env;
use std::fmt;
use thiserror::Error;

/// Port used when neither `BIND_ADDRESS` nor `SERVER_PORT` is set.
pub const DEFAULT_SERVER_PORT: u16 = 6080;

/// Development API key, matching the room service's local dev defaults.
pub const DEFAULT_API_KEY: &str = "devkey";

/// Development API secret, matching the room service's local dev defaults.
pub const DEFAULT_API_SECRET: &str = "secret";

/// Default participant token lifetime (6 hours).
pub const DEFAULT_TOKEN_TTL_SECONDS: i64 = 6 * 60 * 60;

/// Shortest token lifetime accepted from configuration (1 minute).
pub const MIN_TOKEN_TTL_SECONDS: i64 = 60;

/// Longest token lifetime accepted from configuration (24 hours).
pub const MAX_TOKEN_TTL_SECONDS: i64 = 24 * 60 * 60;

/// Default clock skew tolerance for webhook token `exp`/`nbf` checks (5 minutes).
pub const DEFAULT_JWT_CLOCK_SKEW_SECONDS: i64 = 300;

/// Upper bound on configurable clock skew (10 minutes).
pub const MAX_JWT_CLOCK_SKEW_SECONDS: i64 = 600;

/// What the webhook endpoint answers when a delivery fails verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookFailureMode {
    /// Respond 401 with a generic error body so the sender can retry or alert.
    Reject,
    /// Respond 200 with an empty body; the failure is only logged.
    Absorb,
}

impl WebhookFailureMode {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "reject" => Some(Self::Reject),
            "absorb" => Some(Self::Absorb),
            _ => None,
        }
    }
}

/// Log output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Key identity plus shared secret used to sign or verify HS256 tokens.
#[derive(Clone)]
pub struct ApiCredentials {
    pub api_key: String,
    pub api_secret: SecretString,
}

impl ApiCredentials {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: SecretString::from(api_secret.into()),
        }
    }
}

impl fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    /// Credentials used to sign participant tokens.
    pub issuer: ApiCredentials,
    /// Credentials used to verify inbound webhook deliveries.
    pub webhook: ApiCredentials,
    pub token_ttl_seconds: i64,
    pub jwt_clock_skew_seconds: i64,
    pub webhook_failure_mode: WebhookFailureMode,
    /// Allowed CORS origins. `None` allows any origin.
    pub cors_allowed_origins: Option<Vec<String>>,
    /// Redis URL for the shared session counter. `None` keeps counters in memory.
    pub session_store_redis_url: Option<SecretString>,
    pub log_format: LogFormat,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: String, reason: String },

    #[error("Empty value for {0}")]
    EmptyValue(String),
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing)
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let bind_address = match vars.get("BIND_ADDRESS") {
            Some(addr) => addr.clone(),
            None => {
                let port = match vars.get("SERVER_PORT") {
                    Some(raw) => raw.trim().parse::<u16>().map_err(|e| {
                        ConfigError::InvalidValue {
                            name: "SERVER_PORT".to_string(),
                            reason: e.to_string(),
                        }
                    })?,
                    None => DEFAULT_SERVER_PORT,
                };
                format!("0.0.0.0:{}", port)
            }
        };

        let issuer_key = non_empty(vars, "ROOM_API_KEY", DEFAULT_API_KEY)?;
        let issuer_secret = non_empty(vars, "ROOM_API_SECRET", DEFAULT_API_SECRET)?;

        // The webhook pair is its own trust boundary but falls back to the
        // issuer pair, which is how the room service signs deliveries by default.
        let webhook_key = non_empty(vars, "WEBHOOK_API_KEY", &issuer_key)?;
        let webhook_secret = non_empty(vars, "WEBHOOK_API_SECRET", &issuer_secret)?;

        let token_ttl_seconds = bounded_i64(
            vars,
            "TOKEN_TTL_SECONDS",
            DEFAULT_TOKEN_TTL_SECONDS,
            MIN_TOKEN_TTL_SECONDS,
            MAX_TOKEN_TTL_SECONDS,
        )?;

        let jwt_clock_skew_seconds = bounded_i64(
            vars,
            "JWT_CLOCK_SKEW_SECONDS",
            DEFAULT_JWT_CLOCK_SKEW_SECONDS,
            0,
            MAX_JWT_CLOCK_SKEW_SECONDS,
        )?;

        let webhook_failure_mode = match vars.get("WEBHOOK_FAILURE_MODE") {
            Some(raw) => {
                WebhookFailureMode::parse(raw).ok_or_else(|| ConfigError::InvalidValue {
                    name: "WEBHOOK_FAILURE_MODE".to_string(),
                    reason: format!("expected 'reject' or 'absorb', got '{}'", raw),
                })?
            }
            None => WebhookFailureMode::Reject,
        };

        let cors_allowed_origins = match vars.get("CORS_ALLOWED_ORIGINS") {
            Some(raw) => Some(parse_origins(raw)?),
            None => None,
        };

        let session_store_redis_url = vars
            .get("SESSION_STORE_REDIS_URL")
            .filter(|url| !url.trim().is_empty())
            .map(|url| SecretString::from(url.clone()));

        let log_format = match vars.get("LOG_FORMAT").map(|s| s.trim().to_ascii_lowercase()) {
            None => LogFormat::Text,
            Some(s) if s == "text" => LogFormat::Text,
            Some(s) if s == "json" => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    name: "LOG_FORMAT".to_string(),
                    reason: format!("expected 'text' or 'json', got '{}'", other),
                })
            }
        };

        Ok(Config {
            bind_address,
            issuer: ApiCredentials::new(issuer_key, issuer_secret),
            webhook: ApiCredentials::new(webhook_key, webhook_secret),
            token_ttl_seconds,
            jwt_clock_skew_seconds,
            webhook_failure_mode,
            cors_allowed_origins,
            session_store_redis_url,
            log_format,
        })
    }

    /// Whether webhook verification runs under the same secret as token issuance.
    pub fn shares_issuer_secret(&self) -> bool {
        self.issuer.api_secret.expose_secret() == self.webhook.api_secret.expose_secret()
    }
}

/// Load a `.env` file from the working directory or its parents.
///
/// A missing file is not an error; an unreadable or malformed one is.
pub fn load_dotenv() -> Result<(), dotenvy::Error> {
    ignore_missing(dotenvy::dotenv().map(|_| ()))
}

fn ignore_missing(result: Result<(), dotenvy::Error>) -> Result<(), dotenvy::Error> {
    match result {
        Err(e) if e.not_found() => Ok(()),
        other => other,
    }
}

fn non_empty(
    vars: &HashMap<String, String>,
    name: &str,
    default: &str,
) -> Result<String, ConfigError> {
    let value = vars.get(name).map(String::as_str).unwrap_or(default);
    if value.trim().is_empty() {
        return Err(ConfigError::EmptyValue(name.to_string()));
    }
    Ok(value.to_string())
}

fn bounded_i64(
    vars: &HashMap<String, String>,
    name: &str,
    default: i64,
    min: i64,
    max: i64,
) -> Result<i64, ConfigError> {
    let Some(raw) = vars.get(name) else {
        return Ok(default);
    };

    let value: i64 = raw.trim().parse().map_err(|e: std::num::ParseIntError| {
        ConfigError::InvalidValue {
            name: name.to_string(),
            reason: e.to_string(),
        }
    })?;

    if !(min..=max).contains(&value) {
        return Err(ConfigError::InvalidValue {
            name: name.to_string(),
            reason: format!("must be between {} and {}, got {}", min, max, value),
        });
    }

    Ok(value)
}

fn parse_origins(raw: &str) -> Result<Vec<String>, ConfigError> {
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    if origins.is_empty() {
        return Err(ConfigError::EmptyValue("CORS_ALLOWED_ORIGINS".to_string()));
    }

    for origin in &origins {
        HeaderValue::from_str(origin).map_err(|e| ConfigError::InvalidValue {
            name: "CORS_ALLOWED_ORIGINS".to_string(),
            reason: format!("'{}': {}", origin, e),
        })?;
    }

    Ok(origins)
}
