//! Per-room session sequence counters.
//!
//! Every token issuance for a room takes the next number in that room's
//! sequence: 1 for the first issuance, then 2, 3, ... with no gaps and no
//! reuse. Rooms are independent of each other.
//!
//! # Backends
//!
//! - [`InMemorySessionCounter`]: process-local, lost on restart, never
//!   evicts. Default.
//! - [`RedisSessionCounter`]: `INCR` on `room:{name}:session_seq`, shared by
//!   every instance pointed at the same Redis and kept across restarts.

use crate::errors::ApiError;
use async_trait::async_trait;
use dashmap::DashMap;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client};
use tracing::{error, instrument};

/// Source of per-room sequence numbers.
#[async_trait]
pub trait SessionCounter: Send + Sync {
    /// Advance the room's sequence and return the new value.
    ///
    /// An unseen room starts at 0, so its first call returns 1. Concurrent
    /// calls for the same room never return the same value.
    async fn next_sequence(&self, room_name: &str) -> Result<u64, ApiError>;

    /// Last value handed out for the room, 0 if none.
    async fn current(&self, room_name: &str) -> Result<u64, ApiError>;

    /// Backend name for logs.
    fn backend(&self) -> &'static str;
}

/// Process-local counters.
///
/// Updates go through the map's entry API, which holds the shard lock for
/// the key while incrementing. Rooms hashed to different shards never
/// contend.
#[derive(Debug, Default)]
pub struct InMemorySessionCounter {
    counters: DashMap<String, u64>,
}

impl InMemorySessionCounter {
    pub fn new() -> Self {
        Self::default()
    }

    fn increment(&self, room_name: &str) -> u64 {
        let mut entry = self.counters.entry(room_name.to_string()).or_insert(0);
        *entry += 1;
        *entry
    }
}

#[async_trait]
impl SessionCounter for InMemorySessionCounter {
    async fn next_sequence(&self, room_name: &str) -> Result<u64, ApiError> {
        Ok(self.increment(room_name))
    }

    async fn current(&self, room_name: &str) -> Result<u64, ApiError> {
        Ok(self
            .counters
            .get(room_name)
            .map(|entry| *entry.value())
            .unwrap_or(0))
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

/// Redis-backed counters.
///
/// `MultiplexedConnection` is cheap to clone and safe to use concurrently, so
/// each call clones it instead of locking.
#[derive(Clone)]
pub struct RedisSessionCounter {
    connection: MultiplexedConnection,
}

impl RedisSessionCounter {
    /// Connect to Redis at `redis_url`.
    ///
    /// The URL is never logged; it may contain credentials.
    pub async fn connect(redis_url: &str) -> Result<Self, ApiError> {
        let client = Client::open(redis_url).map_err(|e| {
            error!(target: "room_auth.session_counter", error = %e, "Failed to open Redis client");
            ApiError::SessionStore(format!("Failed to open Redis client: {}", e))
        })?;

        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| {
                error!(target: "room_auth.session_counter", error = %e, "Failed to connect to Redis");
                ApiError::SessionStore(format!("Failed to connect to Redis: {}", e))
            })?;

        Ok(Self { connection })
    }

    pub fn key_for(room_name: &str) -> String {
        format!("room:{}:session_seq", room_name)
    }
}

#[async_trait]
impl SessionCounter for RedisSessionCounter {
    #[instrument(skip_all)]
    async fn next_sequence(&self, room_name: &str) -> Result<u64, ApiError> {
        let mut conn = self.connection.clone();
        let value: u64 = conn
            .incr(Self::key_for(room_name), 1u64)
            .await
            .map_err(|e| ApiError::SessionStore(format!("INCR failed: {}", e)))?;
        Ok(value)
    }

    #[instrument(skip_all)]
    async fn current(&self, room_name: &str) -> Result<u64, ApiError> {
        let mut conn = self.connection.clone();
        let value: Option<u64> = conn
            .get(Self::key_for(room_name))
            .await
            .map_err(|e| ApiError::SessionStore(format!("GET failed: {}", e)))?;
        Ok(value.unwrap_or(0))
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
