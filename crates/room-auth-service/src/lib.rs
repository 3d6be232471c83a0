//! Room Auth Service Library
//!
//! Issues room-scoped participant tokens for the video room service and
//! authenticates the webhooks it sends back.
//!
//! # Modules
//!
//! - `config` - Service configuration
//! - `crypto` - JWT signing and verification
//! - `errors` - Error types
//! - `handlers` - HTTP request handlers
//! - `middleware` - HTTP middleware
//! - `models` - Request, grant and webhook event models
//! - `observability` - Log correlation and metrics
//! - `routes` - Router and application state
//! - `services` - Token issuance, session counters, webhook verification and dispatch

pub mod config;
pub mod crypto;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod routes;
pub mod services;
