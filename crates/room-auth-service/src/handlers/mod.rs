//! HTTP request handlers for the room auth service.

pub mod health;
pub mod metrics;
pub mod token_handler;
pub mod webhook_handler;

pub use health::{health_check, root_check};
pub use metrics::metrics_handler;
pub use token_handler::handle_token_request;
pub use webhook_handler::handle_webhook;
