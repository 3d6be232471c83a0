pub mod session_counter;
pub mod token_service;
pub mod webhook_dispatch;
pub mod webhook_service;
