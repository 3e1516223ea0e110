//! HTTP request handlers.
//!
//! - [`users`] - User list and password update, behind the tenant gate
//! - [`health`] - Health check endpoints

pub mod health;
pub mod users;

// Re-export handlers for convenience
pub use health::{health_handler, liveness_handler};
pub use users::{list_users_handler, update_password_handler};
