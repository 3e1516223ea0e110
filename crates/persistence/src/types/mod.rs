//! Core types for the persistence layer.
//!
//! - [`User`] - The user entity stored in each tenant schema

mod user;

pub use user::User;
