//! Axum extractors.
//!
//! - [`CurrentTenant`] - The tenant admitted by the tenant gate

mod tenant;

pub use tenant::CurrentTenant;
