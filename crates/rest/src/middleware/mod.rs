//! HTTP middleware for the REST API.
//!
//! - [`tenant`] - Tenant gate: claim extraction, allow-list check and
//!   request-scoped tenant binding

pub mod tenant;

pub use tenant::{TenantGate, X_TENANT_ID, tenant_gate};
