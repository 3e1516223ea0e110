//! Tenant identity for schema-per-tenant storage.
//!
//! # Core Types
//!
//! - [`TenantId`] - Opaque, non-blank tenant identifier; also the schema name
//! - [`TenantAllowList`] - The closed set of tenants accepted at the boundary
//! - [`TenantContext`] - Carrier binding a tenant to the current execution unit
//! - [`CurrentTenantResolver`] - Supplies the current tenant to the session layer
//!
//! # Examples
//!
//! ```
//! use stratum_persistence::tenant::{
//!     ContextTenantResolver, CurrentTenantResolver, TenantContext, TenantId,
//! };
//!
//! let resolver = ContextTenantResolver::new();
//!
//! let resolved = TenantContext::sync_scope(TenantId::new("tenant1"), || {
//!     resolver.resolve_current_tenant()
//! })
//! .unwrap();
//!
//! assert_eq!(resolved.unwrap().as_str(), "tenant1");
//! assert!(resolver.resolve_current_tenant().is_err());
//! ```

mod allow_list;
mod context;
mod id;
mod resolver;

pub use allow_list::TenantAllowList;
pub use context::{TenantContext, TenantGuard};
pub use id::TenantId;
pub use resolver::{ContextTenantResolver, CurrentTenantResolver, TenantFallback};
