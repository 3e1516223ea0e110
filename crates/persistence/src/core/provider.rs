//! Tenant-aware connection acquisition.

use std::any::{Any, TypeId};

use async_trait::async_trait;

use crate::error::{BackendError, StorageResult};
use crate::tenant::TenantId;

use super::backend::PhysicalConnection;

/// Hands out connections steered to a tenant's schema.
///
/// # Protocol
///
/// - [`acquire_for_tenant`](Self::acquire_for_tenant) returns a connection on
///   which the tenant's schema has already been selected. If selection fails
///   the connection is discarded and never reaches the pool again.
/// - [`release_for_tenant`](Self::release_for_tenant) discards the connection
///   rather than resetting it, so the next acquisition always starts from a
///   fresh or re-steered connection.
/// - Unscoped acquisition carries no schema guarantee and is meant for
///   tenant-independent work.
#[async_trait]
pub trait MultiTenantConnectionProvider: Send + Sync {
    /// The connection type handed out.
    type Connection: PhysicalConnection;

    /// Acquires a connection with no schema guarantee.
    async fn acquire_unscoped(&self) -> Result<Self::Connection, BackendError>;

    /// Returns an unscoped connection to the pool.
    fn release_unscoped(&self, conn: Self::Connection);

    /// Acquires a connection steered to the schema of `tenant_identifier`.
    ///
    /// A blank identifier fails before the pool is contacted.
    async fn acquire_for_tenant(&self, tenant_identifier: &str) -> StorageResult<Self::Connection>;

    /// Ends a tenant-scoped unit of work, discarding the connection.
    fn release_for_tenant(&self, tenant_id: &TenantId, conn: Self::Connection);

    /// Whether connections may be released after every statement.
    fn supports_aggressive_release(&self) -> bool {
        false
    }

    /// Whether the provider can be unwrapped to the native type `type_id`.
    fn is_unwrappable_as(&self, _type_id: TypeId) -> bool {
        false
    }

    /// Unwraps the provider to the native type `type_id`, if supported.
    fn unwrap_as(&self, _type_id: TypeId) -> Option<&dyn Any> {
        None
    }
}
