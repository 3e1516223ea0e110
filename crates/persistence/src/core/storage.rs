//! Tenant-scoped user storage.
//!
//! This module defines the [`UserStorage`] trait, the business-facing CRUD
//! surface. Callers never name a tenant: every operation runs against the
//! tenant bound to the current execution unit.

use async_trait::async_trait;

use crate::error::StorageResult;
use crate::types::User;

/// User operations for the current tenant.
///
/// # Tenant Isolation
///
/// Each call opens exactly one tenant session. The tenant is pulled from the
/// current execution unit, the connection is steered to that tenant's schema,
/// and the session is closed before the call returns, whether it succeeded
/// or not.
///
/// # Example
///
/// ```ignore
/// use stratum_persistence::core::UserStorage;
/// use stratum_persistence::tenant::{TenantContext, TenantId};
///
/// async fn example<S: UserStorage>(storage: &S) -> StorageResult<()> {
///     let users = TenantContext::scope_with(TenantId::new("tenant1"), storage.list_users()).await?;
///     println!("tenant1 has {} users", users.len());
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait UserStorage: Send + Sync {
    /// Returns a human-readable name for this storage backend.
    fn backend_name(&self) -> &'static str;

    /// Lists all users of the current tenant.
    ///
    /// # Errors
    ///
    /// * `StorageError::Tenant(Unbound)` - If no tenant is bound and no default is configured
    /// * `StorageError::Connection(SchemaSwitchFailed)` - If the tenant schema cannot be selected
    async fn list_users(&self) -> StorageResult<Vec<User>>;

    /// Changes the password of one user of the current tenant.
    ///
    /// # Errors
    ///
    /// * `StorageError::Resource(NotFound)` - If no user has the given number
    /// * Every error [`list_users`](Self::list_users) can return
    async fn update_user_password(&self, user_no: i32, user_pwd: &str) -> StorageResult<User>;
}
