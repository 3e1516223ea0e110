//! Request-scoped tenant identity.
//!
//! This module defines [`TenantContext`], the carrier that makes the tenant of
//! the current execution unit visible to code that never sees the request,
//! such as the persistence layer's [`CurrentTenantResolver`].
//!
//! # Scoping
//!
//! Two slots back the carrier:
//!
//! 1. A tokio task-local slot, established by [`TenantContext::scope`]. Every
//!    request handled by the tenant gate runs inside its own scope, so two
//!    concurrent requests never share a slot, even when the runtime moves them
//!    between worker threads.
//! 2. A thread-local slot used when no task scope is active, for code running
//!    on plain threads or blocking workers (see [`TenantContext::sync_scope`]).
//!
//! Both slots hold at most one identifier. A scope's slot is dropped together
//! with the scoped future, whether that future completes, fails or is
//! cancelled, so nothing installed inside a scope can outlive it.
//!
//! [`CurrentTenantResolver`]: super::CurrentTenantResolver

use std::cell::RefCell;
use std::future::Future;

use tracing::trace;

use super::id::TenantId;
use crate::error::TenantError;

tokio::task_local! {
    static TASK_TENANT: RefCell<Option<TenantId>>;
}

thread_local! {
    static THREAD_TENANT: RefCell<Option<TenantId>> = const { RefCell::new(None) };
}

/// Carrier for the tenant bound to the current execution unit.
///
/// All methods are associated functions: the "instance" is whichever slot the
/// caller is currently running in.
///
/// # Examples
///
/// ```
/// use stratum_persistence::tenant::{TenantContext, TenantId};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let seen = TenantContext::scope_with(TenantId::new("tenant1"), async {
///     TenantContext::current()
/// })
/// .await;
///
/// assert_eq!(seen, Some(TenantId::new("tenant1")));
/// assert_eq!(TenantContext::current(), None);
/// # }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TenantContext;

impl TenantContext {
    /// Runs `future` inside a fresh, empty task-local tenant slot.
    ///
    /// Nested calls shadow the outer slot for the duration of the inner future.
    pub async fn scope<F>(future: F) -> F::Output
    where
        F: Future,
    {
        TASK_TENANT.scope(RefCell::new(None), future).await
    }

    /// Runs `future` with `tenant_id` installed in a fresh task-local slot.
    ///
    /// The slot, and the identifier in it, is dropped with the future whether it
    /// completes or is cancelled.
    pub async fn scope_with<F>(tenant_id: TenantId, future: F) -> F::Output
    where
        F: Future,
    {
        trace!(tenant_id = %tenant_id, "Tenant scope entered");
        TASK_TENANT.scope(RefCell::new(Some(tenant_id)), future).await
    }

    /// Runs `f` with `tenant_id` installed in the current thread's slot.
    ///
    /// Fails with [`TenantError::AlreadyBound`] if the thread already carries a
    /// tenant. The slot is cleared when `f` returns or unwinds.
    pub fn sync_scope<R>(tenant_id: TenantId, f: impl FnOnce() -> R) -> Result<R, TenantError> {
        let _guard = TenantGuard::install(tenant_id)?;
        Ok(f())
    }

    /// Installs `tenant_id` for the current execution unit.
    ///
    /// An installed identifier is immutable: installing over an existing one
    /// fails with [`TenantError::AlreadyBound`] and leaves the slot unchanged.
    pub fn install(tenant_id: TenantId) -> Result<(), TenantError> {
        Self::with_slot(|slot| match slot.as_ref() {
            Some(current) => Err(TenantError::AlreadyBound {
                current: current.clone(),
                attempted: tenant_id,
            }),
            None => {
                trace!(tenant_id = %tenant_id, "Tenant installed");
                *slot = Some(tenant_id);
                Ok(())
            }
        })
    }

    /// Returns the tenant bound to the current execution unit, if any.
    pub fn current() -> Option<TenantId> {
        Self::with_slot(|slot| slot.clone())
    }

    /// Returns true if a tenant is bound to the current execution unit.
    pub fn is_bound() -> bool {
        Self::with_slot(|slot| slot.is_some())
    }

    /// Clears the tenant bound to the current execution unit.
    ///
    /// Idempotent; calling it with nothing installed is a no-op.
    pub fn clear() {
        Self::with_slot(|slot| {
            if let Some(previous) = slot.take() {
                trace!(tenant_id = %previous, "Tenant cleared");
            }
        })
    }

    /// Applies `f` to the task-local slot when inside a [`scope`](Self::scope),
    /// otherwise to the thread-local slot.
    fn with_slot<R>(f: impl FnOnce(&mut Option<TenantId>) -> R) -> R {
        if TASK_TENANT.try_with(|_| ()).is_ok() {
            TASK_TENANT.with(|cell| f(&mut cell.borrow_mut()))
        } else {
            THREAD_TENANT.with(|cell| f(&mut cell.borrow_mut()))
        }
    }
}

/// Clears the current execution unit's tenant when dropped.
///
/// Returned by [`TenantGuard::install`]; holding it for the duration of a unit
/// of work guarantees the clear runs on every exit path, including panics and
/// early returns.
#[derive(Debug)]
#[must_use = "the tenant is cleared as soon as the guard is dropped"]
pub struct TenantGuard {
    tenant_id: TenantId,
}

impl TenantGuard {
    /// Installs `tenant_id` and returns a guard that clears it on drop.
    pub fn install(tenant_id: TenantId) -> Result<Self, TenantError> {
        TenantContext::install(tenant_id.clone())?;
        Ok(Self { tenant_id })
    }

    /// Returns the tenant this guard installed.
    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }
}

impl Drop for TenantGuard {
    fn drop(&mut self) {
        TenantContext::clear();
    }
}
