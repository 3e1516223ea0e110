//! Current-tenant resolution for the persistence layer.
//!
//! The persistence layer asks a [`CurrentTenantResolver`] which tenant a new
//! session belongs to. The default implementation reads the request-scoped
//! [`TenantContext`].

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::context::TenantContext;
use super::id::TenantId;
use crate::error::TenantError;

/// Supplies the tenant identifier for the current execution unit.
pub trait CurrentTenantResolver: Send + Sync + fmt::Debug {
    /// Returns the tenant the current execution unit is acting for.
    fn resolve_current_tenant(&self) -> Result<TenantId, TenantError>;

    /// Whether sessions already open must be re-checked against the
    /// current tenant before they are reused.
    fn validate_existing_current_sessions(&self) -> bool {
        true
    }
}

/// What to do when no tenant is bound to the current execution unit.
///
/// Behind the tenant gate a tenant is always bound, so the fallback only
/// matters for work started outside a request: startup tasks, maintenance
/// jobs, or code paths that bypassed the gate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode", content = "tenant")]
pub enum TenantFallback {
    /// Fail with [`TenantError::Unbound`].
    #[default]
    Strict,

    /// Resolve to a fixed default tenant.
    Default(TenantId),
}

impl TenantFallback {
    /// Builds a fallback from an optional default tenant.
    pub fn from_default(default_tenant: Option<TenantId>) -> Self {
        match default_tenant {
            Some(tenant_id) => TenantFallback::Default(tenant_id),
            None => TenantFallback::Strict,
        }
    }
}

/// Resolves the current tenant from [`TenantContext`].
#[derive(Debug, Clone)]
pub struct ContextTenantResolver {
    fallback: TenantFallback,
    validate_sessions: bool,
}

impl ContextTenantResolver {
    /// Creates a strict resolver with session validation enabled.
    pub fn new() -> Self {
        Self {
            fallback: TenantFallback::Strict,
            validate_sessions: true,
        }
    }

    /// Sets the fallback used when no tenant is bound.
    pub fn with_fallback(mut self, fallback: TenantFallback) -> Self {
        self.fallback = fallback;
        self
    }

    /// Enables or disables re-validation of open sessions.
    pub fn with_session_validation(mut self, enabled: bool) -> Self {
        self.validate_sessions = enabled;
        self
    }

    /// Returns the configured fallback.
    pub fn fallback(&self) -> &TenantFallback {
        &self.fallback
    }
}

impl Default for ContextTenantResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl CurrentTenantResolver for ContextTenantResolver {
    fn resolve_current_tenant(&self) -> Result<TenantId, TenantError> {
        if let Some(tenant_id) = TenantContext::current() {
            return Ok(tenant_id);
        }

        match &self.fallback {
            TenantFallback::Strict => Err(TenantError::Unbound),
            TenantFallback::Default(tenant_id) => {
                debug!(tenant_id = %tenant_id, "No tenant bound, using default tenant");
                Ok(tenant_id.clone())
            }
        }
    }

    fn validate_existing_current_sessions(&self) -> bool {
        self.validate_sessions
    }
}
