//! Tenant session wiring.
//!
//! A session is one unit of work against one tenant schema. Opening a session
//! asks the [`CurrentTenantResolver`] for the tenant exactly once and then the
//! [`MultiTenantConnectionProvider`] for a connection exactly once, with that
//! tenant.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::MultiTenantConnectionProvider;
use crate::error::{StorageResult, TenantError};
use crate::tenant::{
    ContextTenantResolver, CurrentTenantResolver, TenantContext, TenantFallback, TenantId,
};

/// Multi-tenancy settings for the session layer.
///
/// # Example
///
/// ```
/// use stratum_persistence::session::MultiTenancyConfig;
///
/// let config: MultiTenancyConfig = serde_json::from_str("{}").unwrap();
/// assert!(config.default_tenant.is_none());
/// assert!(config.validate_existing_sessions);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiTenancyConfig {
    /// Tenant used when none is bound. `None` makes resolution strict.
    #[serde(default)]
    pub default_tenant: Option<TenantId>,

    /// Re-check open sessions against the current tenant before each use.
    #[serde(default = "default_validate_existing_sessions")]
    pub validate_existing_sessions: bool,
}

fn default_validate_existing_sessions() -> bool {
    true
}

impl Default for MultiTenancyConfig {
    fn default() -> Self {
        Self {
            default_tenant: None,
            validate_existing_sessions: default_validate_existing_sessions(),
        }
    }
}

impl MultiTenancyConfig {
    /// Creates a strict configuration with session validation enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default tenant, enabling fallback resolution.
    pub fn with_default_tenant(mut self, tenant_id: TenantId) -> Self {
        self.default_tenant = Some(tenant_id);
        self
    }

    /// Enables or disables re-validation of open sessions.
    pub fn with_session_validation(mut self, enabled: bool) -> Self {
        self.validate_existing_sessions = enabled;
        self
    }

    /// Builds the resolver described by this configuration.
    pub fn resolver(&self) -> ContextTenantResolver {
        ContextTenantResolver::new()
            .with_fallback(TenantFallback::from_default(self.default_tenant.clone()))
            .with_session_validation(self.validate_existing_sessions)
    }
}

/// A connection steered to one tenant's schema, plus the tenant it was
/// opened for.
///
/// Dropping a session without closing it discards the connection.
#[derive(Debug)]
pub struct TenantSession<C> {
    tenant_id: TenantId,
    connection: C,
}

impl<C> TenantSession<C> {
    /// Returns the tenant this session was opened for.
    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    /// Returns the underlying connection.
    pub fn connection_mut(&mut self) -> &mut C {
        &mut self.connection
    }
}

/// Opens and closes tenant sessions.
pub struct SessionFactory<P> {
    provider: Arc<P>,
    resolver: Arc<dyn CurrentTenantResolver>,
}

impl<P> Clone for SessionFactory<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            resolver: Arc::clone(&self.resolver),
        }
    }
}

impl<P> std::fmt::Debug for SessionFactory<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionFactory")
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

impl<P: MultiTenantConnectionProvider> SessionFactory<P> {
    /// Creates a factory from a provider and an explicit resolver.
    pub fn new(provider: Arc<P>, resolver: Arc<dyn CurrentTenantResolver>) -> Self {
        Self { provider, resolver }
    }

    /// Creates a factory whose resolver reads the tenant context.
    pub fn with_config(provider: Arc<P>, config: &MultiTenancyConfig) -> Self {
        Self::new(provider, Arc::new(config.resolver()))
    }

    /// Returns the connection provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Opens a session for the current tenant.
    pub async fn open_session(&self) -> StorageResult<TenantSession<P::Connection>> {
        let tenant_id = self.resolver.resolve_current_tenant()?;
        let connection = self.provider.acquire_for_tenant(tenant_id.as_str()).await?;
        trace!(tenant_id = %tenant_id, "Session opened");
        Ok(TenantSession {
            tenant_id,
            connection,
        })
    }

    /// Checks that `session` still belongs to the tenant bound to the
    /// current execution unit.
    ///
    /// Reads the tenant context directly, so the resolver stays at one call
    /// per session. A session opened through the default tenant passes while
    /// nothing is bound. Always succeeds when session validation is disabled.
    pub fn verify_session(&self, session: &TenantSession<P::Connection>) -> Result<(), TenantError> {
        if !self.resolver.validate_existing_current_sessions() {
            return Ok(());
        }

        match TenantContext::current() {
            Some(current) if current != session.tenant_id => Err(TenantError::SessionMismatch {
                session_tenant: session.tenant_id.clone(),
                current_tenant: current,
            }),
            _ => Ok(()),
        }
    }

    /// Closes a session, discarding its connection.
    pub fn close_session(&self, session: TenantSession<P::Connection>) {
        trace!(tenant_id = %session.tenant_id, "Session closed");
        self.provider
            .release_for_tenant(&session.tenant_id, session.connection);
    }
}
