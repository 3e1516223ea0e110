//! Tenant extractor.
//!
//! Hands the tenant admitted by the gate to a handler.

use axum::{extract::FromRequestParts, http::request::Parts};
use stratum_persistence::tenant::TenantId;

use crate::error::RestError;

/// Axum extractor for the tenant admitted by [`tenant_gate`](crate::middleware::tenant_gate).
///
/// Handlers normally do not need this: storage calls resolve the tenant on
/// their own. It is useful for logging and for responses that echo the
/// tenant.
///
/// # Example
///
/// ```rust,ignore
/// use stratum_rest::extractors::CurrentTenant;
///
/// async fn handler(tenant: CurrentTenant) {
///     println!("Tenant ID: {}", tenant.tenant_id());
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentTenant(pub TenantId);

impl CurrentTenant {
    /// Returns the tenant ID.
    pub fn tenant_id(&self) -> &TenantId {
        &self.0
    }

    /// Consumes the extractor and returns the tenant ID.
    pub fn into_inner(self) -> TenantId {
        self.0
    }
}

impl std::fmt::Display for CurrentTenant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<S> FromRequestParts<S> for CurrentTenant
where
    S: Send + Sync,
{
    type Rejection = RestError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Only reachable on a route registered outside the gate.
        parts
            .extensions
            .get::<TenantId>()
            .cloned()
            .map(CurrentTenant)
            .ok_or_else(|| RestError::internal("tenant extractor used on an ungated route"))
    }
}
