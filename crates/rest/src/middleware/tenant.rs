//! Tenant gate middleware.
//!
//! Reads the tenant claim from the tenant header, checks it against the
//! allow-list and runs the rest of the request with the tenant bound to the
//! request's task. Rejected requests never reach a handler.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::HeaderName},
    middleware::Next,
    response::{IntoResponse, Response},
};
use stratum_persistence::tenant::{TenantAllowList, TenantContext, TenantId};
use tracing::{debug, warn};

use crate::config::{ConfigError, ServerConfig};
use crate::error::RestError;

/// Default header name for tenant identification.
pub static X_TENANT_ID: HeaderName = HeaderName::from_static("x-tenant-id");

/// Admission check for the tenant claim of a request.
#[derive(Debug, Clone)]
pub struct TenantGate {
    header: HeaderName,
    header_label: String,
    allow_list: Arc<TenantAllowList>,
}

impl TenantGate {
    /// Creates a gate reading `header` and admitting tenants in `allow_list`.
    pub fn new(header: HeaderName, allow_list: TenantAllowList) -> Self {
        Self {
            header_label: header.as_str().to_string(),
            header,
            allow_list: Arc::new(allow_list),
        }
    }

    /// Builds the gate from the server configuration.
    pub fn from_config(config: &ServerConfig) -> Result<Self, ConfigError> {
        let mut gate = Self::new(config.tenant_header_name()?, config.allow_list()?);
        gate.header_label = config.tenant_header.trim().to_string();
        Ok(gate)
    }

    /// Returns the header this gate reads.
    pub fn header(&self) -> &HeaderName {
        &self.header
    }

    /// Returns the allow-list.
    pub fn allow_list(&self) -> &TenantAllowList {
        &self.allow_list
    }

    /// Decides whether a request with `headers` may proceed.
    ///
    /// Absent or blank claims are missing. Claims are compared exactly,
    /// without trimming, and a value that is not valid header text can never
    /// match an allow-listed tenant.
    pub fn admit(&self, headers: &HeaderMap) -> Result<TenantId, RestError> {
        let Some(value) = headers.get(&self.header) else {
            return Err(self.missing());
        };

        let Ok(claim) = value.to_str() else {
            return Err(RestError::UnknownTenant);
        };

        if claim.trim().is_empty() {
            return Err(self.missing());
        }

        self.allow_list
            .get(claim)
            .cloned()
            .ok_or(RestError::UnknownTenant)
    }

    fn missing(&self) -> RestError {
        RestError::MissingTenant {
            header: self.header_label.clone(),
        }
    }
}

/// Middleware function enforcing the tenant gate.
///
/// Use with `axum::middleware::from_fn_with_state`. On admission the tenant is
/// bound for the lifetime of the downstream future and also stored in the
/// request extensions; it is unbound when that future completes, fails or is
/// dropped.
pub async fn tenant_gate(
    State(gate): State<TenantGate>,
    mut request: Request,
    next: Next,
) -> Response {
    let tenant_id = match gate.admit(request.headers()) {
        Ok(tenant_id) => tenant_id,
        Err(rejection) => {
            warn!(
                method = %request.method(),
                path = %request.uri().path(),
                reason = %rejection,
                "Tenant gate rejected request"
            );
            return rejection.into_response();
        }
    };

    debug!(tenant_id = %tenant_id, "Binding tenant for request");
    request.extensions_mut().insert(tenant_id.clone());

    TenantContext::scope_with(tenant_id, next.run(request)).await
}
