//! Health endpoints. Both sit outside the tenant gate and never open a
//! tenant session.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use stratum_persistence::core::UserStorage;
use tracing::debug;

use crate::state::AppState;

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    /// Always `"healthy"` while the process serves requests.
    pub status: &'static str,
    /// Storage backend name.
    pub backend: &'static str,
    /// Schema-selection dialect in use.
    pub dialect: Option<String>,
    /// Header clients must send the tenant claim in.
    pub tenant_header: String,
    /// RFC 3339 time of the check.
    pub timestamp: String,
}

/// `GET /health`: reports the backend and how tenants are addressed.
pub async fn health_handler<S>(State(state): State<AppState<S>>) -> Json<HealthReport>
where
    S: UserStorage + Send + Sync,
{
    debug!("Processing health check request");

    let config = state.config();
    Json(HealthReport {
        status: "healthy",
        backend: state.storage().backend_name(),
        dialect: config.dialect().ok().map(|dialect| dialect.to_string()),
        tenant_header: config.tenant_header.trim().to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// `GET /_liveness`
pub async fn liveness_handler() -> impl IntoResponse {
    StatusCode::OK
}
