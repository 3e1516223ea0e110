//! User route configuration.

use axum::{
    Router, middleware,
    routing::{get, put},
};
use stratum_persistence::core::UserStorage;

use crate::handlers;
use crate::middleware::{TenantGate, tenant_gate};
use crate::state::AppState;

/// Creates all REST API routes.
///
/// # Routes
///
/// ## Tenant-scoped (behind the gate)
/// - `GET /api/userlist` - List users
/// - `PUT /api/userpassword` - Change a password
///
/// ## Unscoped
/// - `GET /health` - Health check
/// - `GET /_liveness` - Liveness probe
pub fn create_routes<S>(state: AppState<S>, gate: TenantGate) -> Router
where
    S: UserStorage + Send + Sync + 'static,
{
    let tenant_routes = Router::new()
        .route("/api/userlist", get(handlers::list_users_handler::<S>))
        .route(
            "/api/userpassword",
            put(handlers::update_password_handler::<S>),
        )
        // Gate runs for matched routes only.
        .route_layer(middleware::from_fn_with_state(gate, tenant_gate));

    Router::new()
        .route("/health", get(handlers::health_handler::<S>))
        .route("/_liveness", get(handlers::liveness_handler))
        .merge(tenant_routes)
        .with_state(state)
}
