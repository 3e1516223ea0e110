//! # stratum-rest - HTTP front end for schema-per-tenant storage
//!
//! This crate exposes the Stratum user service over HTTP. Every tenant-scoped
//! request passes through a tenant gate that reads the `X-Tenant-ID` header,
//! checks it against a static allow-list and binds the tenant to the
//! request's task. Storage calls made while handling the request are routed
//! to that tenant's schema without the handler naming the tenant.
//!
//! ## Features
//!
//! - **Tenant gate**: 400 for a missing claim, 404 for an unknown one, before
//!   any handler or connection is touched
//! - **Request-scoped identity**: the tenant is unbound when the request
//!   finishes, fails or is cancelled
//! - **Opaque failures**: database errors are logged and answered with a
//!   generic 500
//!
//! ## Backend Support
//!
//! - `memory` - In-process schemas (default, for development and tests)
//! - `postgres` - PostgreSQL via deadpool-postgres
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stratum_rest::{ServerConfig, create_app_with_config, storage};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::default();
//!     let data_source = storage::memory_data_source(&config)?;
//!     let store = storage::memory_store(data_source, &config)?;
//!
//!     let app = create_app_with_config(store, config.clone())?;
//!
//!     let listener = tokio::net::TcpListener::bind(config.socket_addr()).await?;
//!     axum::serve(listener, app).await?;
//!
//!     Ok(())
//! }
//! ```

// Enforce documentation
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod routing;
pub mod state;
#[cfg(any(feature = "memory", feature = "postgres"))]
pub mod storage;

// Re-export commonly used types
pub use config::{ConfigError, ServerConfig, StorageBackendMode};
pub use error::{RestError, RestResult};
pub use middleware::TenantGate;
pub use state::AppState;

use std::sync::Arc;

use axum::Router;
use stratum_persistence::core::UserStorage;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

/// Creates the Axum application with default configuration.
///
/// For more control, use [`create_app_with_config`].
pub fn create_app<S>(storage: S) -> Result<Router, ConfigError>
where
    S: UserStorage + Send + Sync + 'static,
{
    create_app_with_config(storage, ServerConfig::default())
}

/// Creates the Axum application with custom configuration.
///
/// Fails if the allow-list or tenant header in `config` cannot be parsed.
pub fn create_app_with_config<S>(storage: S, config: ServerConfig) -> Result<Router, ConfigError>
where
    S: UserStorage + Send + Sync + 'static,
{
    let gate = TenantGate::from_config(&config)?;

    info!(
        backend = storage.backend_name(),
        tenants = gate.allow_list().len(),
        header = %gate.header(),
        "Creating REST API server"
    );

    let state = AppState::new(Arc::new(storage), config.clone());
    let router = routing::create_routes(state, gate);

    let service_builder = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            axum::http::StatusCode::REQUEST_TIMEOUT,
            std::time::Duration::from_secs(config.request_timeout),
        ));

    let router = if config.enable_cors {
        let cors = build_cors_layer(&config);
        router.layer(cors)
    } else {
        router
    };

    Ok(router.layer(service_builder))
}

/// Builds the CORS layer based on configuration.
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let mut cors = CorsLayer::new();

    if config.cors_origins == "*" {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors = cors.allow_origin(origins);
    }

    if config.cors_methods == "*" {
        cors = cors.allow_methods(Any);
    } else {
        let methods: Vec<_> = config
            .cors_methods
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors = cors.allow_methods(methods);
    }

    if config.cors_headers == "*" {
        cors = cors.allow_headers(Any);
    } else {
        let headers: Vec<_> = config
            .cors_headers
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors = cors.allow_headers(headers);
    }

    cors
}

/// Initializes the tracing subscriber for logging.
///
/// This should be called once at application startup. `RUST_LOG` takes
/// precedence over `level`.
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "stratum_rest={level},stratum_persistence={level},stratum_server={level},tower_http=debug"
        ))
    });

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
