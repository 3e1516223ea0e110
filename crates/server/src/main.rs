//! Stratum server
//!
//! Serves the tenant-routed user API on one process for many tenants.

use clap::Parser;
use stratum_rest::{ServerConfig, StorageBackendMode, create_app_with_config, init_logging};
use tracing::info;

/// Starts the Axum HTTP server.
async fn serve(app: axum::Router, config: &ServerConfig) -> anyhow::Result<()> {
    let addr = config.socket_addr();
    info!(address = %addr, "Server listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();
    init_logging(&config.log_level);

    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("Configuration error: {}", error);
        }
        std::process::exit(1);
    }

    let backend_mode = config
        .storage_backend_mode()
        .map_err(|e| anyhow::anyhow!("Invalid storage backend configuration: {}", e))?;
    let dialect = config
        .dialect()
        .map_err(|e| anyhow::anyhow!("Invalid schema dialect configuration: {}", e))?;

    info!(
        port = config.port,
        host = %config.host,
        storage_backend = %backend_mode,
        schema_dialect = %dialect,
        tenants = %config.allowed_tenants,
        default_tenant = config.default_tenant.as_deref().unwrap_or("<strict>"),
        "Starting Stratum server"
    );

    match backend_mode {
        StorageBackendMode::Memory => start_memory(config).await,
        StorageBackendMode::Postgres => start_postgres(config).await,
    }
}

/// Starts the server on the in-process memory backend.
#[cfg(feature = "memory")]
async fn start_memory(config: ServerConfig) -> anyhow::Result<()> {
    use stratum_rest::storage::{memory_data_source, memory_store};

    let data_source = memory_data_source(&config)?;
    let store = memory_store(data_source, &config)?;
    let app = create_app_with_config(store, config.clone())?;
    serve(app, &config).await
}

/// Fallback when memory feature is not enabled.
#[cfg(not(feature = "memory"))]
async fn start_memory(_config: ServerConfig) -> anyhow::Result<()> {
    anyhow::bail!(
        "The memory backend requires the 'memory' feature. \
         Build with: cargo build -p stratum-server --features memory"
    )
}

/// Starts the server on PostgreSQL.
#[cfg(feature = "postgres")]
async fn start_postgres(config: ServerConfig) -> anyhow::Result<()> {
    use stratum_rest::storage::postgres_store;

    let store = postgres_store(&config)?;
    let app = create_app_with_config(store, config.clone())?;
    serve(app, &config).await
}

/// Fallback when postgres feature is not enabled.
#[cfg(not(feature = "postgres"))]
async fn start_postgres(_config: ServerConfig) -> anyhow::Result<()> {
    anyhow::bail!(
        "The postgres backend requires the 'postgres' feature. \
         Build with: cargo build -p stratum-server --features postgres"
    )
}
