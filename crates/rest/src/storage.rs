//! Assembly of the tenant-routed user store.
//!
//! Wires a data source into the schema-switching provider, the session
//! factory and the user store, using the policy from [`ServerConfig`].

use std::sync::Arc;

#[cfg(feature = "memory")]
use stratum_persistence::backends::memory::{MemoryConfig, MemoryDataSource, MemoryUserRepository};
#[cfg(feature = "postgres")]
use stratum_persistence::backends::postgres::{
    PostgresConfig, PostgresDataSource, PostgresUserRepository,
};
use stratum_persistence::core::DataSource;
use stratum_persistence::provider::SchemaPerTenantConnectionProvider;
use stratum_persistence::service::TenantUserStore;
use stratum_persistence::session::SessionFactory;
use stratum_persistence::strategy::SchemaPerTenantStrategy;
use tracing::info;

use crate::config::{ConfigError, ServerConfig};

/// User store over the in-process memory backend.
#[cfg(feature = "memory")]
pub type MemoryUserStore =
    TenantUserStore<SchemaPerTenantConnectionProvider<MemoryDataSource>, MemoryUserRepository>;

/// User store over PostgreSQL.
#[cfg(feature = "postgres")]
pub type PostgresUserStore =
    TenantUserStore<SchemaPerTenantConnectionProvider<PostgresDataSource>, PostgresUserRepository>;

fn sessions<D>(
    data_source: D,
    config: &ServerConfig,
) -> Result<SessionFactory<SchemaPerTenantConnectionProvider<D>>, ConfigError>
where
    D: DataSource,
{
    let strategy = SchemaPerTenantStrategy::new(config.schema_config()?);
    let provider = Arc::new(SchemaPerTenantConnectionProvider::new(data_source, strategy));
    Ok(SessionFactory::with_config(provider, &config.multitenancy()?))
}

/// Creates a memory data source sized from `config`.
///
/// Every allow-listed tenant gets an empty schema.
#[cfg(feature = "memory")]
pub fn memory_data_source(config: &ServerConfig) -> Result<MemoryDataSource, ConfigError> {
    let data_source = MemoryDataSource::new(
        MemoryConfig::default()
            .with_max_connections(config.pool_max_connections)
            .with_acquire_timeout_ms(config.pool_wait_timeout_ms),
    );
    for tenant in config.allow_list()?.iter() {
        data_source.create_schema(tenant.as_str());
    }
    Ok(data_source)
}

/// Builds a user store over an existing memory data source.
#[cfg(feature = "memory")]
pub fn memory_store(
    data_source: MemoryDataSource,
    config: &ServerConfig,
) -> Result<MemoryUserStore, ConfigError> {
    info!(
        max_connections = data_source.config().max_connections,
        dialect = %config.dialect()?,
        "Initializing memory backend"
    );
    Ok(TenantUserStore::new(
        sessions(data_source, config)?,
        MemoryUserRepository::new(),
        "memory",
    ))
}

/// Builds a user store over PostgreSQL.
///
/// Uses `REST_DATABASE_URL` when set, otherwise the `STRATUM_PG_*`
/// environment variables. The pool connects lazily.
#[cfg(feature = "postgres")]
pub fn postgres_store(config: &ServerConfig) -> Result<PostgresUserStore, ConfigError> {
    let pg_config = match config.database_url.as_deref() {
        Some(url) => PostgresConfig::from_connection_string(url)?,
        None => PostgresConfig::from_env(),
    }
    .with_max_connections(config.pool_max_connections)
    .with_pool_wait_timeout_ms(config.pool_wait_timeout_ms);

    info!(
        host = %pg_config.host,
        port = pg_config.port,
        dbname = %pg_config.dbname,
        dialect = %config.dialect()?,
        "Initializing PostgreSQL backend"
    );

    let data_source = PostgresDataSource::new(pg_config)?;
    Ok(TenantUserStore::new(
        sessions(data_source, config)?,
        PostgresUserRepository::new(),
        "postgres",
    ))
}

#[cfg(all(test, feature = "memory"))]
mod tests {
    use super::*;
    use stratum_persistence::core::UserStorage;
    use stratum_persistence::tenant::{TenantContext, TenantId};

    #[test]
    fn test_memory_data_source_has_allow_listed_schemas() {
        let data_source = memory_data_source(&ServerConfig::for_testing()).unwrap();
        assert!(data_source.has_schema("tenant1"));
        assert!(data_source.has_schema("tenant2"));
        assert!(!data_source.has_schema("tenant9"));
        assert_eq!(data_source.config().max_connections, 4);
    }

    #[tokio::test]
    async fn test_memory_store_uses_configured_dialect() {
        let config = ServerConfig {
            schema_dialect: Some("postgres".to_string()),
            ..ServerConfig::for_testing()
        };
        let data_source = memory_data_source(&config).unwrap();
        let store = memory_store(data_source.clone(), &config).unwrap();

        let users = TenantContext::scope_with(TenantId::new("tenant1"), store.list_users())
            .await
            .unwrap();
        assert!(users.is_empty());
        assert_eq!(
            data_source.statements()[0].statement,
            "SET search_path TO \"tenant1\""
        );
    }

    #[tokio::test]
    async fn test_memory_store_default_tenant_fallback() {
        let config = ServerConfig {
            default_tenant: Some("tenant2".to_string()),
            ..ServerConfig::for_testing()
        };
        let data_source = memory_data_source(&config).unwrap();
        let store = memory_store(data_source.clone(), &config).unwrap();

        assert!(store.list_users().await.is_ok());
        assert_eq!(data_source.statements()[0].statement, "USE `tenant2`");
    }
}
