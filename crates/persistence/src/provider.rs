//! Schema-switching connection provider.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::core::{DataSource, MultiTenantConnectionProvider, PhysicalConnection};
use crate::error::{BackendError, ConnectionError, StorageResult};
use crate::strategy::SchemaPerTenantStrategy;
use crate::tenant::TenantId;

/// Steers pooled connections to one schema per tenant.
///
/// Wraps a [`DataSource`] and issues the strategy's schema-selection
/// statement on every tenant-scoped acquisition. Tenant-scoped connections
/// are always discarded on release.
///
/// # Example
///
/// ```
/// use stratum_persistence::backends::memory::MemoryDataSource;
/// use stratum_persistence::core::MultiTenantConnectionProvider;
/// use stratum_persistence::provider::SchemaPerTenantConnectionProvider;
/// use stratum_persistence::strategy::SchemaPerTenantStrategy;
/// use stratum_persistence::tenant::TenantId;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let data_source = MemoryDataSource::default();
/// data_source.create_schema("tenant1");
///
/// let provider =
///     SchemaPerTenantConnectionProvider::new(data_source.clone(), SchemaPerTenantStrategy::default());
/// let conn = provider.acquire_for_tenant("tenant1").await.unwrap();
/// assert_eq!(conn.current_schema(), Some("tenant1"));
///
/// provider.release_for_tenant(&TenantId::new("tenant1"), conn);
/// assert_eq!(data_source.stats().discarded, 1);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SchemaPerTenantConnectionProvider<D> {
    data_source: D,
    strategy: SchemaPerTenantStrategy,
}

impl<D: DataSource> SchemaPerTenantConnectionProvider<D> {
    /// Creates a provider over `data_source`.
    pub fn new(data_source: D, strategy: SchemaPerTenantStrategy) -> Self {
        Self {
            data_source,
            strategy,
        }
    }

    /// Returns the underlying pool.
    pub fn data_source(&self) -> &D {
        &self.data_source
    }

    /// Returns the schema strategy.
    pub fn strategy(&self) -> &SchemaPerTenantStrategy {
        &self.strategy
    }

    /// Points `conn` at the tenant's schema, failing if the schema is absent.
    async fn steer(&self, conn: &mut D::Connection, tenant_id: &TenantId) -> Result<(), BackendError> {
        conn.execute(&self.strategy.select_schema_sql(tenant_id)).await?;

        if self.strategy.dialect().switch_rejects_missing_schema() {
            return Ok(());
        }

        let schema = self.strategy.tenant_to_schema(tenant_id);
        if conn.schema_exists(&schema).await? {
            Ok(())
        } else {
            Err(BackendError::QueryError {
                message: format!("schema \"{}\" does not exist", schema),
            })
        }
    }
}

#[async_trait]
impl<D: DataSource> MultiTenantConnectionProvider for SchemaPerTenantConnectionProvider<D> {
    type Connection = D::Connection;

    async fn acquire_unscoped(&self) -> Result<Self::Connection, BackendError> {
        self.data_source.get_connection().await
    }

    fn release_unscoped(&self, conn: Self::Connection) {
        conn.release();
    }

    async fn acquire_for_tenant(&self, tenant_identifier: &str) -> StorageResult<Self::Connection> {
        let tenant_id =
            TenantId::parse(tenant_identifier).map_err(|_| ConnectionError::MissingTenantIdentifier)?;

        let mut conn = self.acquire_unscoped().await?;

        match self.steer(&mut conn, &tenant_id).await {
            Ok(()) => {
                debug!(
                    tenant_id = %tenant_id,
                    backend = self.data_source.name(),
                    "Switched connection to tenant schema"
                );
                Ok(conn)
            }
            Err(source) => {
                warn!(
                    tenant_id = %tenant_id,
                    backend = self.data_source.name(),
                    error = %source,
                    "Schema switch failed, discarding connection"
                );
                conn.discard();
                Err(ConnectionError::SchemaSwitchFailed { tenant_id, source }.into())
            }
        }
    }

    fn release_for_tenant(&self, tenant_id: &TenantId, conn: Self::Connection) {
        debug!(tenant_id = %tenant_id, "Releasing tenant connection");
        conn.discard();
    }
}
