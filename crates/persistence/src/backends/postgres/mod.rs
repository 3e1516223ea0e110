//! PostgreSQL backend implementation.
//!
//! Connections come from a deadpool-postgres pool. Tenant schemas are selected
//! with `SET search_path`, so the provider must be configured with
//! [`SchemaDialect::Postgres`](crate::strategy::SchemaDialect::Postgres).
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use stratum_persistence::backends::postgres::{
//!     PostgresConfig, PostgresDataSource, PostgresUserRepository,
//! };
//! use stratum_persistence::provider::SchemaPerTenantConnectionProvider;
//! use stratum_persistence::service::TenantUserStore;
//! use stratum_persistence::session::{MultiTenancyConfig, SessionFactory};
//! use stratum_persistence::strategy::{
//!     SchemaDialect, SchemaPerTenantConfig, SchemaPerTenantStrategy,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let data_source = PostgresDataSource::new(PostgresConfig::from_env())?;
//! let strategy = SchemaPerTenantStrategy::new(
//!     SchemaPerTenantConfig::new().with_dialect(SchemaDialect::Postgres),
//! );
//! let provider = Arc::new(SchemaPerTenantConnectionProvider::new(data_source, strategy));
//! let sessions = SessionFactory::with_config(provider, &MultiTenancyConfig::default());
//! let store = TenantUserStore::new(sessions, PostgresUserRepository::new(), "postgres");
//! # Ok(())
//! # }
//! ```
//!
//! # Schema
//!
//! Every tenant schema holds the same table:
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS "user" (
//!     user_no INTEGER PRIMARY KEY,
//!     user_id TEXT NOT NULL,
//!     user_pwd TEXT NOT NULL
//! );
//! ```

mod backend;
mod users;

pub use backend::{PostgresConfig, PostgresConnection, PostgresDataSource, PostgresSslMode};
pub use users::{PostgresUserRepository, USER_TABLE_DDL};
