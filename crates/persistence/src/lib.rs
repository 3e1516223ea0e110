//! Stratum Persistence Layer
//!
//! This crate routes every unit of work to the database schema of the tenant
//! it belongs to. One server process serves many tenants; each tenant's data
//! lives in its own schema, and connections are steered to that schema for
//! the duration of one session only.
//!
//! # Features
//!
//! - **Request-scoped identity**: a task-local tenant slot, cleared when the
//!   request's future completes, fails or is cancelled
//! - **Schema switching**: `USE` (MySQL) or `SET search_path` (PostgreSQL) on
//!   every tenant-scoped connection, with quoted identifiers
//! - **Discard on release**: tenant-scoped connections never return to the pool
//!
//! # Backend Features
//!
//! ```toml
//! [dependencies]
//! stratum-persistence = { version = "0.1", features = ["postgres"] }
//! ```
//!
//! - `memory` (default) - In-process schemas for development and tests
//! - `postgres` - PostgreSQL via deadpool-postgres
//!
//! # Architecture
//!
//! - [`tenant`] - Tenant identifier, allow-list, context carrier and resolver
//! - [`strategy`] - Schema naming and schema-selection statements
//! - [`core`] - Pool, connection, provider and storage traits
//! - [`provider`] - The schema-switching connection provider
//! - [`session`] - Resolver-then-provider session wiring
//! - [`service`] - User storage on top of sessions
//! - [`backends`] - Memory and PostgreSQL implementations
//! - [`error`] - Error types for all operations
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//!
//! use stratum_persistence::backends::memory::{MemoryDataSource, MemoryUserRepository};
//! use stratum_persistence::core::UserStorage;
//! use stratum_persistence::provider::SchemaPerTenantConnectionProvider;
//! use stratum_persistence::service::TenantUserStore;
//! use stratum_persistence::session::{MultiTenancyConfig, SessionFactory};
//! use stratum_persistence::strategy::SchemaPerTenantStrategy;
//! use stratum_persistence::tenant::{TenantContext, TenantId};
//! use stratum_persistence::types::User;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let data_source = MemoryDataSource::default();
//! data_source.create_schema("tenant1");
//! data_source.insert_user("tenant1", User::new(1, "alice", "secret")).unwrap();
//!
//! let provider = Arc::new(SchemaPerTenantConnectionProvider::new(
//!     data_source.clone(),
//!     SchemaPerTenantStrategy::default(),
//! ));
//! let sessions = SessionFactory::with_config(provider, &MultiTenancyConfig::default());
//! let store = TenantUserStore::new(sessions, MemoryUserRepository::new(), "memory");
//!
//! let users = TenantContext::scope_with(TenantId::new("tenant1"), store.list_users())
//!     .await
//!     .unwrap();
//! assert_eq!(users[0].user_id, "alice");
//!
//! // Outside a tenant scope, strict resolution refuses to guess.
//! assert!(store.list_users().await.is_err());
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod backends;
pub mod core;
pub mod error;
pub mod provider;
pub mod service;
pub mod session;
pub mod strategy;
pub mod tenant;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{StorageError, StorageResult};
pub use tenant::{TenantAllowList, TenantContext, TenantId};
pub use types::User;

// Re-export core traits
pub use core::{
    DataSource, MultiTenantConnectionProvider, PhysicalConnection, UserRepository, UserStorage,
};

// Re-export tenancy strategy
pub use strategy::{SchemaDialect, SchemaPerTenantConfig, SchemaPerTenantStrategy};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
