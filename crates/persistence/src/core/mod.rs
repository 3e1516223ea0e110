//! Core storage traits and abstractions.
//!
//! This module provides the foundational traits for the persistence layer:
//!
//! - [`DataSource`] / [`PhysicalConnection`] - Connection pool abstraction
//! - [`MultiTenantConnectionProvider`] - Tenant-scoped connection protocol
//! - [`UserRepository`] - Queries on an already steered connection
//! - [`UserStorage`] - Business operations for the current tenant
//!
//! # Layering
//!
//! ```text
//! UserStorage
//!     └── SessionFactory (resolver once, provider once)
//!             ├── CurrentTenantResolver
//!             └── MultiTenantConnectionProvider
//!                     └── DataSource ── PhysicalConnection
//!     └── UserRepository
//! ```

pub mod backend;
pub mod provider;
pub mod repository;
pub mod storage;

// Re-export main types
pub use backend::{DataSource, PhysicalConnection};
pub use provider::MultiTenantConnectionProvider;
pub use repository::UserRepository;
pub use storage::UserStorage;
