//! Database backend implementations.
//!
//! Each backend provides a [`DataSource`](crate::core::DataSource) and a
//! [`UserRepository`](crate::core::UserRepository), and is gated behind a
//! feature flag.
//!
//! # Available Backends
//!
//! | Backend | Feature | Description |
//! |---------|---------|-------------|
//! | Memory | `memory` | In-process schemas, for development and tests |
//! | PostgreSQL | `postgres` | deadpool-postgres pool, `SET search_path` switching |

#[cfg(feature = "memory")]
pub mod memory;

#[cfg(feature = "postgres")]
pub mod postgres;
