//! Backend abstraction for connection pools.
//!
//! A [`DataSource`] hands out raw [`PhysicalConnection`]s. Connections carry
//! no tenant; steering them to a schema is the job of the
//! [`MultiTenantConnectionProvider`](super::MultiTenantConnectionProvider).

use std::fmt::Debug;

use async_trait::async_trait;

use crate::error::BackendError;

/// A pool of raw database connections.
///
/// `get_connection` may wait for pool capacity. Errors it returns are passed
/// through the tenant layer unmodified.
#[async_trait]
pub trait DataSource: Send + Sync + Debug {
    /// The type of raw connection handed out by this pool.
    type Connection: PhysicalConnection;

    /// Returns a human-readable name for this backend.
    fn name(&self) -> &'static str;

    /// Acquires a connection from the pool.
    async fn get_connection(&self) -> Result<Self::Connection, BackendError>;
}

/// A raw connection exclusively owned by the code path that acquired it.
///
/// Both [`release`](Self::release) and [`discard`](Self::discard) consume the
/// connection. A connection dropped without either is discarded, so a
/// cancelled unit of work never returns a schema-steered connection to the
/// pool.
#[async_trait]
pub trait PhysicalConnection: Send + Debug + Sized {
    /// Executes a statement that returns no rows.
    async fn execute(&mut self, statement: &str) -> Result<(), BackendError>;

    /// Returns true if the server has a schema named `schema`.
    async fn schema_exists(&mut self, schema: &str) -> Result<bool, BackendError>;

    /// Returns the connection to the pool for reuse.
    fn release(self);

    /// Closes the connection; it is never handed out again.
    fn discard(self);
}
