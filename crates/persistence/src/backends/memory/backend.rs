//! In-process connection pool with schema-per-tenant semantics.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::trace;

use crate::core::{DataSource, PhysicalConnection};
use crate::error::BackendError;
use crate::strategy::{SchemaDialect, SchemaPerTenantConfig, SchemaPerTenantStrategy};
use crate::types::User;

const BACKEND_NAME: &str = "memory";

/// Statement logged for a schema existence lookup.
const SCHEMA_EXISTS: &str = "SELECT 1 FROM information_schema.schemata WHERE schema_name = ?";

/// Configuration for the memory backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Maximum number of connections handed out at once.
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,

    /// How long `get_connection` waits for capacity, in milliseconds.
    #[serde(default = "default_acquire_timeout_ms")]
    pub acquire_timeout_ms: u64,
}

fn default_max_connections() -> usize {
    10
}

fn default_acquire_timeout_ms() -> u64 {
    5000
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
            acquire_timeout_ms: default_acquire_timeout_ms(),
        }
    }
}

impl MemoryConfig {
    /// Sets the pool capacity.
    pub fn with_max_connections(mut self, max: usize) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the acquisition wait timeout.
    pub fn with_acquire_timeout_ms(mut self, timeout: u64) -> Self {
        self.acquire_timeout_ms = timeout;
        self
    }
}

/// One statement executed against the memory backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementRecord {
    /// Connection the statement ran on.
    pub connection_id: u64,
    /// Schema the connection was on when the statement started.
    pub schema: Option<String>,
    /// Statement text.
    pub statement: String,
}

/// Connection counters of a [`MemoryDataSource`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryPoolStats {
    /// Physical connections ever opened.
    pub created: u64,
    /// Connections handed back to the pool for reuse.
    pub returned: u64,
    /// Connections closed instead of being returned.
    pub discarded: u64,
    /// Connections waiting in the pool.
    pub idle: usize,
    /// Connections currently handed out.
    pub in_use: usize,
}

/// State a physical connection keeps between uses.
#[derive(Debug)]
struct PooledState {
    id: u64,
    schema: Option<String>,
}

type Table = BTreeMap<i32, User>;

struct Inner {
    config: MemoryConfig,
    permits: Arc<Semaphore>,
    idle: Mutex<Vec<PooledState>>,
    schemas: RwLock<HashMap<String, Table>>,
    statements: Mutex<Vec<StatementRecord>>,
    next_id: AtomicU64,
    created: AtomicU64,
    returned: AtomicU64,
    discarded: AtomicU64,
    available: AtomicBool,
}

/// In-process [`DataSource`] emulating a database server with one schema
/// per tenant.
///
/// Like a real pool, a returned connection keeps the schema it was last
/// steered to, so a reused connection is stale until steered again.
///
/// # Example
///
/// ```
/// use stratum_persistence::backends::memory::MemoryDataSource;
/// use stratum_persistence::core::{DataSource, PhysicalConnection};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let data_source = MemoryDataSource::default();
/// data_source.create_schema("tenant1");
///
/// let mut conn = data_source.get_connection().await.unwrap();
/// conn.execute("USE `tenant1`").await.unwrap();
/// assert_eq!(conn.current_schema(), Some("tenant1"));
///
/// conn.discard();
/// assert_eq!(data_source.stats().discarded, 1);
/// # }
/// ```
#[derive(Clone)]
pub struct MemoryDataSource {
    inner: Arc<Inner>,
}

impl Debug for MemoryDataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryDataSource")
            .field("config", &self.inner.config)
            .field("schemas", &self.inner.schemas.read().len())
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

impl Default for MemoryDataSource {
    fn default() -> Self {
        Self::new(MemoryConfig::default())
    }
}

impl MemoryDataSource {
    /// Creates an empty data source with no schemas.
    pub fn new(config: MemoryConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                permits: Arc::new(Semaphore::new(config.max_connections)),
                config,
                idle: Mutex::new(Vec::new()),
                schemas: RwLock::new(HashMap::new()),
                statements: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(1),
                created: AtomicU64::new(0),
                returned: AtomicU64::new(0),
                discarded: AtomicU64::new(0),
                available: AtomicBool::new(true),
            }),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &MemoryConfig {
        &self.inner.config
    }

    /// Creates an empty schema. Does nothing if it already exists.
    pub fn create_schema(&self, name: impl Into<String>) {
        self.inner.schemas.write().entry(name.into()).or_default();
    }

    /// Drops a schema and its data. Returns false if it did not exist.
    pub fn drop_schema(&self, name: &str) -> bool {
        self.inner.schemas.write().remove(name).is_some()
    }

    /// Returns true if the schema exists.
    pub fn has_schema(&self, name: &str) -> bool {
        self.inner.schemas.read().contains_key(name)
    }

    /// Inserts or replaces a user in an existing schema.
    pub fn insert_user(&self, schema: &str, user: User) -> Result<(), BackendError> {
        let mut schemas = self.inner.schemas.write();
        let table = schemas.get_mut(schema).ok_or_else(|| unknown_database(schema))?;
        table.insert(user.user_no, user);
        Ok(())
    }

    /// Returns the users stored in a schema, ordered by `user_no`.
    pub fn users(&self, schema: &str) -> Option<Vec<User>> {
        self.inner
            .schemas
            .read()
            .get(schema)
            .map(|table| table.values().cloned().collect())
    }

    /// Makes subsequent acquisitions fail with [`BackendError::Unavailable`].
    pub fn set_available(&self, available: bool) {
        self.inner.available.store(available, Ordering::SeqCst);
    }

    /// Returns every statement executed so far, in order.
    pub fn statements(&self) -> Vec<StatementRecord> {
        self.inner.statements.lock().clone()
    }

    /// Forgets all recorded statements.
    pub fn clear_statements(&self) {
        self.inner.statements.lock().clear();
    }

    /// Returns the connection counters.
    pub fn stats(&self) -> MemoryPoolStats {
        let in_use = self
            .inner
            .config
            .max_connections
            .saturating_sub(self.inner.permits.available_permits());
        MemoryPoolStats {
            created: self.inner.created.load(Ordering::SeqCst),
            returned: self.inner.returned.load(Ordering::SeqCst),
            discarded: self.inner.discarded.load(Ordering::SeqCst),
            idle: self.inner.idle.lock().len(),
            in_use,
        }
    }
}

#[async_trait]
impl DataSource for MemoryDataSource {
    type Connection = MemoryConnection;

    fn name(&self) -> &'static str {
        BACKEND_NAME
    }

    async fn get_connection(&self) -> Result<MemoryConnection, BackendError> {
        if !self.inner.available.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable {
                backend_name: BACKEND_NAME.to_string(),
                message: "data source marked unavailable".to_string(),
            });
        }

        let wait = Duration::from_millis(self.inner.config.acquire_timeout_ms);
        let permit = match tokio::time::timeout(wait, Arc::clone(&self.inner.permits).acquire_owned())
            .await
        {
            Ok(Ok(permit)) => permit,
            Ok(Err(_closed)) => {
                return Err(BackendError::Unavailable {
                    backend_name: BACKEND_NAME.to_string(),
                    message: "pool closed".to_string(),
                });
            }
            Err(_elapsed) => {
                return Err(BackendError::PoolExhausted {
                    backend_name: BACKEND_NAME.to_string(),
                });
            }
        };

        let state = match self.inner.idle.lock().pop() {
            Some(state) => state,
            None => {
                let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
                self.inner.created.fetch_add(1, Ordering::SeqCst);
                trace!(connection_id = id, "Opened memory connection");
                PooledState { id, schema: None }
            }
        };

        Ok(MemoryConnection {
            state: Some(state),
            pool: Arc::clone(&self.inner),
            _permit: permit,
        })
    }
}

/// A connection handed out by [`MemoryDataSource`].
pub struct MemoryConnection {
    state: Option<PooledState>,
    pool: Arc<Inner>,
    _permit: OwnedSemaphorePermit,
}

impl Debug for MemoryConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryConnection")
            .field("state", &self.state)
            .finish()
    }
}

impl MemoryConnection {
    /// Returns the physical connection's identifier.
    pub fn id(&self) -> u64 {
        self.state.as_ref().map_or(0, |state| state.id)
    }

    /// Returns the schema the connection is currently steered to.
    pub fn current_schema(&self) -> Option<&str> {
        self.state.as_ref().and_then(|state| state.schema.as_deref())
    }

    /// Runs `f` on the `user` table of the current schema, logging `statement`.
    pub(crate) fn with_user_table<T>(
        &mut self,
        statement: &str,
        f: impl FnOnce(&mut Table) -> T,
    ) -> Result<T, BackendError> {
        let schema = self.record(statement)?;
        let schema = schema.ok_or_else(|| BackendError::QueryError {
            message: "No database selected".to_string(),
        })?;

        let mut schemas = self.pool.schemas.write();
        let table = schemas
            .get_mut(&schema)
            .ok_or_else(|| unknown_database(&schema))?;
        Ok(f(table))
    }

    /// Logs a statement and returns the schema it runs in.
    fn record(&self, statement: &str) -> Result<Option<String>, BackendError> {
        let state = self.state.as_ref().ok_or(BackendError::ConnectionReleased)?;
        self.pool.statements.lock().push(StatementRecord {
            connection_id: state.id,
            schema: state.schema.clone(),
            statement: statement.to_string(),
        });
        Ok(state.schema.clone())
    }

    fn close(&mut self) {
        if let Some(state) = self.state.take() {
            self.pool.discarded.fetch_add(1, Ordering::SeqCst);
            trace!(connection_id = state.id, "Closed memory connection");
        }
    }
}

#[async_trait]
impl PhysicalConnection for MemoryConnection {
    async fn execute(&mut self, statement: &str) -> Result<(), BackendError> {
        self.record(statement)?;

        let (dialect, schema) =
            parse_schema_selection(statement).ok_or_else(|| BackendError::QueryError {
                message: format!("unsupported statement: {}", statement),
            })?;

        // `search_path` takes any name; only `USE` checks the schema.
        if dialect.switch_rejects_missing_schema() && !self.pool.schemas.read().contains_key(&schema)
        {
            return Err(unknown_database(&schema));
        }

        if let Some(state) = self.state.as_mut() {
            state.schema = Some(schema);
        }
        Ok(())
    }

    async fn schema_exists(&mut self, schema: &str) -> Result<bool, BackendError> {
        self.record(SCHEMA_EXISTS)?;
        Ok(self.pool.schemas.read().contains_key(schema))
    }

    fn release(mut self) {
        if let Some(state) = self.state.take() {
            trace!(connection_id = state.id, "Returned memory connection to pool");
            self.pool.idle.lock().push(state);
            self.pool.returned.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn discard(mut self) {
        self.close();
    }
}

impl Drop for MemoryConnection {
    fn drop(&mut self) {
        self.close();
    }
}

/// Accepts the schema-selection statement of either supported dialect.
fn parse_schema_selection(statement: &str) -> Option<(SchemaDialect, String)> {
    [SchemaDialect::MySql, SchemaDialect::Postgres]
        .into_iter()
        .find_map(|dialect| {
            SchemaPerTenantStrategy::new(SchemaPerTenantConfig::new().with_dialect(dialect))
                .parse_select_schema(statement)
                .map(|schema| (dialect, schema))
        })
}

fn unknown_database(schema: &str) -> BackendError {
    BackendError::QueryError {
        message: format!("Unknown database '{}'", schema),
    }
}
