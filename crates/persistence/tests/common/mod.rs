//! Test infrastructure for the persistence layer.
//!
//! Builds memory-backed stores seeded with two tenant schemas.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use stratum_persistence::backends::memory::{MemoryConfig, MemoryDataSource, MemoryUserRepository};
use stratum_persistence::error::TenantError;
use stratum_persistence::provider::SchemaPerTenantConnectionProvider;
use stratum_persistence::service::TenantUserStore;
use stratum_persistence::session::{MultiTenancyConfig, SessionFactory};
use stratum_persistence::strategy::SchemaPerTenantStrategy;
use stratum_persistence::tenant::{ContextTenantResolver, CurrentTenantResolver, TenantId};
use stratum_persistence::types::User;

pub type MemoryProvider = SchemaPerTenantConnectionProvider<MemoryDataSource>;
pub type MemoryStore = TenantUserStore<MemoryProvider, MemoryUserRepository>;

/// A memory data source with `tenant1` (alice, bob) and `tenant2` (carol).
pub fn seeded_data_source(max_connections: usize) -> MemoryDataSource {
    let data_source = MemoryDataSource::new(
        MemoryConfig::default()
            .with_max_connections(max_connections)
            .with_acquire_timeout_ms(250),
    );
    data_source.create_schema("tenant1");
    data_source.create_schema("tenant2");
    data_source
        .insert_user("tenant1", User::new(1, "alice", "alice-pw"))
        .unwrap();
    data_source
        .insert_user("tenant1", User::new(2, "bob", "bob-pw"))
        .unwrap();
    data_source
        .insert_user("tenant2", User::new(1, "carol", "carol-pw"))
        .unwrap();
    data_source
}

pub fn provider(data_source: &MemoryDataSource) -> Arc<MemoryProvider> {
    Arc::new(SchemaPerTenantConnectionProvider::new(
        data_source.clone(),
        SchemaPerTenantStrategy::default(),
    ))
}

/// A store over `data_source` using the context resolver built from `config`.
pub fn store(data_source: &MemoryDataSource, config: &MultiTenancyConfig) -> MemoryStore {
    let sessions = SessionFactory::with_config(provider(data_source), config);
    TenantUserStore::new(sessions, MemoryUserRepository::new(), "memory")
}

/// A store whose resolver counts how often it is asked.
pub fn counting_store(data_source: &MemoryDataSource) -> (MemoryStore, Arc<CountingResolver>) {
    let resolver = Arc::new(CountingResolver::default());
    let sessions = SessionFactory::new(provider(data_source), resolver.clone());
    (
        TenantUserStore::new(sessions, MemoryUserRepository::new(), "memory"),
        resolver,
    )
}

/// Resolver that delegates to the context resolver and counts calls.
#[derive(Debug, Default)]
pub struct CountingResolver {
    inner: ContextTenantResolver,
    calls: AtomicUsize,
}

impl CountingResolver {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CurrentTenantResolver for CountingResolver {
    fn resolve_current_tenant(&self) -> Result<TenantId, TenantError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.resolve_current_tenant()
    }

    fn validate_existing_current_sessions(&self) -> bool {
        self.inner.validate_existing_current_sessions()
    }
}

/// Statements whose text starts with `prefix`.
pub fn statements_starting_with(data_source: &MemoryDataSource, prefix: &str) -> Vec<String> {
    data_source
        .statements()
        .into_iter()
        .filter(|record| record.statement.starts_with(prefix))
        .map(|record| record.statement)
        .collect()
}
