//! Common test utilities for REST API testing.
//!
//! Builds the full application over a memory backend seeded with
//! `tenant1` (alice, bob) and `tenant2` (carol). `tenant3` is allow-listed
//! but has no schema.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::Router;
use axum::http::HeaderName;
use axum_test::TestServer;
use stratum_persistence::backends::memory::{MemoryDataSource, MemoryUserRepository};
use stratum_persistence::error::TenantError;
use stratum_persistence::provider::SchemaPerTenantConnectionProvider;
use stratum_persistence::service::TenantUserStore;
use stratum_persistence::session::SessionFactory;
use stratum_persistence::strategy::SchemaPerTenantStrategy;
use stratum_persistence::tenant::{CurrentTenantResolver, TenantId};
use stratum_persistence::types::User;
use stratum_rest::{ServerConfig, create_app_with_config, storage};

pub const X_TENANT_ID: HeaderName = HeaderName::from_static("x-tenant-id");

/// Resolver that delegates to the configured policy and counts calls.
#[derive(Debug)]
pub struct CountingResolver {
    inner: Box<dyn CurrentTenantResolver>,
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

/// The application under test plus handles on its internals.
pub struct TestApp {
    pub server: TestServer,
    pub router: Router,
    pub data_source: MemoryDataSource,
    pub resolver: Arc<CountingResolver>,
    pub config: ServerConfig,
}

impl TestApp {
    /// Builds the app with the test configuration.
    pub fn new() -> Self {
        Self::with_config(ServerConfig {
            allowed_tenants: "tenant1,tenant2,tenant3".to_string(),
            ..ServerConfig::for_testing()
        })
    }

    /// Builds the app with `config`.
    pub fn with_config(config: ServerConfig) -> Self {
        let data_source = storage::memory_data_source(&config).expect("memory data source");
        data_source.drop_schema("tenant3");
        seed_users(&data_source);

        let resolver = Arc::new(CountingResolver {
            inner: Box::new(config.multitenancy().expect("multitenancy").resolver()),
            calls: AtomicUsize::new(0),
        });
        let strategy = SchemaPerTenantStrategy::new(config.schema_config().expect("dialect"));
        let provider = Arc::new(SchemaPerTenantConnectionProvider::new(
            data_source.clone(),
            strategy,
        ));
        let sessions = SessionFactory::new(provider, resolver.clone());
        let store = TenantUserStore::new(sessions, MemoryUserRepository::new(), "memory");

        let router = create_app_with_config(store, config.clone()).expect("app");
        let server = TestServer::new(router.clone()).expect("Failed to create test server");

        Self {
            server,
            router,
            data_source,
            resolver,
            config,
        }
    }

    /// Statements the backend saw, in order.
    pub fn statements(&self) -> Vec<String> {
        self.data_source
            .statements()
            .into_iter()
            .map(|record| record.statement)
            .collect()
    }

    /// Statements starting with `prefix`.
    pub fn statements_starting_with(&self, prefix: &str) -> Vec<String> {
        self.statements()
            .into_iter()
            .filter(|statement| statement.starts_with(prefix))
            .collect()
    }
}

fn seed_users(data_source: &MemoryDataSource) {
    for (schema, user) in [
        ("tenant1", User::new(1, "alice", "alice-pw")),
        ("tenant1", User::new(2, "bob", "bob-pw")),
        ("tenant2", User::new(1, "carol", "carol-pw")),
    ] {
        data_source.insert_user(schema, user).expect("seed user");
    }
}

/// Extracts the `userId` values of a user list body.
pub fn user_ids(body: &serde_json::Value) -> Vec<String> {
    body.as_array()
        .expect("array body")
        .iter()
        .map(|user| user["userId"].as_str().unwrap_or_default().to_string())
        .collect()
}
