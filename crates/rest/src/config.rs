//! Server configuration for the Stratum REST API.
//!
//! This module provides configuration types for the REST server, supporting
//! both programmatic configuration and environment variable overrides.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `REST_SERVER_PORT` | 8080 | Server port |
//! | `REST_SERVER_HOST` | 127.0.0.1 | Host to bind |
//! | `REST_LOG_LEVEL` | info | Log level |
//! | `REST_REQUEST_TIMEOUT` | 30 | Request timeout (seconds) |
//! | `REST_ENABLE_CORS` | true | Enable CORS |
//! | `REST_CORS_ORIGINS` | * | Allowed origins |
//! | `REST_CORS_METHODS` | GET,PUT,OPTIONS | Allowed methods |
//! | `REST_CORS_HEADERS` | Content-Type,Accept,X-Tenant-ID | Allowed headers |
//! | `REST_ALLOWED_TENANTS` | tenant1,tenant2 | Comma-separated tenant allow-list |
//! | `REST_DEFAULT_TENANT` | (unset) | Fallback tenant for unbound work; unset means strict |
//! | `REST_TENANT_HEADER` | X-Tenant-ID | Header carrying the tenant claim |
//! | `REST_STORAGE_BACKEND` | memory | Storage backend (memory, postgres) |
//! | `REST_SCHEMA_DIALECT` | (per backend) | Schema-selection dialect (mysql, postgres); postgres on the postgres backend |
//! | `REST_DATABASE_URL` | (unset) | Database connection string |
//! | `REST_VALIDATE_SESSIONS` | true | Re-check session tenant on every use |
//! | `REST_POOL_MAX_CONNECTIONS` | 10 | Connection pool size |
//! | `REST_POOL_WAIT_TIMEOUT_MS` | 5000 | Wait for a pooled connection (ms) |
//!
//! # Example
//!
//! ```rust
//! use stratum_rest::ServerConfig;
//!
//! let config = ServerConfig {
//!     port: 3000,
//!     allowed_tenants: "acme,globex".to_string(),
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! assert!(config.allow_list().unwrap().contains("acme"));
//! ```

use std::fmt;
use std::str::FromStr;

use axum::http::HeaderName;
use clap::Parser;
use stratum_persistence::error::TenantError;
use stratum_persistence::session::MultiTenancyConfig;
use stratum_persistence::strategy::{SchemaDialect, SchemaPerTenantConfig};
use stratum_persistence::tenant::{TenantAllowList, TenantId};
use thiserror::Error;

/// Storage backend the server runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackendMode {
    /// In-process schemas, lost on restart.
    #[default]
    Memory,
    /// PostgreSQL, one schema per tenant.
    Postgres,
}

impl fmt::Display for StorageBackendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackendMode::Memory => write!(f, "memory"),
            StorageBackendMode::Postgres => write!(f, "postgres"),
        }
    }
}

impl FromStr for StorageBackendMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" | "mem" => Ok(StorageBackendMode::Memory),
            "postgres" | "postgresql" | "pg" => Ok(StorageBackendMode::Postgres),
            _ => Err(format!(
                "unknown storage backend '{}', expected memory or postgres",
                s
            )),
        }
    }
}

/// Errors turning a [`ServerConfig`] into runtime components.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The allow-list contains an unusable entry.
    #[error("invalid tenant allow-list: {0}")]
    AllowList(#[source] TenantError),

    /// The default tenant is blank.
    #[error("invalid default tenant: {0}")]
    DefaultTenant(#[source] TenantError),

    /// The tenant header name is not a valid HTTP header name.
    #[error("invalid tenant header name '{0}'")]
    TenantHeader(String),

    /// The storage backend or schema dialect could not be parsed.
    #[error("{0}")]
    Invalid(String),

    /// The storage backend could not be constructed.
    #[error("storage backend setup failed: {0}")]
    Backend(#[from] stratum_persistence::StorageError),
}

/// Server configuration for the Stratum REST API.
///
/// This struct can be constructed from environment variables using [`ServerConfig::from_env`],
/// from command line arguments using [`ServerConfig::parse`], or programmatically.
#[derive(Debug, Clone, Parser)]
#[command(name = "stratum")]
#[command(about = "Schema-per-tenant user service")]
pub struct ServerConfig {
    /// Port to listen on.
    #[arg(short, long, env = "REST_SERVER_PORT", default_value = "8080")]
    pub port: u16,

    /// Host address to bind to.
    #[arg(long, env = "REST_SERVER_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "REST_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Request timeout in seconds.
    #[arg(long, env = "REST_REQUEST_TIMEOUT", default_value = "30")]
    pub request_timeout: u64,

    /// Enable CORS.
    #[arg(long, env = "REST_ENABLE_CORS", default_value = "true")]
    pub enable_cors: bool,

    /// Allowed CORS origins (comma-separated, or * for all).
    #[arg(long, env = "REST_CORS_ORIGINS", default_value = "*")]
    pub cors_origins: String,

    /// Allowed CORS methods (comma-separated, or * for all).
    #[arg(long, env = "REST_CORS_METHODS", default_value = "GET,PUT,OPTIONS")]
    pub cors_methods: String,

    /// Allowed CORS headers (comma-separated, or * for all).
    #[arg(
        long,
        env = "REST_CORS_HEADERS",
        default_value = "Content-Type,Accept,X-Tenant-ID"
    )]
    pub cors_headers: String,

    /// Tenants accepted at the request boundary (comma-separated).
    #[arg(long, env = "REST_ALLOWED_TENANTS", default_value = "tenant1,tenant2")]
    pub allowed_tenants: String,

    /// Tenant used when work runs without a bound tenant.
    ///
    /// Leaving this unset keeps resolution strict: unbound work fails.
    #[arg(long, env = "REST_DEFAULT_TENANT")]
    pub default_tenant: Option<String>,

    /// Header carrying the tenant claim.
    #[arg(long, env = "REST_TENANT_HEADER", default_value = "X-Tenant-ID")]
    pub tenant_header: String,

    /// Storage backend (memory, postgres).
    #[arg(long, env = "REST_STORAGE_BACKEND", default_value = "memory")]
    pub storage_backend: String,

    /// Schema-selection dialect (mysql, postgres). Follows the storage
    /// backend when unset.
    #[arg(long, env = "REST_SCHEMA_DIALECT")]
    pub schema_dialect: Option<String>,

    /// Database connection string.
    #[arg(long, env = "REST_DATABASE_URL")]
    pub database_url: Option<String>,

    /// Re-check that a session is used under the tenant it was opened for.
    #[arg(long, env = "REST_VALIDATE_SESSIONS", default_value = "true")]
    pub validate_sessions: bool,

    /// Maximum number of pooled connections.
    #[arg(long, env = "REST_POOL_MAX_CONNECTIONS", default_value = "10")]
    pub pool_max_connections: usize,

    /// How long to wait for a pooled connection, in milliseconds.
    #[arg(long, env = "REST_POOL_WAIT_TIMEOUT_MS", default_value = "5000")]
    pub pool_wait_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            log_level: "info".to_string(),
            request_timeout: 30,
            enable_cors: true,
            cors_origins: "*".to_string(),
            cors_methods: "GET,PUT,OPTIONS".to_string(),
            cors_headers: "Content-Type,Accept,X-Tenant-ID".to_string(),
            allowed_tenants: "tenant1,tenant2".to_string(),
            default_tenant: None,
            tenant_header: "X-Tenant-ID".to_string(),
            storage_backend: "memory".to_string(),
            schema_dialect: None,
            database_url: None,
            validate_sessions: true,
            pool_max_connections: 10,
            pool_wait_timeout_ms: 5000,
        }
    }
}

impl ServerConfig {
    /// Creates a new ServerConfig from environment variables.
    ///
    /// This is a convenience method that parses environment variables without
    /// requiring command line arguments.
    pub fn from_env() -> Self {
        Self::try_parse().unwrap_or_default()
    }

    /// Returns the socket address to bind to.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Parses the tenant allow-list.
    pub fn allow_list(&self) -> Result<TenantAllowList, ConfigError> {
        TenantAllowList::parse_list(&self.allowed_tenants).map_err(ConfigError::AllowList)
    }

    /// Parses the configured default tenant, if any.
    pub fn default_tenant_id(&self) -> Result<Option<TenantId>, ConfigError> {
        self.default_tenant
            .as_deref()
            .map(TenantId::parse)
            .transpose()
            .map_err(ConfigError::DefaultTenant)
    }

    /// Parses the tenant header name.
    pub fn tenant_header_name(&self) -> Result<HeaderName, ConfigError> {
        HeaderName::from_str(self.tenant_header.trim())
            .map_err(|_| ConfigError::TenantHeader(self.tenant_header.clone()))
    }

    /// Parses the storage backend.
    pub fn storage_backend_mode(&self) -> Result<StorageBackendMode, ConfigError> {
        self.storage_backend.parse().map_err(ConfigError::Invalid)
    }

    /// Parses the schema-selection dialect.
    ///
    /// Without an explicit dialect, the postgres backend selects schemas
    /// with `search_path` and the memory backend with `USE`.
    pub fn dialect(&self) -> Result<SchemaDialect, ConfigError> {
        match self.schema_dialect.as_deref() {
            Some(dialect) => dialect.parse().map_err(ConfigError::Invalid),
            None => Ok(match self.storage_backend_mode()? {
                StorageBackendMode::Postgres => SchemaDialect::Postgres,
                StorageBackendMode::Memory => SchemaDialect::MySql,
            }),
        }
    }

    /// Builds the schema strategy configuration.
    pub fn schema_config(&self) -> Result<SchemaPerTenantConfig, ConfigError> {
        Ok(SchemaPerTenantConfig::default().with_dialect(self.dialect()?))
    }

    /// Builds the resolution policy for the persistence layer.
    ///
    /// A configured default tenant selects default-fallback; otherwise
    /// resolution is strict.
    pub fn multitenancy(&self) -> Result<MultiTenancyConfig, ConfigError> {
        let mut config = MultiTenancyConfig::new().with_session_validation(self.validate_sessions);
        if let Some(default_tenant) = self.default_tenant_id()? {
            config = config.with_default_tenant(default_tenant);
        }
        Ok(config)
    }

    /// Validates the configuration and returns errors if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.port == 0 {
            errors.push("Port cannot be 0".to_string());
        }

        if self.request_timeout == 0 {
            errors.push("Request timeout cannot be 0".to_string());
        }

        if self.pool_max_connections == 0 {
            errors.push("Pool size cannot be 0".to_string());
        }

        match self.allow_list() {
            Ok(list) if list.is_empty() => {
                errors.push("Tenant allow-list cannot be empty".to_string())
            }
            Ok(list) => {
                if let Ok(Some(default_tenant)) = self.default_tenant_id() {
                    if !list.contains(default_tenant.as_str()) {
                        errors.push(format!(
                            "Default tenant '{}' is not in the allow-list",
                            default_tenant
                        ));
                    }
                }
            }
            Err(e) => errors.push(e.to_string()),
        }

        for result in [
            self.default_tenant_id().map(|_| ()),
            self.tenant_header_name().map(|_| ()),
            self.storage_backend_mode().map(|_| ()),
        ] {
            if let Err(e) = result {
                errors.push(e.to_string());
            }
        }

        // PostgreSQL has no `USE`; every tenant switch would fail.
        match (self.storage_backend_mode(), self.dialect()) {
            (Ok(StorageBackendMode::Postgres), Ok(SchemaDialect::MySql)) => errors.push(
                "Schema dialect 'mysql' cannot select schemas on the postgres backend".to_string(),
            ),
            (_, Err(e)) if self.schema_dialect.is_some() => errors.push(e.to_string()),
            _ => {}
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Creates a configuration suitable for testing.
    ///
    /// This uses ephemeral port 0 and disables features that might interfere
    /// with tests.
    pub fn for_testing() -> Self {
        Self {
            port: 0,
            log_level: "debug".to_string(),
            request_timeout: 5,
            enable_cors: false,
            pool_max_connections: 4,
            pool_wait_timeout_ms: 250,
            ..Default::default()
        }
    }
}
