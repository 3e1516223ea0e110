//! Error types for the persistence layer.
//!
//! This module defines all error types used throughout the persistence layer,
//! following a hierarchy that separates tenant errors, connection protocol
//! errors, resource errors and errors raised by the underlying backend.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

use crate::tenant::TenantId;

/// The primary error type for all storage operations.
///
/// This enum encompasses all possible errors that can occur during persistence
/// operations, organized by category.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Tenant identity errors
    #[error(transparent)]
    Tenant(#[from] TenantError),

    /// Tenant-scoped connection protocol errors
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// Entity state errors
    #[error(transparent)]
    Resource(#[from] ResourceError),

    /// Backend-specific errors, passed through unmodified
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Errors related to the tenant identity of the current execution unit.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TenantError {
    /// A tenant identifier was empty or consisted only of whitespace.
    #[error("tenant identifier must not be blank")]
    BlankIdentifier,

    /// The resolver was asked for a tenant but none is bound to the current
    /// execution unit. This indicates a request that bypassed the tenant gate.
    #[error("no tenant bound to the current execution unit")]
    Unbound,

    /// A tenant is already bound to the current execution unit.
    #[error("tenant {current} already bound, refusing to install {attempted}")]
    AlreadyBound {
        current: TenantId,
        attempted: TenantId,
    },

    /// A session opened for one tenant was used while another tenant is bound.
    #[error("session opened for tenant {session_tenant} used while tenant {current_tenant} is bound")]
    SessionMismatch {
        session_tenant: TenantId,
        current_tenant: TenantId,
    },
}

/// Errors raised by the tenant-scoped connection protocol.
#[derive(Error, Debug)]
pub enum ConnectionError {
    /// `acquire_for_tenant` was called without a usable identifier.
    #[error("missing tenant identifier")]
    MissingTenantIdentifier,

    /// The schema-selection statement failed; the connection was discarded.
    #[error("could not switch to schema {tenant_id}")]
    SchemaSwitchFailed {
        tenant_id: TenantId,
        #[source]
        source: BackendError,
    },
}

/// Errors related to entity state.
#[derive(Error, Debug)]
pub enum ResourceError {
    /// The requested entity was not found in the tenant's schema.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },
}

/// Errors originating from the database backend.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The backend is currently unavailable.
    #[error("backend unavailable: {backend_name}")]
    Unavailable {
        backend_name: String,
        message: String,
    },

    /// Connection to the backend failed.
    #[error("connection failed to {backend_name}: {message}")]
    ConnectionFailed {
        backend_name: String,
        message: String,
    },

    /// Connection pool exhausted.
    #[error("connection pool exhausted for {backend_name}")]
    PoolExhausted { backend_name: String },

    /// The connection was already released back to the pool or discarded.
    #[error("connection already released")]
    ConnectionReleased,

    /// Internal backend error.
    #[error("internal error in {backend_name}: {message}")]
    Internal {
        backend_name: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Query execution error.
    #[error("query execution failed: {message}")]
    QueryError { message: String },
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
