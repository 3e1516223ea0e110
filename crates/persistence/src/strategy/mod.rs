//! Multitenancy strategy.
//!
//! Tenants are isolated with one database schema per tenant. A shared pool
//! hands out connections, and each tenant-scoped connection is steered to the
//! tenant's schema with a dialect-specific statement:
//!
//! - [`SchemaDialect::MySql`] - ``USE `<schema>` ``
//! - [`SchemaDialect::Postgres`] - `SET search_path TO "<schema>"`
//!
//! # Example
//!
//! ```
//! use stratum_persistence::strategy::{
//!     SchemaDialect, SchemaPerTenantConfig, SchemaPerTenantStrategy,
//! };
//! use stratum_persistence::tenant::TenantId;
//!
//! let strategy = SchemaPerTenantStrategy::new(
//!     SchemaPerTenantConfig::new().with_dialect(SchemaDialect::Postgres),
//! );
//! assert_eq!(
//!     strategy.select_schema_sql(&TenantId::new("tenant1")),
//!     "SET search_path TO \"tenant1\""
//! );
//! ```

mod schema_per_tenant;

pub use schema_per_tenant::{SchemaPerTenantConfig, SchemaPerTenantStrategy};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// SQL dialect used to select a tenant's schema.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaDialect {
    /// MySQL / MariaDB: `USE`, backtick-quoted.
    #[default]
    MySql,

    /// PostgreSQL: `SET search_path`, double-quoted.
    Postgres,
}

impl SchemaDialect {
    /// Returns the identifier quote character of this dialect.
    pub fn quote_char(&self) -> char {
        match self {
            SchemaDialect::MySql => '`',
            SchemaDialect::Postgres => '"',
        }
    }

    /// Returns true if the schema-selection statement itself fails for a
    /// missing schema.
    ///
    /// `USE` rejects an unknown database. PostgreSQL accepts any name in
    /// `search_path`, so a switch in that dialect must be followed by an
    /// existence check.
    pub fn switch_rejects_missing_schema(&self) -> bool {
        match self {
            SchemaDialect::MySql => true,
            SchemaDialect::Postgres => false,
        }
    }
}

impl fmt::Display for SchemaDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaDialect::MySql => write!(f, "mysql"),
            SchemaDialect::Postgres => write!(f, "postgres"),
        }
    }
}

impl FromStr for SchemaDialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(SchemaDialect::MySql),
            "postgres" | "postgresql" | "pg" => Ok(SchemaDialect::Postgres),
            _ => Err(format!(
                "Invalid schema dialect '{}'. Valid values: mysql, postgres",
                s
            )),
        }
    }
}
