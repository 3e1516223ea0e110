//! Schema-per-tenant tenancy strategy.
//!
//! In this strategy, each tenant has a separate database schema named after
//! its identifier. Tenants share one connection pool, and every tenant-scoped
//! connection is re-steered with a schema-selection statement before use.

use serde::{Deserialize, Serialize};

use crate::tenant::TenantId;

use super::SchemaDialect;

/// Configuration for schema-per-tenant tenancy.
///
/// # Example
///
/// ```
/// use stratum_persistence::strategy::{SchemaDialect, SchemaPerTenantConfig};
///
/// let config = SchemaPerTenantConfig {
///     dialect: SchemaDialect::Postgres,
///     ..Default::default()
/// };
/// assert_eq!(config.schema_prefix, "");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaPerTenantConfig {
    /// SQL dialect of the schema-selection statement.
    #[serde(default)]
    pub dialect: SchemaDialect,

    /// Prefix for tenant schema names.
    ///
    /// The full schema name is `{prefix}{tenant_id}`. Empty by default, so the
    /// tenant identifier is the schema name.
    #[serde(default)]
    pub schema_prefix: String,
}

impl SchemaPerTenantConfig {
    /// Creates a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the schema-selection dialect.
    pub fn with_dialect(mut self, dialect: SchemaDialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Sets the schema prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.schema_prefix = prefix.into();
        self
    }
}

/// Schema-per-tenant tenancy strategy implementation.
///
/// Produces the schema-selection statement issued on every tenant-scoped
/// connection.
///
/// # Statements
///
/// | Dialect | Statement for tenant `acme` |
/// |---------|-----------------------------|
/// | MySQL | ``USE `acme` `` |
/// | PostgreSQL | `SET search_path TO "acme"` |
///
/// The schema name is always quoted, and quote characters inside it are
/// doubled, so an identifier can never terminate the statement early.
#[derive(Debug, Clone, Default)]
pub struct SchemaPerTenantStrategy {
    config: SchemaPerTenantConfig,
}

impl SchemaPerTenantStrategy {
    /// Creates a new schema-per-tenant strategy with the given configuration.
    pub fn new(config: SchemaPerTenantConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SchemaPerTenantConfig {
        &self.config
    }

    /// Returns the schema-selection dialect.
    pub fn dialect(&self) -> SchemaDialect {
        self.config.dialect
    }

    /// Converts a tenant ID to a schema name.
    pub fn tenant_to_schema(&self, tenant_id: &TenantId) -> String {
        format!("{}{}", self.config.schema_prefix, tenant_id.as_str())
    }

    /// Generates the statement that selects the tenant's schema.
    pub fn select_schema_sql(&self, tenant_id: &TenantId) -> String {
        let schema = self.escape_identifier(&self.tenant_to_schema(tenant_id));
        match self.config.dialect {
            SchemaDialect::MySql => format!("USE {}", schema),
            SchemaDialect::Postgres => format!("SET search_path TO {}", schema),
        }
    }

    /// Escapes a SQL identifier for the configured dialect.
    pub fn escape_identifier(&self, id: &str) -> String {
        let quote = self.config.dialect.quote_char();
        let doubled: String = [quote, quote].iter().collect();
        format!("{quote}{}{quote}", id.replace(quote, &doubled))
    }

    /// Parses a statement produced by [`select_schema_sql`](Self::select_schema_sql)
    /// back into the schema name it selects.
    ///
    /// Returns `None` for any other statement.
    pub fn parse_select_schema(&self, statement: &str) -> Option<String> {
        let rest = match self.config.dialect {
            SchemaDialect::MySql => statement.strip_prefix("USE ")?,
            SchemaDialect::Postgres => statement.strip_prefix("SET search_path TO ")?,
        };
        let quote = self.config.dialect.quote_char();
        let inner = rest.strip_prefix(quote)?.strip_suffix(quote)?;

        let mut schema = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            if c == quote && chars.next() != Some(quote) {
                // A lone quote means the identifier ended early.
                return None;
            }
            schema.push(c);
        }
        Some(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strategy(dialect: SchemaDialect) -> SchemaPerTenantStrategy {
        SchemaPerTenantStrategy::new(SchemaPerTenantConfig::new().with_dialect(dialect))
    }

    #[test]
    fn test_config_default() {
        let config = SchemaPerTenantConfig::default();
        assert_eq!(config.dialect, SchemaDialect::MySql);
        assert_eq!(config.schema_prefix, "");
    }

    #[test]
    fn test_config_serde_defaults() {
        let config: SchemaPerTenantConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, SchemaPerTenantConfig::default());

        let config: SchemaPerTenantConfig =
            serde_json::from_str(r#"{"dialect":"postgres","schema_prefix":"t_"}"#).unwrap();
        assert_eq!(config.dialect, SchemaDialect::Postgres);
        assert_eq!(config.schema_prefix, "t_");
    }

    #[test]
    fn test_tenant_to_schema_is_verbatim() {
        let strategy = strategy(SchemaDialect::MySql);
        assert_eq!(strategy.tenant_to_schema(&TenantId::new("Acme-Corp")), "Acme-Corp");

        let prefixed = SchemaPerTenantStrategy::new(SchemaPerTenantConfig::new().with_prefix("t_"));
        assert_eq!(prefixed.tenant_to_schema(&TenantId::new("acme")), "t_acme");
    }

    #[test]
    fn test_mysql_select_schema_sql() {
        let sql = strategy(SchemaDialect::MySql).select_schema_sql(&TenantId::new("tenant1"));
        assert_eq!(sql, "USE `tenant1`");
    }

    #[test]
    fn test_postgres_select_schema_sql() {
        let sql = strategy(SchemaDialect::Postgres).select_schema_sql(&TenantId::new("tenant1"));
        assert_eq!(sql, "SET search_path TO \"tenant1\"");
    }

    #[test]
    fn test_escape_identifier() {
        assert_eq!(
            strategy(SchemaDialect::MySql).escape_identifier("a`b"),
            "`a``b`"
        );
        assert_eq!(
            strategy(SchemaDialect::Postgres).escape_identifier("test\"schema"),
            "\"test\"\"schema\""
        );
    }

    #[test]
    fn test_hostile_identifier_stays_one_identifier() {
        let strategy = strategy(SchemaDialect::MySql);
        let tenant = TenantId::new("x`; DROP DATABASE y; --");
        let sql = strategy.select_schema_sql(&tenant);
        assert_eq!(sql, "USE `x``; DROP DATABASE y; --`");
        assert_eq!(
            strategy.parse_select_schema(&sql).as_deref(),
            Some("x`; DROP DATABASE y; --")
        );
    }

    #[test]
    fn test_parse_select_schema() {
        let pg = strategy(SchemaDialect::Postgres);
        assert_eq!(
            pg.parse_select_schema("SET search_path TO \"tenant2\"").as_deref(),
            Some("tenant2")
        );
        assert_eq!(pg.parse_select_schema("USE `tenant2`"), None);
        assert_eq!(pg.parse_select_schema("SELECT 1"), None);

        let mysql = strategy(SchemaDialect::MySql);
        assert_eq!(mysql.parse_select_schema("USE `a`b`"), None);
    }
}
