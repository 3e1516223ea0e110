//! Tenant identifier type.
//!
//! This module defines the [`TenantId`] type, an opaque identifier for tenants.
//! In the schema-per-tenant model the identifier is also the name of the
//! database schema holding the tenant's data.

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TenantError;

/// An opaque, non-blank tenant identifier.
///
/// The identifier doubles as the target schema name. It carries no format
/// constraint beyond being non-blank; membership in the allow-list is checked
/// separately by [`TenantAllowList`](super::TenantAllowList).
///
/// # Examples
///
/// ```
/// use stratum_persistence::tenant::TenantId;
///
/// let tenant: TenantId = "tenant1".parse().unwrap();
/// assert_eq!(tenant.as_str(), "tenant1");
///
/// assert!(TenantId::parse("   ").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TenantId(String);

impl TenantId {
    /// Creates a tenant ID from a value known to be valid.
    ///
    /// Use [`TenantId::parse`] for values coming from requests or configuration.
    ///
    /// # Panics
    ///
    /// Panics if `id` is empty or consists only of whitespace.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        assert!(!id.trim().is_empty(), "tenant identifier must not be blank");
        Self(id)
    }

    /// Parses a tenant ID, rejecting blank input.
    ///
    /// The value is kept verbatim; surrounding whitespace is not stripped, so
    /// `" tenant1"` and `"tenant1"` are different identifiers.
    pub fn parse(id: &str) -> Result<Self, TenantError> {
        if id.trim().is_empty() {
            return Err(TenantError::BlankIdentifier);
        }
        Ok(Self(id.to_string()))
    }

    /// Returns the tenant ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the ID and returns the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TenantId({})", self.0)
    }
}

impl FromStr for TenantId {
    type Err = TenantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TenantId::parse(s)
    }
}

impl TryFrom<String> for TenantId {
    type Error = TenantError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        if s.trim().is_empty() {
            return Err(TenantError::BlankIdentifier);
        }
        Ok(Self(s))
    }
}

impl TryFrom<&str> for TenantId {
    type Error = TenantError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        TenantId::parse(s)
    }
}

impl From<TenantId> for String {
    fn from(id: TenantId) -> Self {
        id.0
    }
}

impl Borrow<str> for TenantId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TenantId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
