//! Closed set of tenants the server accepts.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::id::TenantId;
use crate::error::TenantError;

/// The closed set of tenant identifiers accepted at the request boundary.
///
/// The list is fixed for the lifetime of the process. Lookups are exact:
/// no trimming or case folding is applied to the claim being checked.
///
/// # Examples
///
/// ```
/// use stratum_persistence::tenant::TenantAllowList;
///
/// let allow_list = TenantAllowList::parse_list("tenant1, tenant2").unwrap();
/// assert!(allow_list.contains("tenant1"));
/// assert!(!allow_list.contains("tenant9"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantAllowList {
    tenants: BTreeSet<TenantId>,
}

impl TenantAllowList {
    /// Creates an allow-list from already validated identifiers.
    pub fn new(tenants: impl IntoIterator<Item = TenantId>) -> Self {
        Self {
            tenants: tenants.into_iter().collect(),
        }
    }

    /// Parses a comma-separated list of identifiers.
    ///
    /// Entries are trimmed and empty entries are skipped, so trailing commas
    /// are tolerated.
    pub fn parse_list(list: &str) -> Result<Self, TenantError> {
        let tenants = list
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(TenantId::parse)
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(Self { tenants })
    }

    /// Returns the allow-listed identifier equal to `claim`, if any.
    pub fn get(&self, claim: &str) -> Option<&TenantId> {
        self.tenants.get(claim)
    }

    /// Returns true if `claim` is allow-listed.
    pub fn contains(&self, claim: &str) -> bool {
        self.get(claim).is_some()
    }

    /// Returns the number of allow-listed tenants.
    pub fn len(&self) -> usize {
        self.tenants.len()
    }

    /// Returns true if no tenant is allow-listed.
    pub fn is_empty(&self) -> bool {
        self.tenants.is_empty()
    }

    /// Iterates over the allow-listed tenants in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &TenantId> {
        self.tenants.iter()
    }
}

impl FromIterator<TenantId> for TenantAllowList {
    fn from_iter<I: IntoIterator<Item = TenantId>>(iter: I) -> Self {
        Self::new(iter)
    }
}
