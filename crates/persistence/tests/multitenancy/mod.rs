//! Multitenancy tests for the persistence layer.
//!
//! This module contains tests for tenant isolation, context propagation and
//! the session wiring between resolver and provider.

pub mod carrier_tests;
pub mod isolation_tests;
