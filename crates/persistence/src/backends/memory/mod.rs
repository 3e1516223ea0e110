//! In-process memory backend.
//!
//! Emulates a database server with one schema per tenant: a bounded pool of
//! connections, each remembering the schema it was last steered to. It records
//! every statement and counts opened, returned and discarded connections,
//! which makes the connection protocol observable in tests.
//!
//! # Example
//!
//! ```
//! use stratum_persistence::backends::memory::{MemoryConfig, MemoryDataSource};
//! use stratum_persistence::types::User;
//!
//! let data_source = MemoryDataSource::new(MemoryConfig::default().with_max_connections(4));
//! data_source.create_schema("tenant1");
//! data_source.insert_user("tenant1", User::new(1, "alice", "secret")).unwrap();
//!
//! assert_eq!(data_source.users("tenant1").unwrap().len(), 1);
//! ```

mod backend;
mod users;

pub use backend::{MemoryConfig, MemoryConnection, MemoryDataSource, MemoryPoolStats, StatementRecord};
pub use users::MemoryUserRepository;
