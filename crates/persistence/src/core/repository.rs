//! Entity persistence mapping for the user table.

use async_trait::async_trait;

use crate::error::StorageResult;
use crate::types::User;

use super::backend::PhysicalConnection;

/// Runs user queries on a connection already steered to a tenant schema.
///
/// Implementations never select a schema themselves; whatever schema the
/// connection is on is the one queried.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// The connection type queries run on.
    type Connection: PhysicalConnection;

    /// Returns every user, ordered by `user_no`.
    async fn find_all(&self, conn: &mut Self::Connection) -> StorageResult<Vec<User>>;

    /// Returns the user with the given number, if any.
    async fn find_by_id(&self, conn: &mut Self::Connection, user_no: i32)
    -> StorageResult<Option<User>>;

    /// Sets a user's password and returns the updated row, or `None` if no
    /// such user exists.
    async fn update_password(
        &self,
        conn: &mut Self::Connection,
        user_no: i32,
        user_pwd: &str,
    ) -> StorageResult<Option<User>>;
}
