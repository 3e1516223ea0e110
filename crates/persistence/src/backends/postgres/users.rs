//! User repository for the PostgreSQL backend.

use async_trait::async_trait;
use tokio_postgres::Row;

use crate::core::UserRepository;
use crate::error::{BackendError, StorageResult};
use crate::types::User;

use super::backend::{PostgresConnection, query_error};

const SELECT_ALL: &str = r#"SELECT user_no, user_id, user_pwd FROM "user" ORDER BY user_no"#;
const SELECT_ONE: &str = r#"SELECT user_no, user_id, user_pwd FROM "user" WHERE user_no = $1"#;
const UPDATE_PASSWORD: &str = r#"UPDATE "user" SET user_pwd = $2 WHERE user_no = $1
RETURNING user_no, user_id, user_pwd"#;

/// DDL for the `user` table expected in every tenant schema.
pub const USER_TABLE_DDL: &str = r#"CREATE TABLE IF NOT EXISTS "user" (
    user_no INTEGER PRIMARY KEY,
    user_id TEXT NOT NULL,
    user_pwd TEXT NOT NULL
)"#;

/// [`UserRepository`] querying the `user` table on the connection's
/// `search_path`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresUserRepository;

impl PostgresUserRepository {
    /// Creates a new repository.
    pub fn new() -> Self {
        Self
    }
}

fn row_to_user(row: &Row) -> Result<User, BackendError> {
    Ok(User {
        user_no: row.try_get("user_no").map_err(query_error)?,
        user_id: row.try_get("user_id").map_err(query_error)?,
        user_pwd: row.try_get("user_pwd").map_err(query_error)?,
    })
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    type Connection = PostgresConnection;

    async fn find_all(&self, conn: &mut PostgresConnection) -> StorageResult<Vec<User>> {
        let rows = conn
            .client()?
            .query(SELECT_ALL, &[])
            .await
            .map_err(query_error)?;
        let users = rows.iter().map(row_to_user).collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    async fn find_by_id(
        &self,
        conn: &mut PostgresConnection,
        user_no: i32,
    ) -> StorageResult<Option<User>> {
        let row = conn
            .client()?
            .query_opt(SELECT_ONE, &[&user_no])
            .await
            .map_err(query_error)?;
        Ok(row.as_ref().map(row_to_user).transpose()?)
    }

    async fn update_password(
        &self,
        conn: &mut PostgresConnection,
        user_no: i32,
        user_pwd: &str,
    ) -> StorageResult<Option<User>> {
        let row = conn
            .client()?
            .query_opt(UPDATE_PASSWORD, &[&user_no, &user_pwd])
            .await
            .map_err(query_error)?;
        Ok(row.as_ref().map(row_to_user).transpose()?)
    }
}
