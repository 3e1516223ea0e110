//! User repository for the memory backend.

use async_trait::async_trait;

use crate::core::UserRepository;
use crate::error::StorageResult;
use crate::types::User;

use super::backend::MemoryConnection;

/// [`UserRepository`] reading the `user` table of the connection's schema.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryUserRepository;

impl MemoryUserRepository {
    /// Creates a new repository.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    type Connection = MemoryConnection;

    async fn find_all(&self, conn: &mut MemoryConnection) -> StorageResult<Vec<User>> {
        let users = conn.with_user_table(
            "SELECT user_no, user_id, user_pwd FROM user ORDER BY user_no",
            |table| table.values().cloned().collect(),
        )?;
        Ok(users)
    }

    async fn find_by_id(
        &self,
        conn: &mut MemoryConnection,
        user_no: i32,
    ) -> StorageResult<Option<User>> {
        let user = conn.with_user_table(
            &format!("SELECT user_no, user_id, user_pwd FROM user WHERE user_no = {}", user_no),
            |table| table.get(&user_no).cloned(),
        )?;
        Ok(user)
    }

    async fn update_password(
        &self,
        conn: &mut MemoryConnection,
        user_no: i32,
        user_pwd: &str,
    ) -> StorageResult<Option<User>> {
        let user = conn.with_user_table(
            &format!("UPDATE user SET user_pwd = ? WHERE user_no = {}", user_no),
            |table| {
                table.get_mut(&user_no).map(|user| {
                    user.user_pwd = user_pwd.to_string();
                    user.clone()
                })
            },
        )?;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::memory::MemoryDataSource;
    use crate::core::{DataSource, PhysicalConnection};

    async fn steered(ds: &MemoryDataSource, schema: &str) -> MemoryConnection {
        let mut conn = ds.get_connection().await.unwrap();
        conn.execute(&format!("USE `{}`", schema)).await.unwrap();
        conn
    }

    fn seeded() -> MemoryDataSource {
        let ds = MemoryDataSource::default();
        ds.create_schema("tenant1");
        ds.create_schema("tenant2");
        ds.insert_user("tenant1", User::new(2, "bob", "b")).unwrap();
        ds.insert_user("tenant1", User::new(1, "alice", "a")).unwrap();
        ds.insert_user("tenant2", User::new(1, "zed", "z")).unwrap();
        ds
    }

    #[tokio::test]
    async fn test_find_all_reads_current_schema_only() {
        let ds = seeded();
        let repo = MemoryUserRepository::new();

        let mut conn = steered(&ds, "tenant1").await;
        let ids: Vec<_> = repo
            .find_all(&mut conn)
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.user_id)
            .collect();
        assert_eq!(ids, vec!["alice", "bob"]);

        let mut conn = steered(&ds, "tenant2").await;
        assert_eq!(repo.find_all(&mut conn).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_find_by_id() {
        let ds = seeded();
        let repo = MemoryUserRepository::new();
        let mut conn = steered(&ds, "tenant2").await;

        assert_eq!(
            repo.find_by_id(&mut conn, 1).await.unwrap().map(|u| u.user_id),
            Some("zed".to_string())
        );
        assert!(repo.find_by_id(&mut conn, 2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_password() {
        let ds = seeded();
        let repo = MemoryUserRepository::new();
        let mut conn = steered(&ds, "tenant1").await;

        let updated = repo.update_password(&mut conn, 1, "new").await.unwrap().unwrap();
        assert_eq!(updated.user_pwd, "new");
        assert_eq!(ds.users("tenant1").unwrap()[0].user_pwd, "new");
        assert_eq!(ds.users("tenant2").unwrap()[0].user_pwd, "z");

        assert!(repo.update_password(&mut conn, 99, "x").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unsteered_connection_fails() {
        let ds = seeded();
        let repo = MemoryUserRepository::new();
        let mut conn = ds.get_connection().await.unwrap();
        assert!(repo.find_all(&mut conn).await.is_err());
    }
}
