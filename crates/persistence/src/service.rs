//! User storage backed by tenant sessions.

use async_trait::async_trait;
use tracing::debug;

use crate::core::{MultiTenantConnectionProvider, UserRepository, UserStorage};
use crate::error::{ResourceError, StorageResult};
use crate::session::SessionFactory;
use crate::types::User;

/// [`UserStorage`] that runs every call in its own tenant session.
///
/// The session is closed on every exit path: explicitly after the repository
/// call returns, or by dropping it if the call is cancelled mid-flight.
#[derive(Debug)]
pub struct TenantUserStore<P, R> {
    sessions: SessionFactory<P>,
    repository: R,
    backend_name: &'static str,
}

impl<P, R> TenantUserStore<P, R>
where
    P: MultiTenantConnectionProvider,
    R: UserRepository<Connection = P::Connection>,
{
    /// Creates a store from a session factory and a repository.
    pub fn new(sessions: SessionFactory<P>, repository: R, backend_name: &'static str) -> Self {
        Self {
            sessions,
            repository,
            backend_name,
        }
    }

    /// Returns the session factory.
    pub fn sessions(&self) -> &SessionFactory<P> {
        &self.sessions
    }

    /// Loads the user, then writes the new password. `None` if no such user.
    async fn change_password(
        &self,
        conn: &mut P::Connection,
        user_no: i32,
        user_pwd: &str,
    ) -> StorageResult<Option<User>> {
        if self.repository.find_by_id(conn, user_no).await?.is_none() {
            return Ok(None);
        }
        self.repository.update_password(conn, user_no, user_pwd).await
    }
}

#[async_trait]
impl<P, R> UserStorage for TenantUserStore<P, R>
where
    P: MultiTenantConnectionProvider + 'static,
    R: UserRepository<Connection = P::Connection> + 'static,
{
    fn backend_name(&self) -> &'static str {
        self.backend_name
    }

    async fn list_users(&self) -> StorageResult<Vec<User>> {
        let mut session = self.sessions.open_session().await?;

        let result = match self.sessions.verify_session(&session) {
            Ok(()) => self.repository.find_all(session.connection_mut()).await,
            Err(e) => Err(e.into()),
        };

        self.sessions.close_session(session);
        result
    }

    async fn update_user_password(&self, user_no: i32, user_pwd: &str) -> StorageResult<User> {
        let mut session = self.sessions.open_session().await?;
        let tenant_id = session.tenant_id().clone();

        let result = match self.sessions.verify_session(&session) {
            Ok(()) => {
                self.change_password(session.connection_mut(), user_no, user_pwd)
                    .await
            }
            Err(e) => Err(e.into()),
        };

        self.sessions.close_session(session);

        match result? {
            Some(user) => {
                debug!(tenant_id = %tenant_id, user_no, "Updated user password");
                Ok(user)
            }
            None => Err(ResourceError::NotFound {
                entity: "user".to_string(),
                id: user_no.to_string(),
            }
            .into()),
        }
    }
}
