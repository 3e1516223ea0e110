//! Shared handler state.

use std::sync::Arc;

use stratum_persistence::core::UserStorage;

use crate::config::ServerConfig;

/// The user store and the configuration it was built from.
pub struct AppState<S> {
    storage: Arc<S>,
    config: Arc<ServerConfig>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S: UserStorage> AppState<S> {
    /// Creates state over `storage`.
    pub fn new(storage: Arc<S>, config: ServerConfig) -> Self {
        Self {
            storage,
            config: Arc::new(config),
        }
    }

    /// Returns the user store.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Returns the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}
