//! Application state - Dependency injection container.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::{Database, RefreshTokenStore, UserStore};
use crate::services::{IdentityManager, IdentityService, LogEmailSender};

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    /// Identity subsystem
    pub identity: Arc<dyn IdentityService>,
    /// Database connection (health checks)
    pub database: Arc<Database>,
    /// Runtime configuration
    pub config: Config,
}

impl AppState {
    /// Create application state from a connected database and config.
    ///
    /// Wires the concrete repositories, the logging email sender and the
    /// identity service. This is the composition root used at startup.
    pub fn from_config(database: Arc<Database>, config: Config) -> Self {
        let connection = database.get_connection();
        let identity = Arc::new(IdentityManager::new(
            Arc::new(UserStore::new(connection.clone())),
            Arc::new(RefreshTokenStore::new(connection)),
            Arc::new(LogEmailSender),
            config.clone(),
        ));

        Self {
            identity,
            database,
            config,
        }
    }

    /// Create application state with manually injected services (tests).
    pub fn new(identity: Arc<dyn IdentityService>, database: Arc<Database>, config: Config) -> Self {
        Self {
            identity,
            database,
            config,
        }
    }
}
