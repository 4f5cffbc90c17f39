//! Database connection and schema initialization.

use std::sync::Arc;

use sea_orm::sea_query::Index;
use sea_orm::{
    ConnectionTrait, Database as SeaDatabase, DatabaseConnection, DbErr, Schema, Statement,
};

use super::repositories::entities::{refresh_token, user};
use crate::config::Config;

/// Database wrapper for connection management
#[derive(Clone)]
pub struct Database {
    connection: Arc<DatabaseConnection>,
}

impl Database {
    /// Open a connection pool against the configured "AppDb" database.
    ///
    /// The pool itself is lazy; the first statement (normally
    /// [`ensure_schema`](Self::ensure_schema) at startup) surfaces
    /// connectivity failures.
    pub async fn connect(config: &Config) -> Result<Self, DbErr> {
        let connection = SeaDatabase::connect(&config.app_db_url).await?;
        Ok(Self {
            connection: Arc::new(connection),
        })
    }

    /// Wrap an existing connection (used by tests with a mock backend).
    pub fn from_connection(connection: DatabaseConnection) -> Self {
        Self {
            connection: Arc::new(connection),
        }
    }

    /// Get a clone of the database connection.
    pub fn get_connection(&self) -> Arc<DatabaseConnection> {
        self.connection.clone()
    }

    /// Ensure the identity schema exists.
    ///
    /// Issues `CREATE TABLE IF NOT EXISTS` statements derived from the
    /// entity definitions. Idempotent: re-running against an initialized
    /// database is a no-op. This is deliberately not a migration system;
    /// there is no versioning and no rollback.
    pub async fn ensure_schema(&self) -> Result<(), DbErr> {
        let backend = self.connection.get_database_backend();
        let schema = Schema::new(backend);

        let mut users_table = schema.create_table_from_entity(user::Entity);
        users_table.if_not_exists();
        self.connection.execute(backend.build(&users_table)).await?;

        let mut tokens_table = schema.create_table_from_entity(refresh_token::Entity);
        tokens_table.if_not_exists();
        self.connection
            .execute(backend.build(&tokens_table))
            .await?;

        let mut token_user_index = Index::create();
        token_user_index
            .name("idx_refresh_tokens_user_id")
            .table(refresh_token::Entity)
            .col(refresh_token::Column::UserId)
            .if_not_exists();
        self.connection
            .execute(backend.build(&token_user_index))
            .await?;

        tracing::info!("Identity schema ensured");
        Ok(())
    }

    /// Check database connectivity by executing a simple query.
    pub async fn ping(&self) -> Result<(), DbErr> {
        self.connection
            .execute(Statement::from_string(
                self.connection.get_database_backend(),
                "SELECT 1".to_string(),
            ))
            .await?;
        Ok(())
    }
}
