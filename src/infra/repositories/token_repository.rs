//! Refresh token repository implementation.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use super::entities::refresh_token::{self, ActiveModel, Entity as TokenEntity};
use crate::domain::RefreshToken;
use crate::errors::{AppError, AppResult};

#[cfg(test)]
use mockall::automock;

/// Refresh token repository trait for dependency injection.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    /// Persist a new refresh token digest
    async fn insert(
        &self,
        user_id: Uuid,
        token_hash: String,
        expires_at: DateTime<Utc>,
    ) -> AppResult<RefreshToken>;

    /// Find a token by digest that is neither revoked nor expired
    async fn find_active(&self, token_hash: &str) -> AppResult<Option<RefreshToken>>;

    /// Revoke a single token (rotation)
    async fn revoke(&self, id: Uuid) -> AppResult<()>;

    /// Revoke every token belonging to a user (credential change)
    async fn revoke_all_for_user(&self, user_id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of RefreshTokenRepository backed by SeaORM
pub struct RefreshTokenStore {
    db: Arc<DatabaseConnection>,
}

impl RefreshTokenStore {
    /// Create new repository instance
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RefreshTokenRepository for RefreshTokenStore {
    async fn insert(
        &self,
        user_id: Uuid,
        token_hash: String,
        expires_at: DateTime<Utc>,
    ) -> AppResult<RefreshToken> {
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            token_hash: Set(token_hash),
            expires_at: Set(expires_at),
            revoked_at: Set(None),
            created_at: Set(Utc::now()),
        };

        let model = active_model.insert(self.db.as_ref()).await.map_err(AppError::from)?;
        Ok(RefreshToken::from(model))
    }

    async fn find_active(&self, token_hash: &str) -> AppResult<Option<RefreshToken>> {
        let result = TokenEntity::find()
            .filter(refresh_token::Column::TokenHash.eq(token_hash))
            .filter(refresh_token::Column::RevokedAt.is_null())
            .filter(refresh_token::Column::ExpiresAt.gt(Utc::now()))
            .one(self.db.as_ref())
            .await
            .map_err(AppError::from)?;

        Ok(result.map(RefreshToken::from))
    }

    async fn revoke(&self, id: Uuid) -> AppResult<()> {
        let token = TokenEntity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: ActiveModel = token.into();
        active.revoked_at = Set(Some(Utc::now()));
        active.update(self.db.as_ref()).await.map_err(AppError::from)?;
        Ok(())
    }

    async fn revoke_all_for_user(&self, user_id: Uuid) -> AppResult<()> {
        TokenEntity::update_many()
            .col_expr(
                refresh_token::Column::RevokedAt,
                sea_orm::sea_query::Expr::value(Some(Utc::now())),
            )
            .filter(refresh_token::Column::UserId.eq(user_id))
            .filter(refresh_token::Column::RevokedAt.is_null())
            .exec(self.db.as_ref())
            .await
            .map_err(AppError::from)?;
        Ok(())
    }
}
