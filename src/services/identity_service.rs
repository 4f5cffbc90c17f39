//! Identity service - registration, login and token lifecycle.
//!
//! This is the application's identity subsystem: a fixed family of
//! operations (register, login, refresh, email confirmation, password
//! reset) over the user and refresh token repositories. Access tokens are
//! signed JWTs; refresh tokens are opaque values stored as SHA-256
//! digests and rotated on every use. One-time codes for confirmation and
//! reset are purpose-scoped JWTs bound to the user's security stamp, so
//! a credential change invalidates anything outstanding.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use super::email::EmailSender;
use crate::config::{
    Config, ONE_TIME_CODE_EXPIRATION_HOURS, PURPOSE_EMAIL_CONFIRMATION, PURPOSE_PASSWORD_RESET,
    REFRESH_TOKEN_BYTES, SECONDS_PER_HOUR, TOKEN_TYPE_BEARER,
};
use crate::domain::{Password, User};
use crate::errors::{AppError, AppResult};
use crate::infra::{RefreshTokenRepository, UserRepository};

/// JWT claims payload for access tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
}

/// Claims payload for one-time codes (confirmation, reset)
#[derive(Debug, Serialize, Deserialize)]
struct ActionClaims {
    sub: Uuid,
    purpose: String,
    /// Security stamp at issue time; must still match at redemption
    stamp: Uuid,
    exp: i64,
    iat: i64,
}

/// Token response returned after successful authentication
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    /// JWT access token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    /// Token type (always "Bearer")
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Access token expiration time in seconds
    #[schema(example = 3600)]
    pub expires_in: i64,
    /// Opaque refresh token; rotated on every refresh
    pub refresh_token: String,
}

/// Identity service trait for dependency injection.
///
/// One implementation serves the whole identity endpoint family.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Register a new, unconfirmed account and send a confirmation code
    async fn register(&self, email: String, password: String) -> AppResult<User>;

    /// Verify credentials and issue a token pair
    async fn login(&self, email: String, password: String) -> AppResult<TokenResponse>;

    /// Exchange a refresh token for a fresh pair, rotating the old one
    async fn refresh(&self, refresh_token: String) -> AppResult<TokenResponse>;

    /// Redeem an email confirmation code
    async fn confirm_email(&self, user_id: Uuid, code: String) -> AppResult<User>;

    /// Re-send the confirmation code; succeeds regardless of account state
    async fn resend_confirmation(&self, email: String) -> AppResult<()>;

    /// Send a password reset code; succeeds regardless of account state
    async fn forgot_password(&self, email: String) -> AppResult<()>;

    /// Redeem a reset code and set a new password
    async fn reset_password(
        &self,
        email: String,
        code: String,
        new_password: String,
    ) -> AppResult<()>;

    /// Fetch the account behind an authenticated request
    async fn user_info(&self, id: Uuid) -> AppResult<User>;

    /// Verify an access token and extract its claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;
}

/// Generate a signed access token for a user
fn generate_access_token(user: &User, config: &Config) -> AppResult<String> {
    let now = Utc::now();
    let expires_at = now + Duration::hours(config.jwt_expiration_hours);

    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret_bytes()),
    )?)
}

/// Verify an access token and extract claims
fn verify_access_token(token: &str, config: &Config) -> AppResult<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

/// Issue a purpose-scoped one-time code bound to the user's security stamp
fn issue_one_time_code(user: &User, purpose: &str, config: &Config) -> AppResult<String> {
    let now = Utc::now();
    let claims = ActionClaims {
        sub: user.id,
        purpose: purpose.to_string(),
        stamp: user.security_stamp,
        exp: (now + Duration::hours(ONE_TIME_CODE_EXPIRATION_HOURS)).timestamp(),
        iat: now.timestamp(),
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret_bytes()),
    )?)
}

/// Redeem a one-time code against the expected user and purpose.
///
/// Every failure mode collapses into the same client error so codes
/// cannot be used to probe account state.
fn verify_one_time_code(user: &User, code: &str, purpose: &str, config: &Config) -> AppResult<()> {
    let claims = decode::<ActionClaims>(
        code,
        &DecodingKey::from_secret(config.jwt_secret_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::bad_request("Invalid or expired code"))?
    .claims;

    if claims.sub != user.id || claims.purpose != purpose || claims.stamp != user.security_stamp {
        return Err(AppError::bad_request("Invalid or expired code"));
    }

    Ok(())
}

/// Generate an opaque refresh token and its storage digest
fn new_refresh_token() -> (String, String) {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    let raw = hex::encode(bytes);
    let digest = hash_refresh_token(&raw);
    (raw, digest)
}

/// SHA-256 digest of a refresh token, hex-encoded
fn hash_refresh_token(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.as_bytes()))
}

/// Concrete implementation of IdentityService.
pub struct IdentityManager {
    users: Arc<dyn UserRepository>,
    tokens: Arc<dyn RefreshTokenRepository>,
    mailer: Arc<dyn EmailSender>,
    config: Config,
}

impl IdentityManager {
    /// Create new identity service instance
    pub fn new(
        users: Arc<dyn UserRepository>,
        tokens: Arc<dyn RefreshTokenRepository>,
        mailer: Arc<dyn EmailSender>,
        config: Config,
    ) -> Self {
        Self {
            users,
            tokens,
            mailer,
            config,
        }
    }

    /// Issue an access token plus a stored, rotating refresh token
    async fn issue_token_pair(&self, user: &User) -> AppResult<TokenResponse> {
        let access_token = generate_access_token(user, &self.config)?;

        let (raw, digest) = new_refresh_token();
        let expires_at = Utc::now() + Duration::days(self.config.refresh_expiration_days);
        self.tokens.insert(user.id, digest, expires_at).await?;

        Ok(TokenResponse {
            access_token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expires_in: self.config.jwt_expiration_hours * SECONDS_PER_HOUR,
            refresh_token: raw,
        })
    }

    async fn send_confirmation_code(&self, user: &User) -> AppResult<()> {
        let code = issue_one_time_code(user, PURPOSE_EMAIL_CONFIRMATION, &self.config)?;
        let body = format!(
            "Confirm your account: /identity/confirm-email?user_id={}&code={}",
            user.id, code
        );
        self.mailer
            .send(&user.email, "Confirm your email", &body)
            .await
    }

    async fn send_reset_code(&self, user: &User) -> AppResult<()> {
        let code = issue_one_time_code(user, PURPOSE_PASSWORD_RESET, &self.config)?;
        let body = format!("Your password reset code: {}", code);
        self.mailer
            .send(&user.email, "Reset your password", &body)
            .await
    }
}

#[async_trait]
impl IdentityService for IdentityManager {
    async fn register(&self, email: String, password: String) -> AppResult<User> {
        // Email format is validated by the handler's ValidatedJson extractor
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::conflict("User"));
        }

        let password_hash = Password::new(&password)?.into_string();
        let user = self.users.create(email, password_hash).await?;

        self.send_confirmation_code(&user).await?;
        tracing::info!(user_id = %user.id, "account registered");
        Ok(user)
    }

    async fn login(&self, email: String, password: String) -> AppResult<TokenResponse> {
        let user_result = self.users.find_by_email(&email).await?;

        // SECURITY: Perform password verification even if user doesn't exist
        // to prevent timing attacks that could enumerate valid emails.
        // We use a dummy hash that will always fail verification.
        let dummy_hash =
            "$argon2id$v=19$m=19456,t=2,p=1$dummysalt123456$dummyhash1234567890123456789012";

        let (password_hash, user_exists) = match &user_result {
            Some(user) => (user.password_hash.as_str(), true),
            None => (dummy_hash, false),
        };

        let stored_password = Password::from_hash(password_hash.to_string());
        let password_valid = stored_password.verify(&password);

        // Only succeed if both user exists AND password is valid
        if !user_exists || !password_valid {
            return Err(AppError::InvalidCredentials);
        }

        // Safe to unwrap since we verified user_exists is true
        self.issue_token_pair(user_result.as_ref().unwrap()).await
    }

    async fn refresh(&self, refresh_token: String) -> AppResult<TokenResponse> {
        let digest = hash_refresh_token(&refresh_token);
        let stored = self
            .tokens
            .find_active(&digest)
            .await?
            .ok_or(AppError::Unauthorized)?;

        let user = self
            .users
            .find_by_id(stored.user_id)
            .await?
            .ok_or(AppError::Unauthorized)?;

        // Rotate: the presented token is spent regardless of what follows
        self.tokens.revoke(stored.id).await?;
        self.issue_token_pair(&user).await
    }

    async fn confirm_email(&self, user_id: Uuid, code: String) -> AppResult<User> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::bad_request("Invalid or expired code"))?;

        verify_one_time_code(&user, &code, PURPOSE_EMAIL_CONFIRMATION, &self.config)?;

        if user.email_confirmed {
            // Redeeming twice is harmless
            return Ok(user);
        }

        let user = self.users.confirm_email(user.id).await?;
        tracing::info!(user_id = %user.id, "email confirmed");
        Ok(user)
    }

    async fn resend_confirmation(&self, email: String) -> AppResult<()> {
        // Outwardly always succeeds; no account enumeration
        if let Some(user) = self.users.find_by_email(&email).await? {
            if !user.email_confirmed {
                self.send_confirmation_code(&user).await?;
            }
        }
        Ok(())
    }

    async fn forgot_password(&self, email: String) -> AppResult<()> {
        // Outwardly always succeeds; no account enumeration
        if let Some(user) = self.users.find_by_email(&email).await? {
            self.send_reset_code(&user).await?;
        }
        Ok(())
    }

    async fn reset_password(
        &self,
        email: String,
        code: String,
        new_password: String,
    ) -> AppResult<()> {
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AppError::bad_request("Invalid or expired code"))?;

        verify_one_time_code(&user, &code, PURPOSE_PASSWORD_RESET, &self.config)?;

        let password_hash = Password::new(&new_password)?.into_string();
        let user = self.users.update_password(user.id, password_hash).await?;

        // A new credential invalidates every outstanding session
        self.tokens.revoke_all_for_user(user.id).await?;
        tracing::info!(user_id = %user.id, "password reset");
        Ok(())
    }

    async fn user_info(&self, id: Uuid) -> AppResult<User> {
        self.users.find_by_id(id).await?.ok_or(AppError::NotFound)
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        verify_access_token(token, &self.config)
    }
}
