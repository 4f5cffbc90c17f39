//! User domain entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// User account entity.
///
/// The shape mirrors a stock identity record: credentials, confirmation
/// state and a security stamp. No application-specific fields are added.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub email_confirmed: bool,
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Rotated whenever credentials change; outstanding one-time codes
    /// and refresh tokens are bound to it and become invalid on rotation.
    #[serde(skip_serializing)]
    pub security_stamp: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new, unconfirmed user account
    pub fn new(id: Uuid, email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            email,
            email_confirmed: false,
            password_hash,
            security_stamp: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Mark the account's email address as confirmed
    pub fn confirm_email(&mut self) {
        self.email_confirmed = true;
        self.updated_at = Utc::now();
    }

    /// Replace the password hash and rotate the security stamp
    pub fn change_password(&mut self, password_hash: String) {
        self.password_hash = password_hash;
        self.security_stamp = Uuid::new_v4();
        self.updated_at = Utc::now();
    }
}

/// User response (safe to return to client)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    /// Unique user identifier
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    /// User email address
    #[schema(example = "user@example.com")]
    pub email: String,
    /// Whether the email address has been confirmed
    #[schema(example = false)]
    pub email_confirmed: bool,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            email_confirmed: user.email_confirmed,
            created_at: user.created_at,
        }
    }
}
