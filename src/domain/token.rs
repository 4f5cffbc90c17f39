//! Refresh token domain entity.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A stored refresh token.
///
/// Only the SHA-256 digest of the opaque token is persisted; the raw
/// value is returned to the client once and never stored.
#[derive(Debug, Clone)]
pub struct RefreshToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    /// Set when the token has been rotated or revoked
    pub revoked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl RefreshToken {
    /// Usable for refresh: not revoked and not expired
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && self.expires_at > now
    }
}
