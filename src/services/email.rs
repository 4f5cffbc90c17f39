//! Outbound email abstraction.
//!
//! The identity flows only need a way to hand a one-time code to the
//! account owner. The default sender writes the message to the log,
//! which is sufficient for development; a real transport can be swapped
//! in behind the trait without touching the identity service.

use async_trait::async_trait;

use crate::errors::AppResult;

/// Email delivery trait for dependency injection.
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Deliver a single message
    async fn send(&self, to: &str, subject: &str, body: &str) -> AppResult<()>;
}

/// Sender that logs messages instead of delivering them.
pub struct LogEmailSender;

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send(&self, to: &str, subject: &str, body: &str) -> AppResult<()> {
        tracing::info!(to = %to, subject = %subject, "email dispatched via logging sender");
        tracing::debug!(body = %body, "email body");
        Ok(())
    }
}
