//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on abstractions (traits) for
//! dependency inversion.

mod email;
mod identity_service;

pub use email::{EmailSender, LogEmailSender};
pub use identity_service::{Claims, IdentityManager, IdentityService, TokenResponse};
