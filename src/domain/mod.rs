//! Domain layer - Core entities and value objects
//!
//! Contains the identity records the rest of the application operates on,
//! independent of infrastructure concerns.

pub mod password;
pub mod token;
pub mod user;

pub use password::Password;
pub use token::RefreshToken;
pub use user::{User, UserResponse};
