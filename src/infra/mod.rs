//! Infrastructure layer - External systems integration
//!
//! This module handles all external system concerns:
//! - Database connection and schema ensure-create
//! - Repositories over the identity tables

pub mod db;
pub mod repositories;

pub use db::Database;
pub use repositories::{RefreshTokenRepository, RefreshTokenStore, UserRepository, UserStore};
