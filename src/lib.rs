//! Bootstrap Identity - an identity API over PostgreSQL.
//!
//! The whole application is startup wiring around a small identity
//! subsystem: registration, login, token refresh, email confirmation and
//! password reset, served at a fixed `/identity` prefix. The database
//! schema is ensure-created at startup (idempotent, unversioned), and
//! interactive API documentation is mounted in development mode only.
//!
//! # Layers
//!
//! - **cli**: Command-line entry point
//! - **config**: Application configuration and constants
//! - **domain**: User account, refresh token, password value object
//! - **services**: Identity subsystem and email delivery
//! - **infra**: Database, schema ensure-create, repositories
//! - **api**: HTTP handlers, middleware, routes, OpenAPI doc
//! - **server**: Startup wiring
//! - **errors**: Centralized error handling

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod server;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{Password, User};
pub use errors::{AppError, AppResult};
