//! HTTP request handlers.

pub mod identity_handler;

pub use identity_handler::{identity_routes, manage_routes};
