//! HTTP middleware.

mod auth;
mod https_redirect;

pub use auth::{auth_middleware, CurrentUser};
pub use https_redirect::https_redirect_middleware;
