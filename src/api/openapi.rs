//! OpenAPI documentation configuration.
//!
//! Provides the schema document and Swagger UI, mounted only when the
//! process runs in development mode.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::identity_handler;
use crate::domain::UserResponse;
use crate::services::TokenResponse;

/// OpenAPI documentation for the identity API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bootstrap Identity API",
        version = "0.1.0",
        description = "Identity endpoints: registration, login, token refresh, email confirmation and password reset",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    paths(
        identity_handler::register,
        identity_handler::login,
        identity_handler::refresh,
        identity_handler::confirm_email,
        identity_handler::resend_confirmation_email,
        identity_handler::forgot_password,
        identity_handler::reset_password,
        identity_handler::user_info,
    ),
    components(
        schemas(
            UserResponse,
            TokenResponse,
            identity_handler::RegisterRequest,
            identity_handler::LoginRequest,
            identity_handler::RefreshRequest,
            identity_handler::EmailRequest,
            identity_handler::ResetPasswordRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Identity", description = "Account registration, login and credential management")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT token obtained from /identity/login"))
                        .build(),
                ),
            );
        }
    }
}
