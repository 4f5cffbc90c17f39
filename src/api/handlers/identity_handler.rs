//! Identity endpoint handlers.
//!
//! The full endpoint family lives under the fixed `/identity` prefix:
//! registration, login, refresh, email confirmation and password reset,
//! plus the authenticated `/identity/manage/info` surface.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::UserResponse;
use crate::errors::AppResult;
use crate::services::TokenResponse;
use crate::types::ApiResponse;

/// Account registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    /// User email address
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "user@example.com")]
    pub email: String,
    /// User password (minimum 8 characters)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[schema(example = "SecurePass123!", min_length = 8)]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// User email address
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "user@example.com")]
    pub email: String,
    /// User password
    #[schema(example = "SecurePass123!")]
    pub password: String,
}

/// Token refresh request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RefreshRequest {
    /// Refresh token issued at login or a previous refresh
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

/// Email confirmation query parameters
#[derive(Debug, Deserialize, IntoParams)]
pub struct ConfirmEmailParams {
    /// Account identifier
    pub user_id: Uuid,
    /// One-time confirmation code
    pub code: String,
}

/// Resend-confirmation / forgot-password request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct EmailRequest {
    /// User email address
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "user@example.com")]
    pub email: String,
}

/// Password reset request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ResetPasswordRequest {
    /// User email address
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "user@example.com")]
    pub email: String,
    /// One-time reset code from the forgot-password email
    #[validate(length(min = 1, message = "Reset code is required"))]
    pub reset_code: String,
    /// New password (minimum 8 characters)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[schema(example = "NewSecurePass123!", min_length = 8)]
    pub new_password: String,
}

/// Create the public identity routes
pub fn identity_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/confirm-email", get(confirm_email))
        .route("/resend-confirmation-email", post(resend_confirmation_email))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
}

/// Create the authenticated management routes
pub fn manage_routes() -> Router<AppState> {
    Router::new().route("/info", get(user_info))
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/identity/register",
    tag = "Identity",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account registered", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let user = state
        .identity
        .register(payload.email, payload.password)
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// Login and obtain a token pair
#[utoipa::path(
    post,
    path = "/identity/login",
    tag = "Identity",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let tokens = state.identity.login(payload.email, payload.password).await?;

    Ok(Json(tokens))
}

/// Exchange a refresh token for a new token pair
#[utoipa::path(
    post,
    path = "/identity/refresh",
    tag = "Identity",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Tokens refreshed", body = TokenResponse),
        (status = 401, description = "Refresh token invalid, expired or revoked")
    )
)]
pub async fn refresh(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RefreshRequest>,
) -> AppResult<Json<TokenResponse>> {
    let tokens = state.identity.refresh(payload.refresh_token).await?;

    Ok(Json(tokens))
}

/// Redeem an email confirmation code
#[utoipa::path(
    get,
    path = "/identity/confirm-email",
    tag = "Identity",
    params(ConfirmEmailParams),
    responses(
        (status = 200, description = "Email confirmed"),
        (status = 400, description = "Invalid or expired code")
    )
)]
pub async fn confirm_email(
    State(state): State<AppState>,
    Query(params): Query<ConfirmEmailParams>,
) -> AppResult<Json<ApiResponse<()>>> {
    state
        .identity
        .confirm_email(params.user_id, params.code)
        .await?;

    Ok(Json(ApiResponse::message("Email confirmed")))
}

/// Re-send the confirmation email
#[utoipa::path(
    post,
    path = "/identity/resend-confirmation-email",
    tag = "Identity",
    request_body = EmailRequest,
    responses(
        (status = 200, description = "Confirmation email sent if the account exists")
    )
)]
pub async fn resend_confirmation_email(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<EmailRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.identity.resend_confirmation(payload.email).await?;

    Ok(Json(ApiResponse::message("Confirmation email sent")))
}

/// Request a password reset code
#[utoipa::path(
    post,
    path = "/identity/forgot-password",
    tag = "Identity",
    request_body = EmailRequest,
    responses(
        (status = 200, description = "Reset email sent if the account exists")
    )
)]
pub async fn forgot_password(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<EmailRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.identity.forgot_password(payload.email).await?;

    Ok(Json(ApiResponse::message("Password reset email sent")))
}

/// Redeem a reset code and set a new password
#[utoipa::path(
    post,
    path = "/identity/reset-password",
    tag = "Identity",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset"),
        (status = 400, description = "Invalid or expired code")
    )
)]
pub async fn reset_password(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ResetPasswordRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    state
        .identity
        .reset_password(payload.email, payload.reset_code, payload.new_password)
        .await?;

    Ok(Json(ApiResponse::message("Password has been reset")))
}

/// Get the authenticated account
#[utoipa::path(
    get,
    path = "/identity/manage/info",
    tag = "Identity",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current account", body = UserResponse),
        (status = 401, description = "Missing or invalid bearer token")
    )
)]
pub async fn user_info(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<UserResponse>> {
    let user = state.identity.user_info(current_user.id).await?;

    Ok(Json(UserResponse::from(user)))
}
