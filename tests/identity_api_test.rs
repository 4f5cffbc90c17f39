//! Integration tests for the identity API endpoints.
//!
//! These tests drive the real router with a mock identity service and a
//! mock database backend, so no PostgreSQL instance is required.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use chrono::Utc;
use once_cell::sync::Lazy;
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use bootstrap_identity::api::{create_router, AppState};
use bootstrap_identity::cli::Cli;
use bootstrap_identity::config::{Config, Environment};
use bootstrap_identity::domain::User;
use bootstrap_identity::errors::{AppError, AppResult};
use bootstrap_identity::infra::Database;
use bootstrap_identity::server;
use bootstrap_identity::services::{Claims, IdentityService, TokenResponse};

/// Shared test configuration; environment is mutated once, inside the Lazy.
static TEST_CONFIG: Lazy<Config> = Lazy::new(|| {
    std::env::set_var("JWT_SECRET", "integration-test-secret-32-chars!!");
    std::env::set_var("APP_ENV", "development");
    Config::from_env()
});

const KNOWN_EMAIL: &str = "user@example.com";
const KNOWN_PASSWORD: &str = "Password123!";
const GOOD_REFRESH: &str = "good-refresh-token";
const GOOD_CODE: &str = "good-code";
const VALID_BEARER: &str = "valid-test-token";

fn sample_user(email: &str) -> User {
    User::new(Uuid::new_v4(), email.to_string(), "hashed".to_string())
}

/// Mock identity service with canned responses
struct MockIdentityService;

#[async_trait]
impl IdentityService for MockIdentityService {
    async fn register(&self, email: String, _password: String) -> AppResult<User> {
        if email == "taken@example.com" {
            return Err(AppError::conflict("User"));
        }
        Ok(sample_user(&email))
    }

    async fn login(&self, email: String, password: String) -> AppResult<TokenResponse> {
        if email == KNOWN_EMAIL && password == KNOWN_PASSWORD {
            Ok(TokenResponse {
                access_token: "mock-access-token".to_string(),
                token_type: "Bearer".to_string(),
                expires_in: 3600,
                refresh_token: "mock-refresh-token".to_string(),
            })
        } else {
            Err(AppError::InvalidCredentials)
        }
    }

    async fn refresh(&self, refresh_token: String) -> AppResult<TokenResponse> {
        if refresh_token == GOOD_REFRESH {
            Ok(TokenResponse {
                access_token: "rotated-access-token".to_string(),
                token_type: "Bearer".to_string(),
                expires_in: 3600,
                refresh_token: "rotated-refresh-token".to_string(),
            })
        } else {
            Err(AppError::Unauthorized)
        }
    }

    async fn confirm_email(&self, user_id: Uuid, code: String) -> AppResult<User> {
        if code == GOOD_CODE {
            let mut user = sample_user(KNOWN_EMAIL);
            user.id = user_id;
            user.confirm_email();
            Ok(user)
        } else {
            Err(AppError::bad_request("Invalid or expired code"))
        }
    }

    async fn resend_confirmation(&self, _email: String) -> AppResult<()> {
        Ok(())
    }

    async fn forgot_password(&self, _email: String) -> AppResult<()> {
        Ok(())
    }

    async fn reset_password(
        &self,
        _email: String,
        code: String,
        _new_password: String,
    ) -> AppResult<()> {
        if code == GOOD_CODE {
            Ok(())
        } else {
            Err(AppError::bad_request("Invalid or expired code"))
        }
    }

    async fn user_info(&self, id: Uuid) -> AppResult<User> {
        let mut user = sample_user(KNOWN_EMAIL);
        user.id = id;
        Ok(user)
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        if token == VALID_BEARER {
            Ok(Claims {
                sub: Uuid::new_v4(),
                email: KNOWN_EMAIL.to_string(),
                exp: Utc::now().timestamp() + 3600,
                iat: Utc::now().timestamp(),
            })
        } else {
            Err(AppError::Unauthorized)
        }
    }
}

fn test_state(config: Config) -> AppState {
    let connection = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .into_connection();

    AppState::new(
        Arc::new(MockIdentityService),
        Arc::new(Database::from_connection(connection)),
        config,
    )
}

fn dev_router() -> axum::Router {
    create_router(test_state(TEST_CONFIG.clone()))
}

fn prod_router() -> axum::Router {
    let mut config = TEST_CONFIG.clone();
    config.environment = Environment::Production;
    create_router(test_state(config))
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// =============================================================================
// Registration
// =============================================================================

#[tokio::test]
async fn register_returns_created_account() {
    let response = dev_router()
        .oneshot(json_request(
            "POST",
            "/identity/register",
            json!({"email": "new@example.com", "password": "Password123!"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["email"], "new@example.com");
    assert_eq!(body["email_confirmed"], false);
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn register_duplicate_email_conflicts() {
    let response = dev_router()
        .oneshot(json_request(
            "POST",
            "/identity/register",
            json!({"email": "taken@example.com", "password": "Password123!"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn register_rejects_malformed_email() {
    let response = dev_router()
        .oneshot(json_request(
            "POST",
            "/identity/register",
            json!({"email": "not-an-email", "password": "Password123!"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn register_rejects_short_password() {
    let response = dev_router()
        .oneshot(json_request(
            "POST",
            "/identity/register",
            json!({"email": "new@example.com", "password": "short"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Login & tokens
// =============================================================================

#[tokio::test]
async fn login_with_valid_credentials_returns_tokens() {
    let response = dev_router()
        .oneshot(json_request(
            "POST",
            "/identity/login",
            json!({"email": KNOWN_EMAIL, "password": KNOWN_PASSWORD}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["token_type"], "Bearer");
    assert!(!body["access_token"].as_str().unwrap().is_empty());
    assert!(!body["refresh_token"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() {
    let response = dev_router()
        .oneshot(json_request(
            "POST",
            "/identity/login",
            json!({"email": KNOWN_EMAIL, "password": "WrongPassword1"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn refresh_rotates_token_pair() {
    let response = dev_router()
        .oneshot(json_request(
            "POST",
            "/identity/refresh",
            json!({"refresh_token": GOOD_REFRESH}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["refresh_token"], "rotated-refresh-token");
}

#[tokio::test]
async fn refresh_with_unknown_token_is_unauthorized() {
    let response = dev_router()
        .oneshot(json_request(
            "POST",
            "/identity/refresh",
            json!({"refresh_token": "bogus"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Email confirmation & password reset
// =============================================================================

#[tokio::test]
async fn confirm_email_with_valid_code_succeeds() {
    let uri = format!(
        "/identity/confirm-email?user_id={}&code={}",
        Uuid::new_v4(),
        GOOD_CODE
    );
    let response = dev_router()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn confirm_email_with_bad_code_fails() {
    let uri = format!(
        "/identity/confirm-email?user_id={}&code=stale",
        Uuid::new_v4()
    );
    let response = dev_router()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn resend_confirmation_always_succeeds() {
    let response = dev_router()
        .oneshot(json_request(
            "POST",
            "/identity/resend-confirmation-email",
            json!({"email": "whoever@example.com"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn forgot_password_always_succeeds() {
    let response = dev_router()
        .oneshot(json_request(
            "POST",
            "/identity/forgot-password",
            json!({"email": "whoever@example.com"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn reset_password_with_valid_code_succeeds() {
    let response = dev_router()
        .oneshot(json_request(
            "POST",
            "/identity/reset-password",
            json!({
                "email": KNOWN_EMAIL,
                "reset_code": GOOD_CODE,
                "new_password": "NewPassword123!"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

// =============================================================================
// Authenticated management routes
// =============================================================================

#[tokio::test]
async fn manage_info_requires_bearer_token() {
    let response = dev_router()
        .oneshot(
            Request::builder()
                .uri("/identity/manage/info")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn manage_info_returns_current_account() {
    let response = dev_router()
        .oneshot(
            Request::builder()
                .uri("/identity/manage/info")
                .header(header::AUTHORIZATION, format!("Bearer {}", VALID_BEARER))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["email"], KNOWN_EMAIL);
}

// =============================================================================
// Documentation endpoints (development mode only)
// =============================================================================

#[tokio::test]
async fn openapi_document_served_in_development() {
    let response = dev_router()
        .oneshot(
            Request::builder()
                .uri("/api-docs/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["paths"].get("/identity/register").is_some());
}

#[tokio::test]
async fn documentation_absent_in_production() {
    let router = prod_router();

    let openapi = router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api-docs/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(openapi.status(), StatusCode::NOT_FOUND);

    let swagger = router
        .oneshot(
            Request::builder()
                .uri("/swagger-ui")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(swagger.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn identity_routes_still_served_in_production() {
    let response = prod_router()
        .oneshot(json_request(
            "POST",
            "/identity/login",
            json!({"email": KNOWN_EMAIL, "password": KNOWN_PASSWORD}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

// =============================================================================
// Health & middleware
// =============================================================================

#[tokio::test]
async fn health_reports_database_status() {
    let response = dev_router()
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn plain_http_redirected_when_force_https_enabled() {
    let mut config = TEST_CONFIG.clone();
    config.force_https = true;
    let router = create_router(test_state(config));

    let response = router
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-forwarded-proto", "http")
                .header(header::HOST, "identity.example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PERMANENT_REDIRECT);
    let location = response.headers().get(header::LOCATION).unwrap();
    assert_eq!(location, "https://identity.example.com/health");
}

#[tokio::test]
async fn startup_fails_before_listening_when_database_unusable() {
    let mut config = TEST_CONFIG.clone();
    // A scheme no compiled backend supports makes connect fail immediately,
    // without any network traffic.
    config.app_db_url = "mysql://127.0.0.1/identity".to_string();

    let cli = Cli {
        verbose: false,
        host: "127.0.0.1".to_string(),
        port: 0,
    };

    // The listener is never bound; run returns the connection error.
    let result = server::run(cli, config).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let response = dev_router()
        .oneshot(
            Request::builder()
                .uri("/identity/unknown")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
