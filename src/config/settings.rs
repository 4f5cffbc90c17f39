//! Application settings loaded from environment variables.

use std::env;

use super::constants::{
    DEFAULT_APP_DB_URL, DEFAULT_JWT_EXPIRATION_HOURS, DEFAULT_REFRESH_EXPIRATION_DAYS,
    DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT, MIN_JWT_SECRET_LENGTH,
};

/// Runtime environment of the process.
///
/// Documentation endpoints are only mounted in `Development`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }

    fn from_env() -> Self {
        match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("development") | Ok("dev") => Environment::Development,
            _ => {
                if cfg!(debug_assertions) {
                    Environment::Development
                } else {
                    Environment::Production
                }
            }
        }
    }
}

/// Application configuration
#[derive(Clone)]
pub struct Config {
    /// The "AppDb" connection string
    pub app_db_url: String,
    pub environment: Environment,
    jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub refresh_expiration_days: i64,
    pub server_host: String,
    pub server_port: u16,
    /// Redirect plain-HTTP requests to HTTPS
    pub force_https: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("app_db_url", &"[REDACTED]")
            .field("environment", &self.environment)
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_expiration_hours", &self.jwt_expiration_hours)
            .field("refresh_expiration_days", &self.refresh_expiration_days)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("force_https", &self.force_https)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Panics
    /// Panics if JWT_SECRET is not set or is too short (security requirement).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            if cfg!(debug_assertions) {
                // Development mode: use default but warn
                tracing::warn!("JWT_SECRET not set, using insecure default for development");
                "dev-secret-key-minimum-32-chars!!".to_string()
            } else {
                // Production mode: panic
                panic!("JWT_SECRET environment variable must be set in production");
            }
        });

        // Validate JWT secret length
        if jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            panic!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LENGTH
            );
        }

        Self {
            app_db_url: env::var("APP_DB_URL").unwrap_or_else(|_| DEFAULT_APP_DB_URL.to_string()),
            environment: Environment::from_env(),
            jwt_secret,
            jwt_expiration_hours: env::var("JWT_EXPIRATION_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_JWT_EXPIRATION_HOURS),
            refresh_expiration_days: env::var("REFRESH_EXPIRATION_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_REFRESH_EXPIRATION_DAYS),
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SERVER_PORT),
            force_https: env::var("FORCE_HTTPS")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        }
    }

    /// Get JWT secret bytes for token signing/verification.
    pub fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    #[cfg(test)]
    pub(crate) fn for_tests() -> Self {
        Self {
            app_db_url: DEFAULT_APP_DB_URL.to_string(),
            environment: Environment::Development,
            jwt_secret: "unit-test-secret-key-32-characters!".to_string(),
            jwt_expiration_hours: 1,
            refresh_expiration_days: 14,
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
            force_https: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_addr_joins_host_and_port() {
        let config = Config::for_tests();
        assert_eq!(config.server_addr(), "0.0.0.0:3000");
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let config = Config::for_tests();
        let rendered = format!("{:?}", config);
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("unit-test-secret"));
        assert!(!rendered.contains("postgres://"));
    }
}
