//! Configuration management
//!
//! This module handles loading and validating configuration from environment variables,
//! with support for different environments (development, staging, production).

use chrono::Duration;
use std::env;
use std::str::FromStr;
use thiserror::Error;

use crate::auth::TokenConfig;

const DEV_ACCESS_SECRET: &str = "development-access-secret-change-in-production";
const DEV_REFRESH_SECRET: &str = "development-refresh-secret-change-in-production";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid environment value: {0}")]
    InvalidValue(String),

    #[error("Invalid port number: {0}")]
    InvalidPort(String),
}

/// Application environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" | "development" | "local" => Ok(Environment::Development),
            "staging" => Ok(Environment::Staging),
            "prod" | "production" => Ok(Environment::Production),
            _ => Err(ConfigError::InvalidValue(format!(
                "Invalid environment: '{}'. Expected: dev, staging, or prod",
                s
            ))),
        }
    }
}

impl Environment {
    /// Check if this is a production environment
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    /// Local development, where cookies may travel over plain HTTP
    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }

    /// Get the environment name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

/// Account created at startup when it does not exist yet
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub username: String,
    pub password: String,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection URL; without one the server keeps data in memory
    pub database_url: Option<String>,

    /// Current environment
    pub environment: Environment,

    /// Server port
    pub port: u16,

    /// Maximum database connections
    pub db_max_connections: u32,

    /// CORS allowed origins
    pub cors_allowed_origins: Option<String>,

    /// Log level (RUST_LOG)
    pub log_level: String,

    /// Secret for signing access tokens
    pub jwt_secret: String,

    /// Secret for signing refresh tokens
    pub jwt_refresh_secret: String,

    /// Access token TTL in seconds (default: 900 = 15 minutes)
    pub jwt_access_token_ttl_seconds: i64,

    /// Refresh token TTL in days (default: 365)
    pub jwt_refresh_token_ttl_days: i64,

    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .map(|s| s.parse::<Environment>())
            .unwrap_or(Ok(Environment::Development))?;

        let database_url = lookup("DATABASE_URL").filter(|s| !s.is_empty());

        let port = lookup("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort("PORT must be a valid number".to_string()))?;

        let db_max_connections = lookup("DB_MAX_CONNECTIONS")
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(5);

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS");

        let log_level = lookup("RUST_LOG").unwrap_or_else(|| "info".to_string());

        let secret = |key: &str, dev_default: &str| -> Result<String, ConfigError> {
            match lookup(key).filter(|s| !s.is_empty()) {
                Some(value) => Ok(value),
                None if environment.is_development() => Ok(dev_default.to_string()),
                None => Err(ConfigError::MissingEnvVar(key.to_string())),
            }
        };
        let jwt_secret = secret("JWT_SECRET", DEV_ACCESS_SECRET)?;
        let jwt_refresh_secret = secret("JWT_REFRESH_SECRET", DEV_REFRESH_SECRET)?;

        if jwt_secret == jwt_refresh_secret {
            return Err(ConfigError::InvalidValue(
                "JWT_SECRET and JWT_REFRESH_SECRET must differ".to_string(),
            ));
        }

        let jwt_access_token_ttl_seconds = lookup("JWT_ACCESS_TOKEN_TTL_SECONDS")
            .and_then(|s| s.parse::<i64>().ok())
            .unwrap_or(900);

        let jwt_refresh_token_ttl_days = lookup("JWT_REFRESH_TOKEN_TTL_DAYS")
            .and_then(|s| s.parse::<i64>().ok())
            .unwrap_or(365);

        let bootstrap_admin = match (lookup("ADMIN_USERNAME"), lookup("ADMIN_PASSWORD")) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                Some(BootstrapAdmin { username, password })
            }
            _ => None,
        };

        Ok(Config {
            database_url,
            environment,
            port,
            db_max_connections,
            cors_allowed_origins,
            log_level,
            jwt_secret,
            jwt_refresh_secret,
            jwt_access_token_ttl_seconds,
            jwt_refresh_token_ttl_days,
            bootstrap_admin,
        })
    }

    /// Signing secrets and lifetimes for the token codec
    pub fn token_config(&self) -> TokenConfig {
        TokenConfig {
            access_secret: self.jwt_secret.clone(),
            refresh_secret: self.jwt_refresh_secret.clone(),
            access_ttl: Duration::seconds(self.jwt_access_token_ttl_seconds),
            refresh_ttl: Duration::days(self.jwt_refresh_token_ttl_days),
        }
    }

    /// Whether the refresh cookie gets the `Secure` attribute
    pub fn secure_cookies(&self) -> bool {
        !self.environment.is_development()
    }

    /// Get database URL (useful for logging masked version)
    pub fn database_url_masked(&self) -> Option<String> {
        let url = self.database_url.as_ref()?;
        // Mask password in database URL for logging
        if let Some(at_pos) = url.find('@') {
            if let Some(colon_pos) = url[..at_pos].rfind(':') {
                let prefix = &url[..colon_pos + 1];
                let suffix = &url[at_pos..];
                return Some(format!("{}****{}", prefix, suffix));
            }
        }
        Some(url.clone())
    }
}
