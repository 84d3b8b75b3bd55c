//! JWT token generation and validation
//!
//! Handles creation and verification of access and refresh tokens. The two
//! classes are signed with different secrets and carry the same claim shape.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{User, UserRole};

/// JWT-related errors
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("No signing secret configured for {0} tokens")]
    MissingSecret(&'static str),

    #[error("Token encoding failed: {0}")]
    EncodingFailed(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

impl JwtError {
    /// Configuration problems, as opposed to a bad token presented by a client
    pub fn is_misconfiguration(&self) -> bool {
        matches!(self, JwtError::MissingSecret(_) | JwtError::EncodingFailed(_))
    }
}

/// JWT claims shared by access and refresh tokens
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    /// JWT ID, unique per issued token
    pub jti: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
    /// Token type (access or refresh)
    pub token_type: String,
}

impl Claims {
    /// Parse the subject back into a user id
    pub fn user_id(&self) -> Result<Uuid, JwtError> {
        Uuid::parse_str(&self.sub).map_err(|e| JwtError::InvalidToken(e.to_string()))
    }

    pub fn role(&self) -> Result<UserRole, JwtError> {
        self.role.parse().map_err(JwtError::InvalidToken)
    }
}

/// Token type enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    Access,
    Refresh,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

/// The user-derived part of the claims
#[derive(Debug, Clone)]
pub struct TokenPayload {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
}

impl From<&User> for TokenPayload {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            role: user.role,
        }
    }
}

/// Secrets and lifetimes for both token classes
#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl TokenConfig {
    /// 15 minute access tokens, 1 year refresh tokens
    pub fn new(access_secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            access_ttl: Duration::minutes(15),
            refresh_ttl: Duration::days(365),
        }
    }
}

/// Signs and verifies access and refresh tokens
#[derive(Debug, Clone)]
pub struct TokenCodec {
    config: TokenConfig,
}

impl TokenCodec {
    pub fn new(config: TokenConfig) -> Self {
        Self { config }
    }

    fn secret(&self, token_type: TokenType) -> Result<&str, JwtError> {
        let secret = match token_type {
            TokenType::Access => &self.config.access_secret,
            TokenType::Refresh => &self.config.refresh_secret,
        };
        if secret.is_empty() {
            return Err(JwtError::MissingSecret(token_type.as_str()));
        }
        Ok(secret)
    }

    /// Sign a token for `subject` that expires `ttl` from now
    pub fn issue(
        &self,
        payload: &TokenPayload,
        subject: &str,
        token_type: TokenType,
        ttl: Duration,
    ) -> Result<String, JwtError> {
        let secret = self.secret(token_type)?;
        let now = Utc::now();
        let exp = now + ttl;

        let claims = Claims {
            sub: subject.to_string(),
            username: payload.username.clone(),
            first_name: payload.first_name.clone(),
            last_name: payload.last_name.clone(),
            role: payload.role.as_str().to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            token_type: token_type.as_str().to_string(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Generate an access token for a user
    pub fn issue_access(&self, user: &User) -> Result<String, JwtError> {
        self.issue(
            &TokenPayload::from(user),
            &user.id.to_string(),
            TokenType::Access,
            self.config.access_ttl,
        )
    }

    /// Generate a refresh token for a user
    pub fn issue_refresh(&self, user: &User) -> Result<String, JwtError> {
        self.issue(
            &TokenPayload::from(user),
            &user.id.to_string(),
            TokenType::Refresh,
            self.config.refresh_ttl,
        )
    }

    /// Verify and decode a token of the given class
    ///
    /// # Returns
    /// * `Ok(Claims)` if the signature, expiry and token class all check out
    /// * `Err(JwtError)` otherwise
    pub fn verify(&self, token: &str, token_type: TokenType) -> Result<Claims, JwtError> {
        let secret = self.secret(token_type)?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        // No clock tolerance: a token is dead the second it expires
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => JwtError::TokenExpired,
            _ => JwtError::InvalidToken(e.to_string()),
        })?;

        if token_data.claims.token_type != token_type.as_str() {
            return Err(JwtError::InvalidToken(format!(
                "expected {} token",
                token_type.as_str()
            )));
        }

        Ok(token_data.claims)
    }
}
