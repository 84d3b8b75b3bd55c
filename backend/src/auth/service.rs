//! Authentication service
//!
//! Login, refresh and logout over the credential store. Each user has at most
//! one live refresh token, identified by the hash stored on the user row.

use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{LoginResponse, User};
use crate::store::{StoreError, UserStore};

use super::jwt::{Claims, JwtError, TokenCodec, TokenType};
use super::password::{self, PasswordError};

/// Auth service errors
///
/// Unknown users and wrong passwords share one message, and every refresh
/// failure shares another.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Account is disabled")]
    AccountDisabled,

    #[error("Refresh token required")]
    MissingRefreshToken,

    #[error("Refresh token is not valid")]
    InvalidRefreshToken,

    #[error("Authentication is misconfigured: {0}")]
    Misconfiguration(String),

    #[error("Credential store error: {0}")]
    Store(String),
}

impl AuthError {
    /// Whether the transport must drop the refresh cookie alongside this error
    pub fn clears_session_cookie(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidCredentials
                | AuthError::AccountDisabled
                | AuthError::MissingRefreshToken
                | AuthError::InvalidRefreshToken
        )
    }
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        AuthError::Store(e.to_string())
    }
}

impl From<PasswordError> for AuthError {
    fn from(e: PasswordError) -> Self {
        AuthError::Store(e.to_string())
    }
}

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// Body for the client
    pub response: LoginResponse,
    /// Plaintext refresh token, only ever sent as a cookie
    pub refresh_token: String,
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    codec: TokenCodec,
    bcrypt_cost: u32,
}

impl AuthService {
    /// Create a new AuthService
    pub fn new(users: Arc<dyn UserStore>, codec: TokenCodec) -> Self {
        Self {
            users,
            codec,
            bcrypt_cost: password::DEFAULT_COST,
        }
    }

    /// Override the bcrypt cost used for new password hashes
    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    /// Check credentials and start a new session, replacing any existing one
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let user = self.users.find_by_username(username).await?;

        let password_ok = match &user {
            Some(user) => password::verify_password(password, &user.password_hash).await?,
            None => {
                // Spend the same bcrypt work as a real comparison
                password::hash_password(password, self.bcrypt_cost).await?;
                false
            }
        };

        let user = match user {
            Some(user) if password_ok => user,
            _ => {
                tracing::debug!(username = %username, "Login rejected");
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !user.is_active {
            tracing::debug!(user_id = %user.id, "Login rejected for disabled account");
            return Err(AuthError::AccountDisabled);
        }

        let access_token = self.issue(&user, TokenType::Access)?;
        let refresh_token = self.issue(&user, TokenType::Refresh)?;

        self.users
            .set_refresh_token(user.id, Some(password::hash_token(&refresh_token)))
            .await?;

        tracing::info!(user_id = %user.id, username = %user.username, "User logged in");

        Ok(LoginOutcome {
            response: LoginResponse {
                token: access_token,
                user: user.into(),
            },
            refresh_token,
        })
    }

    /// Exchange the refresh cookie for a new access token
    ///
    /// The refresh token itself is not rotated. A validly signed token that
    /// does not match the stored hash ends the session for that user.
    pub async fn refresh(&self, refresh_token: Option<&str>) -> Result<LoginResponse, AuthError> {
        let refresh_token = match refresh_token {
            Some(token) if !token.is_empty() => token,
            _ => return Err(AuthError::MissingRefreshToken),
        };

        let claims = self
            .codec
            .verify(refresh_token, TokenType::Refresh)
            .map_err(|e| {
                if e.is_misconfiguration() {
                    tracing::error!(error = %e, "Cannot verify refresh tokens");
                    return AuthError::Misconfiguration(e.to_string());
                }
                tracing::debug!(error = %e, "Refresh token failed verification");
                AuthError::InvalidRefreshToken
            })?;

        let user_id = claims
            .user_id()
            .map_err(|_| AuthError::InvalidRefreshToken)?;

        let user = match self.users.find_by_id(user_id).await? {
            Some(user) => user,
            None => {
                tracing::debug!(user_id = %user_id, "Refresh for unknown user");
                return Err(AuthError::InvalidRefreshToken);
            }
        };

        let Some(stored_hash) = user.refresh_token_hash.as_deref() else {
            tracing::debug!(user_id = %user.id, "Refresh for user without a session");
            return Err(AuthError::InvalidRefreshToken);
        };

        if !password::token_matches(refresh_token, stored_hash) {
            tracing::warn!(
                user_id = %user.id,
                "Refresh token does not match the active session, terminating it"
            );
            self.users.set_refresh_token(user.id, None).await?;
            return Err(AuthError::InvalidRefreshToken);
        }

        let access_token = self.issue(&user, TokenType::Access)?;

        tracing::debug!(user_id = %user.id, "Access token refreshed");

        Ok(LoginResponse {
            token: access_token,
            user: user.into(),
        })
    }

    /// End the session of an already authenticated user. Idempotent.
    pub async fn logout(&self, user_id: Uuid) -> Result<(), AuthError> {
        self.users.set_refresh_token(user_id, None).await?;
        tracing::info!(user_id = %user_id, "User logged out");
        Ok(())
    }

    /// Verify a bearer access token
    pub fn verify_access_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.codec.verify(token, TokenType::Access)
    }

    fn issue(&self, user: &User, token_type: TokenType) -> Result<String, AuthError> {
        let token = match token_type {
            TokenType::Access => self.codec.issue_access(user),
            TokenType::Refresh => self.codec.issue_refresh(user),
        };
        token.map_err(|e| {
            tracing::error!(error = %e, "Token signing failed");
            AuthError::Misconfiguration(e.to_string())
        })
    }
}
