//! Authentication request/response DTOs

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::UserResponse;

/// Login request body
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "username should not be empty"))]
    pub username: String,
    #[validate(length(min = 1, message = "password should not be empty"))]
    pub password: String,
}

/// Body returned by login and refresh.
///
/// The refresh token is never part of it; it only travels in the cookie.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}
