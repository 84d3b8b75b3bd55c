//! Authentication module
//!
//! Username/password login backed by JWTs.
//! - Short-lived access tokens, sent as bearer tokens
//! - Long-lived refresh tokens, kept in an HTTP-only cookie and stored hashed
//! - One active session per user

mod cookie;
mod jwt;
mod password;
mod service;

pub use cookie::{SessionCookie, REFRESH_COOKIE_NAME};
pub use jwt::{Claims, JwtError, TokenCodec, TokenConfig, TokenPayload, TokenType};
pub use password::{hash_password, hash_token, verify_password, DEFAULT_COST};
pub use service::{AuthError, AuthService, LoginOutcome};
