//! API handlers for the course manager backend

pub mod auth;
pub mod course;
pub mod health;
pub mod user;

pub use health::health_check;

// Re-export extractors from middleware for handler use
pub use crate::middleware::auth::{AdminUser, AuthenticatedUser, EditorUser};
