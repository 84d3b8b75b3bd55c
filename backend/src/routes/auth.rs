//! Authentication routes

use axum::{routing::post, Router};

use crate::app_state::AppState;
use crate::handlers::auth;

/// Create authentication routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/refresh", post(auth::refresh))
        .route("/api/auth/logout", post(auth::logout))
}
