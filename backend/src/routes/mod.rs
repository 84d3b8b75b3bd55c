//! Route definitions for the course manager API

mod auth;
mod course;
mod user;

use axum::{routing::get, Router};

use crate::app_state::AppState;
use crate::handlers;
use crate::middleware;

pub use auth::auth_routes;
pub use course::course_routes;
pub use user::user_routes;

/// Full API router with state applied and the common middleware stack
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .merge(auth_routes())
        .merge(course_routes())
        .merge(user_routes())
        .with_state(state)
        .layer(axum::middleware::from_fn(middleware::security_headers))
        .layer(axum::middleware::from_fn(middleware::request_tracing))
}

async fn root() -> &'static str {
    "Course Manager API Server"
}
