//! Application state shared across handlers

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::auth::{AuthService, SessionCookie};
use crate::course::CourseService;
use crate::user::UserService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub user_service: Arc<UserService>,
    pub course_service: Arc<CourseService>,
    pub session_cookie: SessionCookie,
    /// Present when running against PostgreSQL
    pub db_pool: Option<PgPool>,
}

impl AppState {
    pub fn new(
        auth_service: Arc<AuthService>,
        user_service: Arc<UserService>,
        course_service: Arc<CourseService>,
        session_cookie: SessionCookie,
        db_pool: Option<PgPool>,
    ) -> Self {
        Self {
            auth_service,
            user_service,
            course_service,
            session_cookie,
            db_pool,
        }
    }
}

impl FromRef<AppState> for Arc<AuthService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.auth_service.clone()
    }
}

impl FromRef<AppState> for Arc<UserService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.user_service.clone()
    }
}

impl FromRef<AppState> for Arc<CourseService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.course_service.clone()
    }
}
