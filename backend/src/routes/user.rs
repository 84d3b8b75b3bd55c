//! User route definitions

use axum::{routing::get, Router};

use crate::app_state::AppState;
use crate::handlers::user;

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(user::list_users).post(user::create_user))
        .route(
            "/api/users/:id",
            get(user::get_user)
                .put(user::update_user)
                .delete(user::delete_user),
        )
}
