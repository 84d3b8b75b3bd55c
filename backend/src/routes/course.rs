//! Course route definitions

use axum::{routing::get, Router};

use crate::app_state::AppState;
use crate::handlers::course;

pub fn course_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/courses",
            get(course::list_courses).post(course::create_course),
        )
        .route("/api/courses/count", get(course::count_courses))
        .route(
            "/api/courses/:id",
            get(course::get_course)
                .put(course::update_course)
                .delete(course::delete_course),
        )
}
