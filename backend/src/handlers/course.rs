//! Course HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;
use validator::Validate;

use super::{AdminUser, AuthenticatedUser, EditorUser};
use crate::app_state::AppState;
use crate::course::{Course, CourseQuery, CreateCourseRequest, UpdateCourseRequest};
use crate::error::{ApiError, ApiResult};

/// GET /api/courses - List courses, optionally filtered by name and description
pub async fn list_courses(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    WithRejection(Query(query), _): WithRejection<Query<CourseQuery>, ApiError>,
) -> ApiResult<Json<Vec<Course>>> {
    let courses = state.course_service.find_all(query).await?;
    Ok(Json(courses))
}

/// GET /api/courses/count
pub async fn count_courses(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> ApiResult<Json<u64>> {
    Ok(Json(state.course_service.count().await?))
}

/// GET /api/courses/:id
pub async fn get_course(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> ApiResult<Json<Course>> {
    Ok(Json(state.course_service.find_by_id(id).await?))
}

/// POST /api/courses - admin or editor
pub async fn create_course(
    State(state): State<AppState>,
    EditorUser(user): EditorUser,
    WithRejection(Json(req), _): WithRejection<Json<CreateCourseRequest>, ApiError>,
) -> ApiResult<(StatusCode, Json<Course>)> {
    req.validate()?;

    let course = state.course_service.save(req).await?;
    tracing::debug!(course_id = %course.id, by = %user.username, "Course created via API");

    Ok((StatusCode::CREATED, Json(course)))
}

/// PUT /api/courses/:id - admin or editor
pub async fn update_course(
    State(state): State<AppState>,
    EditorUser(_user): EditorUser,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
    WithRejection(Json(req), _): WithRejection<Json<UpdateCourseRequest>, ApiError>,
) -> ApiResult<Json<Course>> {
    req.validate()?;
    Ok(Json(state.course_service.update(id, req).await?))
}

/// DELETE /api/courses/:id - admin only; returns the deleted id
pub async fn delete_course(
    State(state): State<AppState>,
    AdminUser(_user): AdminUser,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> ApiResult<Json<Uuid>> {
    Ok(Json(state.course_service.delete(id).await?))
}
