//! User management handlers. Every route here is admin-only.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;
use validator::Validate;

use super::AdminUser;
use crate::app_state::AppState;
use crate::error::{ApiError, ApiResult};
use crate::models::UserResponse;
use crate::user::{CreateUserRequest, UpdateUserRequest, UserQuery};

/// GET /api/users - List accounts, filtered by username, name or role
pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
    WithRejection(Query(query), _): WithRejection<Query<UserQuery>, ApiError>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    Ok(Json(state.user_service.find_all(query).await?))
}

/// GET /api/users/:id
pub async fn get_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> ApiResult<Json<UserResponse>> {
    Ok(Json(state.user_service.find_by_id(id).await?))
}

/// POST /api/users
pub async fn create_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    WithRejection(Json(req), _): WithRejection<Json<CreateUserRequest>, ApiError>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    req.validate()?;
    let user = state.user_service.create(req.into()).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// PUT /api/users/:id - Partial update, including `isActive`
pub async fn update_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
    WithRejection(Json(req), _): WithRejection<Json<UpdateUserRequest>, ApiError>,
) -> ApiResult<Json<UserResponse>> {
    req.validate()?;
    Ok(Json(state.user_service.update(id, req, admin.user_id).await?))
}

/// DELETE /api/users/:id - Returns the deleted id
pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> ApiResult<Json<Uuid>> {
    Ok(Json(state.user_service.delete(id, admin.user_id).await?))
}
