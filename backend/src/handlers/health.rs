use axum::{extract::State, Json};
use serde::Serialize;

use crate::app_state::AppState;
use crate::db;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    database: String,
    version: String,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let (status, database) = match &state.db_pool {
        Some(pool) => match db::check_health(pool).await {
            Ok(()) => ("healthy", "connected".to_string()),
            Err(e) => ("unhealthy", format!("error: {}", e)),
        },
        None => ("healthy", "in-memory".to_string()),
    };

    Json(HealthResponse {
        status: status.to_string(),
        database,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
