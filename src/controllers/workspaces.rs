use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use std::sync::Arc;

use crate::error::{ApiResult, AppError};
use crate::models::WorkspaceFilter;
use crate::services::catalog;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/workspaces", get(list_workspaces))
        .route("/workspaces/{id}", get(get_workspace))
}

// GET /api/workspaces?type=manicure&search=окно
async fn list_workspaces(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<WorkspaceFilter>,
) -> ApiResult<impl IntoResponse> {
    let workspaces = catalog::list_workspaces(&state.repo, filter).await?;
    Ok((StatusCode::OK, Json(workspaces)))
}

// GET /api/workspaces/{id}
async fn get_workspace(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    if id <= 0 {
        return Err(AppError::Validation("id должен быть > 0".to_string()));
    }

    let workspace = catalog::get_workspace(&state.repo, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Рабочее место не найдено".to_string()))?;
    Ok((StatusCode::OK, Json(workspace)))
}
