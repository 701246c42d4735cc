//! logs.rs
//!
//! Просмотр журнала SQL-запросов. Доступно только администраторам.
//! Чтение журнала само в журнал не пишется.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use crate::error::ApiResult;
use crate::middleware::AuthUser;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/logs/sql", get(get_sql_logs))
}

fn default_limit() -> i64 {
    100
}

#[derive(Debug, Deserialize, Validate)]
struct SqlLogsQuery {
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 1000))]
    limit: i64,
}

// GET /api/logs/sql?limit=100
async fn get_sql_logs(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(params): Query<SqlLogsQuery>,
) -> ApiResult<impl IntoResponse> {
    user.require_admin()?;
    params.validate()?;

    let limit = params.limit;
    let logs = state
        .repo
        .read_unlogged(move |s| async move { s.recent_sql_logs(limit).await })
        .await?;
    Ok((StatusCode::OK, Json(logs)))
}
