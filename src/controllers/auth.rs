use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

use crate::error::{ApiResult, AppError};
use crate::middleware::AuthUser;
use crate::services::auth::{self, LoginRequest, SessionUser};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        .route("/auth/logout", post(logout))
        .route("/users/profile", get(get_profile))
}

// POST /api/auth/login
async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let response = auth::login(&state.repo, &state.tokens, &state.config.auth, req).await?;
    Ok((StatusCode::OK, Json(response)))
}

// GET /api/auth/me
async fn me(user: AuthUser) -> Json<SessionUser> {
    Json(SessionUser {
        id: user.user_id,
        email: user.email,
        name: user.name,
        role: user.role,
    })
}

// POST /api/auth/logout: токены без состояния, клиент просто забывает токен
async fn logout() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "success": true }))
}

// GET /api/users/profile
async fn get_profile(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> ApiResult<impl IntoResponse> {
    let profile = auth::profile(&state.repo, user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Пользователь не найден".to_string()))?;
    Ok((StatusCode::OK, Json(profile)))
}
