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
use crate::services::reviews::{self, ReviewDraft};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/reviews", get(get_workspace_reviews).post(create_review))
}

// GET /api/reviews?workspaceId=1
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct ReviewsQuery {
    #[validate(range(min = 1))]
    workspace_id: i64,
}

async fn get_workspace_reviews(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ReviewsQuery>,
) -> ApiResult<impl IntoResponse> {
    params.validate()?;

    let list = reviews::workspace_reviews(&state.repo, params.workspace_id).await?;
    Ok((StatusCode::OK, Json(list)))
}

// POST /api/reviews
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct CreateReviewRequest {
    #[validate(range(min = 1))]
    workspace_id: i64,
    #[validate(range(min = 1))]
    booking_id: Option<i64>,
    #[validate(range(min = 1, max = 5, message = "оценка от 1 до 5"))]
    rating: i32,
    #[validate(length(max = 2000))]
    comment: Option<String>,
}

async fn create_review(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<CreateReviewRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate()?;

    let created = reviews::create_review(
        &state.repo,
        user.user_id,
        ReviewDraft {
            workspace_id: req.workspace_id,
            booking_id: req.booking_id,
            rating: req.rating,
            comment: req.comment,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(created)))
}
