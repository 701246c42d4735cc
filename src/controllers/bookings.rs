use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use crate::error::ApiResult;
use crate::middleware::AuthUser;
use crate::models::BookingStatus;
use crate::services::booking::{self, BookingDraft};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/bookings", get(get_user_bookings).post(create_booking))
        .route("/bookings/status", patch(update_booking_status))
}

/* ---------- BOOKINGS ---------- */

// GET /api/bookings
async fn get_user_bookings(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> ApiResult<impl IntoResponse> {
    let bookings = booking::user_bookings(&state.repo, user.user_id).await?;
    Ok((StatusCode::OK, Json(bookings)))
}

// POST /api/bookings
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct CreateBookingRequest {
    #[validate(range(min = 1, message = "workspaceId должен быть > 0"))]
    workspace_id: i64,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    #[validate(length(max = 1000))]
    notes: Option<String>,
}

async fn create_booking(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<CreateBookingRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate()?;

    let receipt = booking::create_booking(
        &state.repo,
        user.user_id,
        BookingDraft {
            workspace_id: req.workspace_id,
            start_time: req.start_time,
            end_time: req.end_time,
            notes: req.notes,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(receipt)))
}

// PATCH /api/bookings/status
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct UpdateStatusRequest {
    #[validate(range(min = 1, message = "bookingId должен быть > 0"))]
    booking_id: i64,
    status: BookingStatus,
}

async fn update_booking_status(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<UpdateStatusRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate()?;

    booking::update_status(&state.repo, user.user_id, req.booking_id, req.status).await?;
    Ok((StatusCode::OK, Json(serde_json::json!({ "success": true }))))
}
