use axum::{
    extract::State,
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
use crate::models::transaction::{MAX_AMOUNT, MIN_AMOUNT};
use crate::models::TransactionType;
use crate::services::ledger;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/transactions", get(get_user_transactions).post(create_transaction))
        .route("/transactions/balance", get(get_user_balance))
        .route("/stats", get(get_user_stats))
}

// GET /api/transactions
async fn get_user_transactions(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> ApiResult<impl IntoResponse> {
    let list = ledger::user_transactions(&state.repo, user.user_id).await?;
    Ok((StatusCode::OK, Json(list)))
}

// GET /api/transactions/balance
async fn get_user_balance(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> ApiResult<impl IntoResponse> {
    let balance = ledger::user_balance(&state.repo, user.user_id).await?;
    Ok((StatusCode::OK, Json(balance)))
}

// POST /api/transactions
#[derive(Debug, Deserialize, Validate)]
struct CreateTransactionRequest {
    #[serde(rename = "type")]
    kind: TransactionType,
    #[validate(range(min = MIN_AMOUNT, max = MAX_AMOUNT, message = "сумма вне допустимого диапазона"))]
    amount: i64,
    #[validate(length(max = 500))]
    description: Option<String>,
}

async fn create_transaction(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<CreateTransactionRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate()?;

    let created =
        ledger::create_transaction(&state.repo, user.user_id, req.kind, req.amount, req.description)
            .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

// GET /api/stats
async fn get_user_stats(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> ApiResult<impl IntoResponse> {
    let stats = ledger::user_stats(&state.repo, user.user_id).await?;
    Ok((StatusCode::OK, Json(stats)))
}
