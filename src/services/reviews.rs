use tracing::info;

use crate::error::AppError;
use crate::models::ReviewDetails;
use crate::repository::Repository;
use crate::services::{sql_logger::QueryLog, CreatedId};
use crate::store::NewReview;

#[derive(Debug, Clone)]
pub struct ReviewDraft {
    pub workspace_id: i64,
    pub booking_id: Option<i64>,
    pub rating: i32,
    pub comment: Option<String>,
}

pub async fn workspace_reviews(
    repo: &Repository,
    workspace_id: i64,
) -> Result<Vec<ReviewDetails>, AppError> {
    let log = QueryLog::new(
        "reviews.getByWorkspace",
        format!(
            "SELECT reviews.*, users.name AS user_name FROM reviews \
             LEFT JOIN users ON reviews.user_id = users.id \
             WHERE workspace_id = {} ORDER BY created_at DESC",
            workspace_id
        ),
    )
    .params(&serde_json::json!({ "workspaceId": workspace_id }));
    repo.read(log, move |s| async move { s.workspace_reviews(workspace_id).await })
        .await
}

/// Сохраняет отзыв и пересчитывает средний рейтинг рабочего места.
pub async fn create_review(
    repo: &Repository,
    user_id: i64,
    draft: ReviewDraft,
) -> Result<CreatedId, AppError> {
    if !(1..=5).contains(&draft.rating) {
        return Err(AppError::Validation("Оценка должна быть от 1 до 5".to_string()));
    }

    let review = NewReview {
        workspace_id: draft.workspace_id,
        user_id,
        booking_id: draft.booking_id,
        rating: draft.rating,
        comment: draft.comment,
    };
    let log = QueryLog::new(
        "reviews.create",
        "INSERT INTO reviews VALUES (...) and UPDATE workspaces rating",
    )
    .user(user_id)
    .params(&review);

    let id = repo
        .write(log, move |s| async move { s.create_review(review).await })
        .await?;

    info!("Review {} added to workspace {}", id, draft.workspace_id);
    Ok(CreatedId { id })
}
