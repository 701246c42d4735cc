use serde::Serialize;
use sqlx::FromRow;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: i64,
    pub workspace_id: i64,
    pub user_id: i64,
    pub booking_id: Option<i64>,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDetails {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub review: Review,
    pub user_name: Option<String>,
}

/// Среднее арифметическое оценок в десятых долях, округление половины вверх.
/// Пустой список даёт 0.
pub fn mean_rating_tenths(ratings: &[i32]) -> i32 {
    if ratings.is_empty() {
        return 0;
    }
    let n = ratings.len() as i64;
    let sum: i64 = ratings.iter().map(|&r| i64::from(r)).sum();
    // round(sum * 10 / n) = floor((20 * sum + n) / 2n) для неотрицательных сумм
    ((20 * sum + n) / (2 * n)) as i32
}
