//! Бронирование рабочих мест с оплатой с баланса.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::error::AppError;
use crate::models::{booking::quote_price, BookingDetails, BookingStatus};
use crate::repository::Repository;
use crate::services::{catalog, sql_logger::QueryLog};
use crate::store::NewBooking;

#[derive(Debug, Clone)]
pub struct BookingDraft {
    pub workspace_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingReceipt {
    pub id: i64,
    pub total_price: i64,
}

pub async fn user_bookings(repo: &Repository, user_id: i64) -> Result<Vec<BookingDetails>, AppError> {
    let log = QueryLog::new(
        "bookings.getUserBookings",
        format!(
            "SELECT bookings.*, workspaces.name, workspaces.type FROM bookings \
             LEFT JOIN workspaces ON bookings.workspace_id = workspaces.id \
             WHERE bookings.user_id = {} ORDER BY start_time DESC",
            user_id
        ),
    )
    .user(user_id)
    .params(&serde_json::json!({ "userId": user_id }));
    repo.read(log, move |s| async move { s.user_bookings(user_id).await })
        .await
}

/// Создаёт оплаченную бронь: цена = цена за час * число начатых часов.
pub async fn create_booking(
    repo: &Repository,
    user_id: i64,
    draft: BookingDraft,
) -> Result<BookingReceipt, AppError> {
    if !repo.is_available() {
        return Err(AppError::DatabaseUnavailable);
    }

    let workspace = catalog::get_workspace(repo, draft.workspace_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Рабочее место не найдено".to_string()))?;

    let total_price = quote_price(workspace.price_per_hour, draft.start_time, draft.end_time)?;

    let booking = NewBooking {
        user_id,
        workspace_id: workspace.id,
        start_time: draft.start_time,
        end_time: draft.end_time,
        total_price,
        notes: draft.notes,
    };
    let log = QueryLog::new("bookings.create", "INSERT INTO bookings VALUES (...)")
        .user(user_id)
        .params(&booking);

    let id = repo
        .write(log, move |s| async move { s.create_paid_booking(booking).await })
        .await?;

    info!(
        "Booking {} created: user={}, workspace={}, total={}",
        id, user_id, workspace.id, total_price
    );
    Ok(BookingReceipt { id, total_price })
}

/// Статус меняется без проверки переходов. Отмена не создаёт возврат средств.
pub async fn update_status(
    repo: &Repository,
    user_id: i64,
    booking_id: i64,
    status: BookingStatus,
) -> Result<(), AppError> {
    let log = QueryLog::new(
        "bookings.updateStatus",
        format!(
            "UPDATE bookings SET status = '{}' WHERE id = {}",
            status.as_str(),
            booking_id
        ),
    )
    .user(user_id)
    .params(&serde_json::json!({ "bookingId": booking_id, "status": status }));

    let updated = repo
        .write(log, move |s| async move {
            s.update_booking_status(user_id, booking_id, status).await
        })
        .await?;

    if !updated {
        return Err(AppError::NotFound("Бронирование не найдено".to_string()));
    }
    info!("Booking {} status set to {}", booking_id, status.as_str());
    Ok(())
}
