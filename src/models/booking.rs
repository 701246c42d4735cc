use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use chrono::{DateTime, Utc};
use thiserror::Error;

use super::WorkspaceType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "booking_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }
}

// Статус оплаты не зависит от статуса брони
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refunded,
}

/// Бронь на полуинтервал `[start_time, end_time)`.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: i64,
    pub workspace_id: i64,
    pub user_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: BookingStatus,
    pub total_price: i64,
    pub payment_status: PaymentStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Бронь + данные рабочего места для списка "Мои бронирования"
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDetails {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub booking: Booking,
    pub workspace_name: Option<String>,
    pub workspace_type: Option<WorkspaceType>,
    pub workspace_image: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_bookings: i64,
    pub active_bookings: i64,
    pub completed_bookings: i64,
    pub balance: i64,
}

impl UserStats {
    pub fn from_bookings<'a, I>(bookings: I, balance: i64) -> Self
    where
        I: IntoIterator<Item = &'a Booking>,
    {
        let mut stats = UserStats { balance, ..Default::default() };
        for booking in bookings {
            stats.total_bookings += 1;
            match booking.status {
                BookingStatus::Confirmed => stats.active_bookings += 1,
                BookingStatus::Completed => stats.completed_bookings += 1,
                _ => {}
            }
        }
        stats
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    #[error("время окончания должно быть позже времени начала")]
    EmptyInterval,
    #[error("стоимость бронирования слишком велика")]
    Overflow,
}

const HOUR_MS: i64 = 60 * 60 * 1000;

/// Количество оплачиваемых часов: неполный час округляется вверх.
pub fn billable_hours(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<i64, PricingError> {
    let ms = (end - start).num_milliseconds();
    if ms <= 0 {
        return Err(PricingError::EmptyInterval);
    }
    Ok((ms + HOUR_MS - 1) / HOUR_MS)
}

pub fn quote_price(
    price_per_hour: i64,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<i64, PricingError> {
    let hours = billable_hours(start, end)?;
    price_per_hour.checked_mul(hours).ok_or(PricingError::Overflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, hour, minute, 0).unwrap()
    }

    #[test]
    fn whole_hours_are_billed_exactly() {
        assert_eq!(billable_hours(at(10, 0), at(12, 0)), Ok(2));
        assert_eq!(quote_price(800, at(10, 0), at(11, 0)), Ok(800));
    }

    #[test]
    fn partial_hour_rounds_up() {
        assert_eq!(billable_hours(at(10, 0), at(10, 1)), Ok(1));
        assert_eq!(quote_price(800, at(10, 0), at(11, 30)), Ok(1600));
        let one_ms_over = at(11, 0) + Duration::milliseconds(1);
        assert_eq!(billable_hours(at(10, 0), one_ms_over), Ok(2));
    }

    #[test]
    fn empty_or_inverted_interval_is_rejected() {
        assert_eq!(billable_hours(at(10, 0), at(10, 0)), Err(PricingError::EmptyInterval));
        assert_eq!(quote_price(800, at(12, 0), at(10, 0)), Err(PricingError::EmptyInterval));
    }

    #[test]
    fn overflow_is_reported() {
        assert_eq!(quote_price(i64::MAX, at(10, 0), at(12, 0)), Err(PricingError::Overflow));
    }

    #[test]
    fn stats_count_confirmed_as_active() {
        let make = |status| Booking {
            id: 1,
            workspace_id: 1,
            user_id: 1,
            start_time: at(10, 0),
            end_time: at(11, 0),
            status,
            total_price: 800,
            payment_status: PaymentStatus::Paid,
            notes: None,
            created_at: at(9, 0),
            updated_at: at(9, 0),
        };
        let bookings = vec![
            make(BookingStatus::Confirmed),
            make(BookingStatus::Confirmed),
            make(BookingStatus::Completed),
            make(BookingStatus::Cancelled),
            make(BookingStatus::Pending),
        ];

        let stats = UserStats::from_bookings(&bookings, 1200);
        assert_eq!(
            stats,
            UserStats { total_bookings: 5, active_bookings: 2, completed_bookings: 1, balance: 1200 }
        );
    }
}
