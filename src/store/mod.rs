//! Слой хранения.
//!
//! [`Store`] описывает все обращения к данным. Есть две реализации:
//! - [`PgStore`]: PostgreSQL через sqlx, парные записи выполняются в одной транзакции;
//! - [`MemoryStore`]: хранилище в памяти с теми же гарантиями, для тестов и локальных запусков.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::models::{
    BookingDetails, BookingStatus, ReviewDetails, SqlLog, SqlOperation, Transaction,
    TransactionStatus, TransactionType, User, UserRole, Workspace, WorkspaceFilter,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} #{id} not found")]
    NotFound { entity: &'static str, id: i64 },
    #[error("insufficient funds: balance {balance}, required {required}")]
    InsufficientFunds { balance: i64, required: i64 },
    #[error("amount out of range")]
    AmountOutOfRange,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Вход/регистрация пользователя: вставка или обновление по email.
#[derive(Debug, Clone)]
pub struct UpsertUser {
    pub email: String,
    pub name: Option<String>,
    /// Хеш пароля записывается только для нового пользователя.
    pub password_hash: Option<String>,
    pub login_method: String,
    /// `None` сохраняет текущую роль (или `user` для нового).
    pub role: Option<UserRole>,
}

/// Оплаченная бронь: проверка баланса, бронь и списание выполняются атомарно.
#[derive(Debug, Clone, Serialize)]
pub struct NewBooking {
    pub user_id: i64,
    pub workspace_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub total_price: i64,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewReview {
    pub workspace_id: i64,
    pub user_id: i64,
    pub booking_id: Option<i64>,
    pub rating: i32,
    pub comment: Option<String>,
}

/// Новая запись журнала. Списания (отрицательная сумма) проверяются по балансу.
#[derive(Debug, Clone, Serialize)]
pub struct NewTransaction {
    pub user_id: i64,
    pub booking_id: Option<i64>,
    pub kind: TransactionType,
    pub amount: i64,
    pub status: TransactionStatus,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewSqlLog {
    pub query: String,
    pub operation: SqlOperation,
    pub execution_time: i64,
    pub user_id: Option<i64>,
    pub endpoint: Option<String>,
    pub params: Option<String>,
    pub error: Option<String>,
}

#[async_trait]
pub trait Store: Send + Sync {
    // --- пользователи ---
    async fn find_user(&self, id: i64) -> StoreResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn upsert_user(&self, user: UpsertUser) -> StoreResult<User>;

    // --- каталог ---
    /// Рабочие места по убыванию рейтинга.
    async fn list_workspaces(&self, filter: &WorkspaceFilter) -> StoreResult<Vec<Workspace>>;
    async fn find_workspace(&self, id: i64) -> StoreResult<Option<Workspace>>;

    // --- бронирования ---
    /// Брони пользователя по убыванию времени начала.
    async fn user_bookings(&self, user_id: i64) -> StoreResult<Vec<BookingDetails>>;
    /// Атомарно: блокировка баланса пользователя, проверка средств, бронь
    /// `confirmed/paid` и транзакция `payment` на `-total_price`. Возвращает id брони.
    async fn create_paid_booking(&self, booking: NewBooking) -> StoreResult<i64>;
    /// Обновляет статус брони пользователя. `false`, если такой брони у него нет.
    async fn update_booking_status(
        &self,
        user_id: i64,
        booking_id: i64,
        status: BookingStatus,
    ) -> StoreResult<bool>;

    // --- отзывы ---
    /// Отзывы рабочего места, новые первыми.
    async fn workspace_reviews(&self, workspace_id: i64) -> StoreResult<Vec<ReviewDetails>>;
    /// Атомарно: отзыв + пересчёт рейтинга и количества отзывов рабочего места.
    async fn create_review(&self, review: NewReview) -> StoreResult<i64>;

    // --- журнал операций ---
    /// Транзакции пользователя, новые первыми.
    async fn user_transactions(&self, user_id: i64) -> StoreResult<Vec<Transaction>>;
    async fn user_balance(&self, user_id: i64) -> StoreResult<i64>;
    async fn append_transaction(&self, transaction: NewTransaction) -> StoreResult<i64>;

    // --- журнал SQL ---
    async fn insert_sql_log(&self, entry: NewSqlLog) -> StoreResult<()>;
    async fn recent_sql_logs(&self, limit: i64) -> StoreResult<Vec<SqlLog>>;
}

/// Баланс после операции на `amount`. Баланс не может стать отрицательным
/// или выйти за пределы i64.
pub(crate) fn apply_amount(balance: i64, amount: i64) -> StoreResult<i64> {
    let next = balance
        .checked_add(amount)
        .ok_or(StoreError::AmountOutOfRange)?;
    if next < 0 {
        let required = amount.checked_neg().ok_or(StoreError::AmountOutOfRange)?;
        return Err(StoreError::InsufficientFunds { balance, required });
    }
    Ok(next)
}
