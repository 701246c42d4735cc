//! Журнал операций пользователя и баланс.
//!
//! Баланс нигде не хранится: это всегда сумма знаковых сумм всех транзакций.

use tracing::info;

use crate::error::AppError;
use crate::models::transaction::{MAX_AMOUNT, MIN_AMOUNT};
use crate::models::{Transaction, TransactionStatus, TransactionType, UserStats};
use crate::repository::Repository;
use crate::services::{sql_logger::QueryLog, CreatedId};
use crate::store::{NewTransaction, StoreError};

pub async fn user_transactions(repo: &Repository, user_id: i64) -> Result<Vec<Transaction>, AppError> {
    let log = QueryLog::new(
        "transactions.getUserTransactions",
        format!(
            "SELECT * FROM transactions WHERE user_id = {} ORDER BY created_at DESC",
            user_id
        ),
    )
    .user(user_id)
    .params(&serde_json::json!({ "userId": user_id }));
    repo.read(log, move |s| async move { s.user_transactions(user_id).await })
        .await
}

pub async fn user_balance(repo: &Repository, user_id: i64) -> Result<i64, AppError> {
    let log = QueryLog::new(
        "transactions.getUserBalance",
        format!(
            "SELECT and calculate balance from transactions WHERE user_id = {}",
            user_id
        ),
    )
    .user(user_id)
    .params(&serde_json::json!({ "userId": user_id }));
    repo.read(log, move |s| async move { s.user_balance(user_id).await })
        .await
}

/// Ручная операция. Знак суммы должен соответствовать типу,
/// списания проверяются по текущему балансу.
pub async fn create_transaction(
    repo: &Repository,
    user_id: i64,
    kind: TransactionType,
    amount: i64,
    description: Option<String>,
) -> Result<CreatedId, AppError> {
    if !(MIN_AMOUNT..=MAX_AMOUNT).contains(&amount) {
        return Err(AppError::Validation(format!(
            "Сумма операции должна быть не больше {} по модулю",
            MAX_AMOUNT
        )));
    }
    if !kind.accepts_amount(amount) {
        let expected = if kind.is_credit() { "положительной" } else { "отрицательной" };
        return Err(AppError::Validation(format!(
            "Сумма операции этого типа должна быть {}",
            expected
        )));
    }

    let transaction = NewTransaction {
        user_id,
        booking_id: None,
        kind,
        amount,
        status: TransactionStatus::Completed,
        description,
    };
    let log = QueryLog::new("transactions.create", "INSERT INTO transactions VALUES (...)")
        .user(user_id)
        .params(&transaction);

    let id = repo
        .write(log, move |s| async move { s.append_transaction(transaction).await })
        .await?;

    info!("Transaction {} recorded: user={}, amount={}", id, user_id, amount);
    Ok(CreatedId { id })
}

/// Статистика для личного кабинета. Одно обращение, одна запись в журнале SQL.
pub async fn user_stats(repo: &Repository, user_id: i64) -> Result<UserStats, AppError> {
    let log = QueryLog::new(
        "stats.getUserStats",
        format!(
            "SELECT bookings.status FROM bookings WHERE user_id = {0}; \
             SELECT SUM(amount) FROM transactions WHERE user_id = {0}",
            user_id
        ),
    )
    .user(user_id)
    .params(&serde_json::json!({ "userId": user_id }));
    repo.read(log, move |s| async move {
        let (bookings, balance) =
            futures::try_join!(s.user_bookings(user_id), s.user_balance(user_id))?;
        Ok::<_, StoreError>(UserStats::from_bookings(
            bookings.iter().map(|d| &d.booking),
            balance,
        ))
    })
    .await
}
