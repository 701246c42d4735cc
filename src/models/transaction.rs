use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "transaction_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Deposit,
    Payment,
    Refund,
    Withdrawal,
}

/// Предел модуля суммы одной операции, в рублях.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000;
pub const MIN_AMOUNT: i64 = -MAX_AMOUNT;

impl TransactionType {
    /// Пополнение и возврат увеличивают баланс, оплата и вывод уменьшают.
    pub fn is_credit(&self) -> bool {
        matches!(self, TransactionType::Deposit | TransactionType::Refund)
    }

    /// Знак суммы должен совпадать с типом операции, модуль не больше [`MAX_AMOUNT`].
    pub fn accepts_amount(&self, amount: i64) -> bool {
        if !(MIN_AMOUNT..=MAX_AMOUNT).contains(&amount) {
            false
        } else if self.is_credit() {
            amount > 0
        } else {
            amount < 0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "transaction_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

/// Запись журнала операций. Сумма хранится со знаком, баланс = сумма всех записей.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    pub booking_id: Option<i64>,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub amount: i64,
    pub status: TransactionStatus,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub fn booking_payment_description(booking_id: i64) -> String {
    format!("Оплата бронирования #{}", booking_id)
}

/// Сумма журнала. `None` при выходе за пределы i64.
pub fn balance_of<'a, I>(transactions: I) -> Option<i64>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    transactions
        .into_iter()
        .try_fold(0i64, |acc, t| acc.checked_add(t.amount))
}
