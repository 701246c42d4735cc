pub mod auth;
pub mod booking;
pub mod catalog;
pub mod ledger;
pub mod reviews;
pub mod sql_logger;

use serde::Serialize;

/// Ответ на создание записи.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedId {
    pub id: i64,
}
