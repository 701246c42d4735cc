use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "sql_operation", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum SqlOperation {
    Select,
    Insert,
    Update,
    Delete,
    Other,
}

impl SqlOperation {
    /// Грубая классификация по первому слову запроса.
    pub fn detect(query: &str) -> Self {
        let normalized = query.trim_start().to_ascii_uppercase();
        if normalized.starts_with("SELECT") {
            SqlOperation::Select
        } else if normalized.starts_with("INSERT") {
            SqlOperation::Insert
        } else if normalized.starts_with("UPDATE") {
            SqlOperation::Update
        } else if normalized.starts_with("DELETE") {
            SqlOperation::Delete
        } else {
            SqlOperation::Other
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SqlLog {
    pub id: i64,
    pub query: String,
    pub operation: SqlOperation,
    /// Время выполнения в миллисекундах.
    pub execution_time: Option<i64>,
    pub user_id: Option<i64>,
    pub endpoint: Option<String>,
    pub params: Option<String>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::SqlOperation;

    #[test]
    fn detects_operation_by_prefix() {
        assert_eq!(SqlOperation::detect("SELECT * FROM workspaces"), SqlOperation::Select);
        assert_eq!(SqlOperation::detect("  insert into bookings"), SqlOperation::Insert);
        assert_eq!(SqlOperation::detect("\nUpdate bookings SET"), SqlOperation::Update);
        assert_eq!(SqlOperation::detect("DELETE FROM reviews"), SqlOperation::Delete);
        assert_eq!(SqlOperation::detect("WITH x AS (SELECT 1)"), SqlOperation::Other);
        assert_eq!(SqlOperation::detect(""), SqlOperation::Other);
    }
}
