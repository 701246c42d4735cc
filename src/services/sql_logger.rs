//! Журнал SQL-запросов.
//!
//! Каждое обращение к данным выполняется через [`SqlLogger::run`]: замеряется
//! время, определяется тип операции, при ошибке сохраняется её текст, а сама
//! ошибка возвращается вызывающему без изменений. Сбой записи в журнал не
//! влияет на результат запроса и попадает только в tracing.

use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, error};

use crate::models::SqlOperation;
use crate::store::{NewSqlLog, Store, StoreResult};

/// Описание одного обращения к данным для журнала.
#[derive(Debug, Clone)]
pub struct QueryLog {
    pub query: String,
    pub endpoint: &'static str,
    pub user_id: Option<i64>,
    pub params: Option<String>,
}

impl QueryLog {
    pub fn new(endpoint: &'static str, query: impl Into<String>) -> Self {
        Self { query: query.into(), endpoint, user_id: None, params: None }
    }

    pub fn user(mut self, user_id: i64) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn params<P: Serialize>(mut self, params: &P) -> Self {
        self.params = serde_json::to_string(params).ok();
        self
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SqlLogger {
    enabled: bool,
}

impl SqlLogger {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub async fn run<T, Fut>(&self, store: &Arc<dyn Store>, log: QueryLog, call: Fut) -> StoreResult<T>
    where
        Fut: Future<Output = StoreResult<T>>,
    {
        let started = Instant::now();
        let result = call.await;
        let execution_time = i64::try_from(started.elapsed().as_millis()).unwrap_or(i64::MAX);

        let error = result.as_ref().err().map(|e| e.to_string());
        debug!(
            endpoint = log.endpoint,
            elapsed_ms = execution_time,
            failed = error.is_some(),
            "{}",
            log.query
        );

        if self.enabled {
            self.record(store, log, execution_time, error).await;
        }
        result
    }

    async fn record(&self, store: &Arc<dyn Store>, log: QueryLog, execution_time: i64, error: Option<String>) {
        let entry = NewSqlLog {
            operation: SqlOperation::detect(&log.query),
            query: log.query,
            execution_time,
            user_id: log.user_id,
            endpoint: Some(log.endpoint.to_string()),
            params: log.params,
            error,
        };
        // Ошибку журнала не пробрасываем, чтобы не скрыть исходную и не уйти в рекурсию
        if let Err(e) = store.insert_sql_log(entry).await {
            error!("[SQL Logger] Failed to log query: {}", e);
        }
    }
}
