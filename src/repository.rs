use std::future::Future;
use std::sync::Arc;

use crate::error::AppError;
use crate::services::sql_logger::{QueryLog, SqlLogger};
use crate::store::{Store, StoreResult};

/// Точка доступа к данным для сервисов.
///
/// Оборачивает каждое обращение в [`SqlLogger`] и обрабатывает отсутствие
/// базы: чтения возвращают пустой результат, записи падают с
/// [`AppError::DatabaseUnavailable`].
#[derive(Clone)]
pub struct Repository {
    store: Option<Arc<dyn Store>>,
    logger: SqlLogger,
}

impl Repository {
    pub fn new(store: Option<Arc<dyn Store>>, logger: SqlLogger) -> Self {
        Self { store, logger }
    }

    pub fn is_available(&self) -> bool {
        self.store.is_some()
    }

    pub async fn read<T, F, Fut>(&self, log: QueryLog, call: F) -> Result<T, AppError>
    where
        T: Default,
        F: FnOnce(Arc<dyn Store>) -> Fut,
        Fut: Future<Output = StoreResult<T>>,
    {
        let Some(store) = &self.store else {
            tracing::warn!("[Database] {} skipped: database not available", log.endpoint);
            return Ok(T::default());
        };
        let result = self.logger.run(store, log, call(store.clone())).await?;
        Ok(result)
    }

    pub async fn write<T, F, Fut>(&self, log: QueryLog, call: F) -> Result<T, AppError>
    where
        F: FnOnce(Arc<dyn Store>) -> Fut,
        Fut: Future<Output = StoreResult<T>>,
    {
        let Some(store) = &self.store else {
            tracing::warn!("[Database] {} failed: database not available", log.endpoint);
            return Err(AppError::DatabaseUnavailable);
        };
        let result = self.logger.run(store, log, call(store.clone())).await?;
        Ok(result)
    }

    /// Чтение без записи в журнал SQL (используется для самого журнала).
    pub async fn read_unlogged<T, F, Fut>(&self, call: F) -> Result<T, AppError>
    where
        T: Default,
        F: FnOnce(Arc<dyn Store>) -> Fut,
        Fut: Future<Output = StoreResult<T>>,
    {
        match &self.store {
            Some(store) => Ok(call(store.clone()).await?),
            None => Ok(T::default()),
        }
    }
}
