use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::models::booking::PricingError;
use crate::store::StoreError;

/// Ошибки, которые видит клиент API.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),
    #[error("Недостаточно средств. Баланс: {balance}₽, требуется: {required}₽")]
    InsufficientFunds { balance: i64, required: i64 },
    #[error("{0}")]
    Validation(String),
    #[error("База данных недоступна")]
    DatabaseUnavailable,
    #[error("Не авторизован")]
    Unauthorized,
    #[error("Недостаточно прав")]
    Forbidden,
    #[error("Ошибка базы данных: {0}")]
    Database(String),
    #[error("Внутренняя ошибка: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    success: bool,
    message: String,
}

pub type ApiResult<T> = Result<T, AppError>;

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InsufficientFunds { .. } => StatusCode::PAYMENT_REQUIRED,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::DatabaseUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Детали ошибок БД остаются в логах
        let message = match &self {
            AppError::Database(detail) | AppError::Internal(detail) => {
                tracing::error!("request failed: {}", detail);
                "Внутренняя ошибка сервера".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(ApiError { success: false, message })).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => {
                AppError::NotFound(format!("{} #{} не найдено", entity, id))
            }
            StoreError::InsufficientFunds { balance, required } => {
                AppError::InsufficientFunds { balance, required }
            }
            StoreError::AmountOutOfRange => {
                AppError::Validation("Сумма операции вне допустимого диапазона".to_string())
            }
            StoreError::Database(e) => AppError::Database(e.to_string()),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let reasons: Vec<String> = errs
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect();
                format!("{}: {}", field, reasons.join(", "))
            })
            .collect();
        fields.sort();
        AppError::Validation(format!("Некорректные данные: {}", fields.join("; ")))
    }
}

impl From<PricingError> for AppError {
    fn from(err: PricingError) -> Self {
        AppError::Validation(err.to_string())
    }
}
