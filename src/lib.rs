pub mod config;
pub mod controllers;
pub mod database;
pub mod error;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod services;
pub mod store;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;
use crate::database::Database;
use crate::repository::Repository;
use crate::services::auth::SessionTokens;
use crate::services::sql_logger::SqlLogger;
use crate::store::Store;

// Shared state для всего приложения
#[derive(Clone)]
pub struct AppState {
    pub repo: Repository,
    pub tokens: SessionTokens,
    pub config: Config,
}

impl AppState {
    /// Подключается к Postgres, если задан DATABASE_URL. Без базы (или если она
    /// недоступна на старте) сервис работает в деградированном режиме.
    pub async fn new(config: Config) -> anyhow::Result<Arc<Self>> {
        let store = Database::connect(&config.database)
            .await?
            .map(Database::into_store);
        Ok(Self::with_store(config, store))
    }

    pub fn with_store(config: Config, store: Option<Arc<dyn Store>>) -> Arc<Self> {
        let logger = SqlLogger::new(config.sql_log.enabled);
        Arc::new(Self {
            repo: Repository::new(store, logger),
            tokens: SessionTokens::new(&config.jwt),
            config,
        })
    }
}

/// Корневой роутер приложения.
pub fn app(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        .route("/", get(|| async { "Cowork Booking API v1.0" }))
        .route("/health", get(|| async { "OK" }))
        .nest("/api", controllers::routes())
        .with_state(state.clone())
        .layer(TraceLayer::new_for_http());

    if state.config.is_development() {
        router = router.layer(CorsLayer::permissive());
    }
    router
}
