use sqlx::{postgres::PgPoolOptions, Pool, Postgres};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::DatabaseConfig;
use crate::store::{PgStore, Store};

#[derive(Clone)]
pub struct Database {
    pub pool: Pool<Postgres>,
}

impl Database {
    pub async fn new(database_url: &str, pool_size: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;

        Ok(Database { pool })
    }

    /// Подключение на старте. `None`, если DATABASE_URL не задан или база
    /// недоступна: сервис поднимается без неё. Ошибка миграций фатальна.
    pub async fn connect(
        config: &DatabaseConfig,
    ) -> Result<Option<Self>, sqlx::migrate::MigrateError> {
        let Some(url) = config.url.as_deref() else {
            warn!("[Database] DATABASE_URL is not set, running without database");
            return Ok(None);
        };

        match Self::new(url, config.pool_size).await {
            Ok(db) => {
                info!("Database connected (pool size {})", config.pool_size);
                db.run_migrations().await?;
                Ok(Some(db))
            }
            Err(e) => {
                warn!("[Database] Failed to connect: {}", e);
                Ok(None)
            }
        }
    }

    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations...");
        sqlx::migrate!("./src/migrations").run(&self.pool).await?;
        info!("Migrations completed");
        Ok(())
    }

    pub fn into_store(self) -> Arc<dyn Store> {
        Arc::new(PgStore::new(self.pool))
    }
}
