use serde::Deserialize;
use std::env;
use std::ops::RangeInclusive;
use std::str::FromStr;
use thiserror::Error;

// Главная структура конфигурации - контейнер для всех настроек
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub auth: AuthConfig,
    pub sql_log: SqlLogConfig,
}

// Настройки приложения
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(()),
        }
    }
}

// Настройки базы данных. Без DATABASE_URL сервис стартует в деградированном режиме.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub pool_size: u32,
}

// Настройки JWT
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub expires_in_hours: i64,
}

// Настройки входа
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Email владельца: при входе получает роль admin.
    pub owner_email: Option<String>,
    pub bcrypt_cost: u32,
}

// Журнал SQL-запросов для админки
#[derive(Debug, Clone, Deserialize)]
pub struct SqlLogConfig {
    pub enabled: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} has invalid value {value:?}")]
    Invalid { key: &'static str, value: String },
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Собирает конфигурацию из произвольного источника переменных.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Config {
            app: AppConfig {
                host: non_empty("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse_or(&lookup, "PORT", 8000)?,
                environment: non_empty("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
                rust_log: non_empty("RUST_LOG")
                    .unwrap_or_else(|| "cowork_booking=debug,tower_http=debug".to_string()),
                log_format: parse_or(&lookup, "LOG_FORMAT", LogFormat::Pretty)?,
            },
            database: DatabaseConfig {
                url: non_empty("DATABASE_URL"),
                pool_size: parse_in_range(&lookup, "DB_POOL_SIZE", 20, 1..=1000)?,
            },
            jwt: JwtConfig {
                secret: non_empty("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?,
                expires_in_hours: parse_in_range(&lookup, "JWT_EXPIRES_IN_HOURS", 24, 1..=8760)?,
            },
            auth: AuthConfig {
                owner_email: non_empty("OWNER_EMAIL").map(|e| e.trim().to_lowercase()),
                bcrypt_cost: parse_in_range(&lookup, "BCRYPT_COST", bcrypt::DEFAULT_COST, 4..=31)?,
            },
            sql_log: SqlLogConfig {
                enabled: parse_or(&lookup, "SQL_LOG_ENABLED", true)?,
            },
        })
    }

    pub fn is_development(&self) -> bool {
        self.app.environment == "development"
    }
}

fn parse_or<T, F>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
        _ => Ok(default),
    }
}

fn parse_in_range<T, F>(
    lookup: &F,
    key: &'static str,
    default: T,
    range: RangeInclusive<T>,
) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd + ToString,
    F: Fn(&str) -> Option<String>,
{
    let value = parse_or(lookup, key, default)?;
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::Invalid { key, value: value.to_string() })
    }
}
