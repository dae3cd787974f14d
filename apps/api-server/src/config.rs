//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;

use quill_core::services::DEFAULT_EXCERPT_LEN;
use quill_infra::DatabaseConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    pub excerpt_len: usize,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup, e.g. a map in tests.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let flag = |key: &str| {
            lookup(key)
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false)
        };

        let database = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .map(|url| DatabaseConfig {
                url,
                max_connections: parse(&lookup, "DB_MAX_CONNECTIONS").unwrap_or(10),
                min_connections: parse(&lookup, "DB_MIN_CONNECTIONS").unwrap_or(1),
                auto_migrate: flag("DB_AUTO_MIGRATE"),
            });

        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:3000".to_string())
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();

        Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse(&lookup, "PORT").unwrap_or(8000),
            database,
            excerpt_len: parse(&lookup, "EXCERPT_LENGTH")
                .filter(|n: &usize| *n > 0)
                .unwrap_or(DEFAULT_EXCERPT_LEN),
            cors_origins,
        }
    }
}

fn parse<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|s| s.trim().parse().ok())
}
