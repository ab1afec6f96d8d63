use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use std::time::Duration;
use tracing::{error, info};

use crate::config::DatabaseConfig;
use crate::error::{AppError, Result};

#[derive(Clone)]
pub struct DatabaseManager {
    pool: SqlitePool,
}

impl DatabaseManager {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn health_check(&self) -> Result<()> {
        let row = sqlx::query("SELECT 1 as test")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database health check failed: {}", e);
                AppError::from(e)
            })?;

        let test_value: i32 = row.try_get("test").map_err(AppError::from)?;

        if test_value == 1 {
            Ok(())
        } else {
            Err(AppError::Database("unexpected health check result".to_string()))
        }
    }
}

pub async fn get_database_pool(config: &DatabaseConfig) -> Result<SqlitePool> {
    info!("Connecting to database: {}", config.url);

    let options = SqliteConnectOptions::from_str(&config.url)
        .map_err(AppError::from)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connection_timeout_seconds))
        .idle_timeout(Duration::from_secs(300))
        .max_lifetime(Duration::from_secs(1800))
        .test_before_acquire(true)
        .connect_with(options)
        .await
        .map_err(|e| {
            error!("Failed to create database pool: {}", e);
            AppError::from(e)
        })?;

    info!("Database connection pool created successfully");
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_database_connection() {
        let dir = TempDir::new().unwrap();
        let config = DatabaseConfig {
            url: format!("sqlite:{}", dir.path().join("conn.db").display()),
            ..DatabaseConfig::default()
        };

        let pool = get_database_pool(&config).await.unwrap();
        let db_manager = DatabaseManager::new(pool);

        db_manager.health_check().await.unwrap();
        assert!(dir.path().join("conn.db").exists());
    }
}
