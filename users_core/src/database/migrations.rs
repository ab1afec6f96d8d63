use sqlx::{Row, SqlitePool};
use tracing::{error, info};

use crate::error::{AppError, Result};

pub struct MigrationManager {
    pool: SqlitePool,
}

struct Migration {
    version: i64,
    name: &'static str,
    checksum: &'static str,
    sql_statements: &'static [&'static str],
}

// user_files.user_id holds the owner's public identifier and is not a foreign key.
const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "create_users_table",
        checksum: "users_v1",
        sql_statements: &[
            r#"
            CREATE TABLE users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                email TEXT NOT NULL,
                created_at DATETIME NOT NULL,
                updated_at DATETIME NOT NULL,
                deleted_at DATETIME
            )
            "#,
            "CREATE UNIQUE INDEX idx_users_user_id ON users(user_id)",
            "CREATE INDEX idx_users_deleted_at ON users(deleted_at)",
        ],
    },
    Migration {
        version: 2,
        name: "create_user_files_table",
        checksum: "user_files_v1",
        sql_statements: &[
            r#"
            CREATE TABLE user_files (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                file_id TEXT NOT NULL,
                user_id TEXT NOT NULL,
                file_type TEXT NOT NULL,
                file_content BLOB NOT NULL,
                created_at DATETIME NOT NULL,
                updated_at DATETIME NOT NULL,
                deleted_at DATETIME
            )
            "#,
            "CREATE UNIQUE INDEX idx_user_files_file_id ON user_files(file_id)",
            "CREATE INDEX idx_user_files_user_id ON user_files(user_id)",
            "CREATE INDEX idx_user_files_deleted_at ON user_files(deleted_at)",
        ],
    },
];

impl MigrationManager {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        info!("Starting database migrations");

        self.create_migrations_table().await?;

        let current_version = self.get_current_version().await?;
        info!("Current migration version: {}", current_version);

        let mut applied_count = 0;

        for migration in MIGRATIONS {
            if migration.version > current_version {
                info!("Applying migration {}: {}", migration.version, migration.name);
                self.apply_migration(migration).await?;
                applied_count += 1;
            }
        }

        if applied_count > 0 {
            info!("Applied {} migrations successfully", applied_count);
        } else {
            info!("No new migrations to apply");
        }

        Ok(())
    }

    async fn create_migrations_table(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS _migrations (
                version INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                applied_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
                checksum TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(AppError::from)?;

        Ok(())
    }

    async fn get_current_version(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COALESCE(MAX(version), 0) as version FROM _migrations")
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::from)?;

        row.try_get("version").map_err(AppError::from)
    }

    async fn apply_migration(&self, migration: &Migration) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(AppError::from)?;

        for statement in migration.sql_statements {
            sqlx::query(statement)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    error!("Failed to execute migration statement: {}", e);
                    AppError::from(e)
                })?;
        }

        sqlx::query("INSERT INTO _migrations (version, name, checksum) VALUES (?, ?, ?)")
            .bind(migration.version)
            .bind(migration.name)
            .bind(migration.checksum)
            .execute(&mut *tx)
            .await
            .map_err(AppError::from)?;

        tx.commit().await.map_err(AppError::from)?;
        Ok(())
    }
}

pub async fn run_migrations(pool: SqlitePool) -> Result<()> {
    MigrationManager::new(pool).run_migrations().await
}
