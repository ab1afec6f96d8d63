use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};

use crate::database::{Page, PageRequest, Repository};
use crate::error::{AppError, Result};
use crate::users::models::{FileFilter, NewUserFile, UserFile};

#[derive(Clone)]
pub struct UserFileRepository {
    pool: SqlitePool,
}

impl UserFileRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<UserFile> for UserFileRepository {
    type Filter = FileFilter;
    type CreateInput = NewUserFile;

    async fn list(&self, filter: &FileFilter, request: PageRequest) -> Result<Page<UserFile>> {
        let pagination = request.resolve();

        let files = sqlx::query_as::<_, UserFile>(
            r#"
            SELECT id, file_id, user_id, file_type, file_content, created_at, updated_at, deleted_at
            FROM user_files
            WHERE user_id = ? AND deleted_at IS NULL
            ORDER BY id ASC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(&filter.owner_id)
        .bind(pagination.limit)
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;

        let row = sqlx::query(
            "SELECT COUNT(*) as count FROM user_files WHERE user_id = ? AND deleted_at IS NULL",
        )
        .bind(&filter.owner_id)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;
        let total_rows: i64 = row.try_get("count").map_err(AppError::from)?;

        Ok(Page {
            items: files,
            pagination: pagination.with_total(total_rows),
        })
    }

    async fn get_by_uuid(&self, uuid: &str) -> Result<UserFile> {
        sqlx::query_as::<_, UserFile>(
            r#"
            SELECT id, file_id, user_id, file_type, file_content, created_at, updated_at, deleted_at
            FROM user_files
            WHERE file_id = ?
            "#,
        )
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::NotFound(format!("file {} not found", uuid)))
    }

    async fn get_by_id(&self, id: i64) -> Result<UserFile> {
        sqlx::query_as::<_, UserFile>(
            r#"
            SELECT id, file_id, user_id, file_type, file_content, created_at, updated_at, deleted_at
            FROM user_files
            WHERE id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::NotFound(format!("file with id {} not found", id)))
    }

    async fn create(&self, input: NewUserFile) -> Result<UserFile> {
        let now = Utc::now();

        sqlx::query_as::<_, UserFile>(
            r#"
            INSERT INTO user_files (file_id, user_id, file_type, file_content, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id, file_id, user_id, file_type, file_content, created_at, updated_at, deleted_at
            "#,
        )
        .bind(&input.file_id)
        .bind(&input.user_id)
        .bind(&input.file_type)
        .bind(&input.file_content)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)
    }

    async fn soft_delete(&self, file: &UserFile) -> Result<()> {
        sqlx::query("UPDATE user_files SET deleted_at = ? WHERE id = ? AND deleted_at IS NULL")
            .bind(Utc::now())
            .bind(file.id)
            .execute(&self.pool)
            .await
            .map_err(AppError::from)?;

        Ok(())
    }

    async fn hard_delete(&self, file: &UserFile) -> Result<()> {
        sqlx::query("DELETE FROM user_files WHERE id = ?")
            .bind(file.id)
            .execute(&self.pool)
            .await
            .map_err(AppError::from)?;

        Ok(())
    }
}
