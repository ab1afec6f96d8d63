use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};

use crate::database::{Page, PageRequest, Repository};
use crate::error::{AppError, Result};
use crate::users::models::{NewUser, User};

#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<User> for UserRepository {
    type Filter = ();
    type CreateInput = NewUser;

    async fn list(&self, _filter: &(), request: PageRequest) -> Result<Page<User>> {
        let pagination = request.resolve();

        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, user_id, email, created_at, updated_at, deleted_at
            FROM users
            WHERE deleted_at IS NULL
            ORDER BY id ASC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(pagination.limit)
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;

        let row = sqlx::query("SELECT COUNT(*) as count FROM users WHERE deleted_at IS NULL")
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::from)?;
        let total_rows: i64 = row.try_get("count").map_err(AppError::from)?;

        Ok(Page {
            items: users,
            pagination: pagination.with_total(total_rows),
        })
    }

    async fn get_by_uuid(&self, uuid: &str) -> Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, user_id, email, created_at, updated_at, deleted_at
            FROM users
            WHERE user_id = ?
            "#,
        )
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::NotFound(format!("user {} not found", uuid)))
    }

    async fn get_by_id(&self, id: i64) -> Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, user_id, email, created_at, updated_at, deleted_at
            FROM users
            WHERE id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::NotFound(format!("user with id {} not found", id)))
    }

    async fn create(&self, input: NewUser) -> Result<User> {
        let now = Utc::now();

        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (user_id, email, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            RETURNING id, user_id, email, created_at, updated_at, deleted_at
            "#,
        )
        .bind(&input.user_id)
        .bind(&input.email)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)
    }

    async fn soft_delete(&self, user: &User) -> Result<()> {
        sqlx::query("UPDATE users SET deleted_at = ? WHERE id = ? AND deleted_at IS NULL")
            .bind(Utc::now())
            .bind(user.id)
            .execute(&self.pool)
            .await
            .map_err(AppError::from)?;

        Ok(())
    }

    async fn hard_delete(&self, user: &User) -> Result<()> {
        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user.id)
            .execute(&self.pool)
            .await
            .map_err(AppError::from)?;

        Ok(())
    }
}
