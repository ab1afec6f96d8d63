use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::database::Page;

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub user_id: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

#[derive(Clone, FromRow)]
pub struct UserFile {
    pub id: i64,
    pub file_id: String,
    /// Public identifier of the owning user.
    pub user_id: String,
    pub file_type: String,
    pub file_content: Vec<u8>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl UserFile {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

impl std::fmt::Debug for UserFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserFile")
            .field("id", &self.id)
            .field("file_id", &self.file_id)
            .field("user_id", &self.user_id)
            .field("file_type", &self.file_type)
            .field("content_len", &self.file_content.len())
            .field("created_at", &self.created_at)
            .field("deleted_at", &self.deleted_at)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub user_id: String,
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct NewUserFile {
    pub file_id: String,
    pub user_id: String,
    pub file_type: String,
    pub file_content: Vec<u8>,
}

/// Restricts file listings to a single owner.
#[derive(Debug, Clone)]
pub struct FileFilter {
    pub owner_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Invalid email format")
    )]
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserResponse {
    pub user_id: String,
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id,
            email: user.email,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserFileResponse {
    pub file_id: String,
    pub file_type: String,
    pub created_at: DateTime<Utc>,
}

impl From<UserFile> for UserFileResponse {
    fn from(file: UserFile) -> Self {
        Self {
            file_id: file.file_id,
            file_type: file.file_type,
            created_at: file.created_at,
        }
    }
}

/// Listing envelope returned by the paginated endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationResponse<T> {
    pub limit: i64,
    pub page: i64,
    pub total_rows: i64,
    pub total_pages: i64,
    pub data: Vec<T>,
}

impl<T, U> From<Page<U>> for PaginationResponse<T>
where
    U: Into<T>,
{
    fn from(page: Page<U>) -> Self {
        Self {
            limit: page.pagination.limit,
            page: page.pagination.page,
            total_rows: page.pagination.total_rows,
            total_pages: page.pagination.total_pages,
            data: page.items.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DownloadedFile {
    pub file_id: String,
    pub media_type: String,
    pub extension: String,
    pub content: Vec<u8>,
}

impl DownloadedFile {
    pub fn filename(&self) -> String {
        format!("{}.{}", self.file_id, self.extension)
    }
}
