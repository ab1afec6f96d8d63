use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::config::AppConfig;
use crate::database::{PageRequest, Repository, DEFAULT_PAGE_LIMIT};
use crate::error::{AppError, Result};
use crate::files::{is_pdf, ContentError, ContentValidator, FileSource};
use crate::users::models::{
    CreateUserRequest, DownloadedFile, FileFilter, NewUser, NewUserFile, PaginationResponse,
    User, UserFile, UserFileResponse, UserResponse,
};

pub type UserStore = dyn Repository<User, Filter = (), CreateInput = NewUser>;
pub type UserFileStore = dyn Repository<UserFile, Filter = FileFilter, CreateInput = NewUserFile>;

/// Extension used when a media type carries no subtype.
pub const FALLBACK_EXTENSION: &str = "bin";

#[derive(Debug, Clone)]
pub struct UserServiceConfig {
    /// Reject file lookups whose owner differs from the user in the request.
    pub enforce_file_ownership: bool,
    pub default_page_limit: i64,
}

impl Default for UserServiceConfig {
    fn default() -> Self {
        Self {
            enforce_file_ownership: false,
            default_page_limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl From<&AppConfig> for UserServiceConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            enforce_file_ownership: config.users.enforce_file_ownership,
            default_page_limit: config.pagination.default_limit,
        }
    }
}

#[derive(Clone)]
pub struct UserService {
    users: Arc<UserStore>,
    files: Arc<UserFileStore>,
    file_source: Arc<dyn FileSource>,
    validator: ContentValidator,
    config: UserServiceConfig,
}

impl UserService {
    pub fn new(
        users: Arc<UserStore>,
        files: Arc<UserFileStore>,
        file_source: Arc<dyn FileSource>,
        validator: ContentValidator,
        config: UserServiceConfig,
    ) -> Self {
        Self {
            users,
            files,
            file_source,
            validator,
            config,
        }
    }

    pub async fn list_users(&self, request: PageRequest) -> Result<PaginationResponse<UserResponse>> {
        let page = self
            .users
            .list(&(), self.page_request(request))
            .await
            .map_err(|e| AppError::internal("unexpected error listing users", e))?;

        Ok(page.into())
    }

    pub async fn create_user(&self, request: CreateUserRequest) -> Result<UserResponse> {
        request.validate()?;

        let input = NewUser {
            user_id: Uuid::new_v4().to_string(),
            email: request.email,
        };

        let user = self
            .users
            .create(input)
            .await
            .map_err(|e| AppError::internal("unexpected error creating new user", e))?;

        info!(user_id = %user.user_id, "Created user");
        Ok(user.into())
    }

    pub async fn get_user(&self, user_id: &str) -> Result<UserResponse> {
        Ok(self.find_user(user_id).await?.into())
    }

    /// Tombstones the user. Files owned by the user are left untouched.
    pub async fn delete_user(&self, user_id: &str) -> Result<()> {
        let user = self.find_user(user_id).await?;

        self.users
            .soft_delete(&user)
            .await
            .map_err(|e| AppError::internal("unexpected error deleting user", e))?;

        info!(user_id = %user.user_id, "Deleted user");
        Ok(())
    }

    pub async fn list_user_files(
        &self,
        user_id: &str,
        request: PageRequest,
    ) -> Result<PaginationResponse<UserFileResponse>> {
        let user = self.find_user(user_id).await?;
        let filter = FileFilter {
            owner_id: user.user_id,
        };

        let page = self
            .files
            .list(&filter, self.page_request(request))
            .await
            .map_err(|e| AppError::internal("unexpected error listing user files", e))?;

        Ok(page.into())
    }

    /// Pulls content from the file source, validates it, and stores it for the user.
    /// Nothing is persisted if fetching or validation fails.
    pub async fn create_user_file(&self, user_id: &str) -> Result<UserFileResponse> {
        let user = self.find_user(user_id).await?;

        let fetched = self.file_source.fetch_file().await.map_err(|e| {
            warn!(user_id = %user.user_id, error = %e, "File source request failed");
            AppError::from(e)
        })?;

        if is_pdf(&fetched.media_type) {
            let validator = self.validator;
            let media_type = fetched.media_type.clone();
            let content = fetched.content.clone();

            let outcome =
                tokio::task::spawn_blocking(move || validator.validate(&media_type, &content)).await;

            match outcome {
                Ok(result) => result.map_err(|e| {
                    warn!(user_id = %user.user_id, error = %e, "Rejected fetched file");
                    AppError::from(e)
                })?,
                Err(join_error) if join_error.is_panic() => {
                    return Err(ContentError::CorruptedPdf("PDF parser aborted".to_string()).into());
                }
                Err(join_error) => {
                    return Err(AppError::internal(
                        "unexpected error validating user file",
                        join_error,
                    ));
                }
            }
        }

        let input = NewUserFile {
            file_id: Uuid::new_v4().to_string(),
            user_id: user.user_id.clone(),
            file_type: fetched.media_type,
            file_content: fetched.content.to_vec(),
        };

        let file = self
            .files
            .create(input)
            .await
            .map_err(|e| AppError::internal("unexpected error creating new user file", e))?;

        info!(
            user_id = %user.user_id,
            file_id = %file.file_id,
            file_type = %file.file_type,
            size = file.file_content.len(),
            "Created user file"
        );
        Ok(file.into())
    }

    pub async fn get_user_file(&self, user_id: &str, file_id: &str) -> Result<UserFileResponse> {
        Ok(self.find_user_file(user_id, file_id).await?.into())
    }

    pub async fn delete_user_file(&self, user_id: &str, file_id: &str) -> Result<()> {
        let file = self.find_user_file(user_id, file_id).await?;

        self.files
            .soft_delete(&file)
            .await
            .map_err(|e| AppError::internal("unexpected error deleting user file", e))?;

        info!(user_id = %user_id, file_id = %file.file_id, "Deleted user file");
        Ok(())
    }

    pub async fn download_user_file(&self, user_id: &str, file_id: &str) -> Result<DownloadedFile> {
        let file = self.find_user_file(user_id, file_id).await?;
        let extension = extension_for(&file.file_type);

        Ok(DownloadedFile {
            file_id: file.file_id,
            media_type: file.file_type,
            extension,
            content: file.file_content,
        })
    }

    fn page_request(&self, request: PageRequest) -> PageRequest {
        request.with_default_limit(self.config.default_page_limit)
    }

    async fn find_user(&self, user_id: &str) -> Result<User> {
        match self.users.get_by_uuid(user_id).await {
            Ok(user) => Ok(user),
            Err(e) if e.is_not_found() => Err(e),
            Err(e) => Err(AppError::internal("unexpected error retrieving user", e)),
        }
    }

    async fn find_user_file(&self, user_id: &str, file_id: &str) -> Result<UserFile> {
        let user = self.find_user(user_id).await?;

        let file = match self.files.get_by_uuid(file_id).await {
            Ok(file) => file,
            Err(e) if e.is_not_found() => return Err(e),
            Err(e) => return Err(AppError::internal("unexpected error retrieving user file", e)),
        };

        if self.config.enforce_file_ownership && file.user_id != user.user_id {
            return Err(AppError::NotFound(format!("file {} not found", file_id)));
        }

        Ok(file)
    }
}

/// Derives a download extension from a stored media type, e.g. `image/png` -> `png`.
pub fn extension_for(media_type: &str) -> String {
    let subtype = media_type
        .split_once('/')
        .map(|(_, rest)| rest.split(';').next().unwrap_or("").trim())
        .unwrap_or("");

    if subtype.is_empty() {
        FALLBACK_EXTENSION.to_string()
    } else {
        subtype.to_string()
    }
}
