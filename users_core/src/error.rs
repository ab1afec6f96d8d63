//! Application error types and handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::files::{ContentError, FileSourceError};

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("External dependency failure: {0}")]
    ExternalDependency(String),

    #[error("{message}")]
    Internal { message: String, cause: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Wraps a lower-level failure behind a caller-safe message.
    pub fn internal(message: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        AppError::Internal {
            message: message.into(),
            cause: cause.to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::JsonError(_) => StatusCode::BAD_REQUEST,
            AppError::ExternalDependency(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal { .. }
            | AppError::Database(_)
            | AppError::IoError(_)
            | AppError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_message = match self {
            AppError::NotFound(msg) => msg,
            AppError::Validation(msg) => msg,
            AppError::ExternalDependency(msg) => {
                tracing::warn!("External dependency failure: {}", msg);
                msg
            }
            AppError::Internal { message, cause } => {
                tracing::error!(cause = %cause, "{}", message);
                message
            }
            AppError::Database(msg) => {
                tracing::error!("Database error: {}", msg);
                "Database error".to_string()
            }
            AppError::IoError(err) => {
                tracing::error!("IO error: {:?}", err);
                "Internal server error".to_string()
            }
            AppError::JsonError(err) => {
                tracing::error!("JSON error: {:?}", err);
                "Invalid JSON data".to_string()
            }
            AppError::Other(err) => {
                tracing::error!("Unexpected error: {:?}", err);
                "Internal server error".to_string()
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Resource not found".to_string()),
            _ => AppError::Database(err.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(message) => message.to_string(),
                    None => format!("{} is invalid", field),
                })
            })
            .collect();
        messages.sort();

        AppError::Validation(messages.join(", "))
    }
}

impl From<FileSourceError> for AppError {
    fn from(err: FileSourceError) -> Self {
        AppError::ExternalDependency(err.to_string())
    }
}

impl From<ContentError> for AppError {
    fn from(err: ContentError) -> Self {
        AppError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Validation("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::ExternalDependency("x".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::internal("boom", "disk full").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_hides_cause() {
        let err = AppError::internal("unexpected error creating new user", "UNIQUE constraint failed");
        assert_eq!(err.to_string(), "unexpected error creating new user");
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err = AppError::from(sqlx::Error::RowNotFound);
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_internal_response_body() {
        let response = AppError::internal("unexpected error deleting user", "secret detail").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["error"], "unexpected error deleting user");
        assert_eq!(value["status"], 500);
        assert!(!body.windows(13).any(|w| w == b"secret detail"));
    }
}
