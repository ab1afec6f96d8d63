//! Fetches candidate file content from the external file-serving endpoint.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{header::CONTENT_TYPE, Client, Url};
use thiserror::Error;

use crate::config::FileSourceConfig;

pub const DEFAULT_MEDIA_TYPE: &str = "application/octet-stream";

#[derive(Error, Debug)]
pub enum FileSourceError {
    #[error("file source request failed: {0}")]
    Transport(String),

    #[error("file source returned status {0}")]
    Status(u16),

    #[error("failed to read file source body: {0}")]
    Body(String),
}

#[derive(Debug, Clone)]
pub struct FetchedFile {
    pub content: Bytes,
    pub media_type: String,
}

#[async_trait]
pub trait FileSource: Send + Sync {
    async fn fetch_file(&self) -> Result<FetchedFile, FileSourceError>;
}

/// Issues a single `GET` against a fixed URL. No retries.
pub struct HttpFileSource {
    client: Client,
    endpoint: Url,
}

impl HttpFileSource {
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }

    pub fn from_config(config: &FileSourceConfig) -> anyhow::Result<Self> {
        let endpoint = Url::parse(&config.url)
            .with_context(|| format!("Invalid file source URL: {}", config.url))?;
        let client = Self::new(endpoint, Duration::from_secs(config.timeout_seconds))
            .context("Failed to build file source client")?;
        Ok(client)
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl FileSource for HttpFileSource {
    async fn fetch_file(&self) -> Result<FetchedFile, FileSourceError> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .send()
            .await
            .map_err(|e| FileSourceError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FileSourceError::Status(status.as_u16()));
        }

        let media_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_MEDIA_TYPE)
            .to_string();

        let content = response
            .bytes()
            .await
            .map_err(|e| FileSourceError::Body(e.to_string()))?;

        tracing::debug!(
            endpoint = %self.endpoint,
            media_type = %media_type,
            size = content.len(),
            "Fetched file from source"
        );

        Ok(FetchedFile {
            content,
            media_type,
        })
    }
}
