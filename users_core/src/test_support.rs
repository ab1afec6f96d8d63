use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use sqlx::SqlitePool;
use tempfile::TempDir;

use crate::config::DatabaseConfig;
use crate::database::{get_database_pool, run_migrations};
use crate::files::{FetchedFile, FileSource, FileSourceError};

/// Migrated SQLite database living in a temporary directory.
/// The directory is removed when this value is dropped.
pub struct TestDatabase {
    pub pool: SqlitePool,
    _dir: TempDir,
}

impl TestDatabase {
    pub async fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let config = DatabaseConfig {
            url: format!("sqlite:{}", dir.path().join("test.db").display()),
            max_connections: 5,
            ..DatabaseConfig::default()
        };

        let pool = get_database_pool(&config).await.unwrap();
        run_migrations(pool.clone()).await.unwrap();

        Self { pool, _dir: dir }
    }
}

/// Serves a fixed payload and counts how often it was asked for.
pub struct StaticFileSource {
    media_type: String,
    content: Bytes,
    fail: bool,
    calls: AtomicUsize,
}

impl StaticFileSource {
    pub fn new(media_type: &str, content: impl Into<Bytes>) -> Arc<Self> {
        Arc::new(Self {
            media_type: media_type.to_string(),
            content: content.into(),
            fail: false,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            media_type: String::new(),
            content: Bytes::new(),
            fail: true,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FileSource for StaticFileSource {
    async fn fetch_file(&self) -> Result<FetchedFile, FileSourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(FileSourceError::Status(500));
        }
        Ok(FetchedFile {
            content: self.content.clone(),
            media_type: self.media_type.clone(),
        })
    }
}
