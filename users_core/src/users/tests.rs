use std::collections::HashSet;
use std::sync::Arc;

use crate::database::{PageRequest, Repository};
use crate::error::AppError;
use crate::files::validation::sample_pdf;
use crate::files::ContentValidator;
use crate::test_support::{StaticFileSource, TestDatabase};
use crate::users::{
    extension_for, CreateUserRequest, FileFilter, UserFileRepository, UserRepository, UserService,
    UserServiceConfig,
};

struct Fixture {
    db: TestDatabase,
    service: UserService,
    source: Arc<StaticFileSource>,
}

impl Fixture {
    async fn new(source: Arc<StaticFileSource>) -> Self {
        Self::with_config(source, UserServiceConfig::default()).await
    }

    async fn with_config(source: Arc<StaticFileSource>, config: UserServiceConfig) -> Self {
        let db = TestDatabase::new().await;
        let service = UserService::new(
            Arc::new(UserRepository::new(db.pool.clone())),
            Arc::new(UserFileRepository::new(db.pool.clone())),
            source.clone(),
            ContentValidator::new(),
            config,
        );
        Self { db, service, source }
    }

    async fn create_user(&self, email: &str) -> String {
        self.service
            .create_user(CreateUserRequest {
                email: email.to_string(),
            })
            .await
            .unwrap()
            .user_id
    }

    async fn stored_file_count(&self, owner: &str) -> i64 {
        let repo = UserFileRepository::new(self.db.pool.clone());
        let filter = FileFilter {
            owner_id: owner.to_string(),
        };
        repo.list(&filter, PageRequest::default())
            .await
            .unwrap()
            .pagination
            .total_rows
    }
}

#[tokio::test]
async fn test_create_then_get_user() {
    let fx = Fixture::new(StaticFileSource::new("text/plain", "x")).await;

    let mut seen = HashSet::new();
    for email in ["a@example.com", "b@example.com", "c@example.com"] {
        let created = fx
            .service
            .create_user(CreateUserRequest {
                email: email.to_string(),
            })
            .await
            .unwrap();

        assert!(uuid::Uuid::parse_str(&created.user_id).is_ok());
        assert!(seen.insert(created.user_id.clone()));

        let fetched = fx.service.get_user(&created.user_id).await.unwrap();
        assert_eq!(fetched.email, email);
        assert_eq!(fetched.user_id, created.user_id);
    }
}

#[tokio::test]
async fn test_create_user_rejects_invalid_email() {
    let fx = Fixture::new(StaticFileSource::new("text/plain", "x")).await;

    for email in ["", "not-an-email"] {
        let result = fx
            .service
            .create_user(CreateUserRequest {
                email: email.to_string(),
            })
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    let listed = fx.service.list_users(PageRequest::default()).await.unwrap();
    assert_eq!(listed.total_rows, 0);
}

#[tokio::test]
async fn test_delete_user() {
    let fx = Fixture::new(StaticFileSource::new("text/plain", "x")).await;

    let missing = fx.service.delete_user("no-such-user").await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));

    let user_id = fx.create_user("gone@example.com").await;
    fx.service.delete_user(&user_id).await.unwrap();

    let repo = UserRepository::new(fx.db.pool.clone());
    let tombstoned = repo.get_by_uuid(&user_id).await.unwrap();
    assert!(tombstoned.is_deleted());
    assert!(matches!(
        repo.get_by_id(tombstoned.id).await,
        Err(AppError::NotFound(_))
    ));

    let listed = fx.service.list_users(PageRequest::default()).await.unwrap();
    assert!(listed.data.iter().all(|u| u.user_id != user_id));

    // Public lookups still resolve tombstoned users.
    assert!(fx.service.get_user(&user_id).await.is_ok());
}

#[tokio::test]
async fn test_list_users_pagination() {
    let fx = Fixture::new(StaticFileSource::new("text/plain", "x")).await;
    for i in 0..23 {
        fx.create_user(&format!("user{}@example.com", i)).await;
    }

    let first = fx.service.list_users(PageRequest::new(Some(5), None)).await.unwrap();
    assert_eq!(first.limit, 5);
    assert_eq!(first.page, 1);
    assert_eq!(first.total_rows, 23);
    assert_eq!(first.total_pages, 5);
    assert_eq!(first.data.len(), 5);

    let beyond = fx
        .service
        .list_users(PageRequest::new(Some(5), Some(6)))
        .await
        .unwrap();
    assert!(beyond.data.is_empty());
    assert_eq!(beyond.total_pages, 5);

    let defaulted = fx
        .service
        .list_users(PageRequest::new(Some(0), Some(-1)))
        .await
        .unwrap();
    assert_eq!(defaulted.limit, 10);
    assert_eq!(defaulted.page, 1);
    assert_eq!(defaulted.data.len(), 10);
    assert_eq!(defaulted.total_pages, 3);
}

#[tokio::test]
async fn test_configured_default_limit() {
    let config = UserServiceConfig {
        default_page_limit: 4,
        ..UserServiceConfig::default()
    };
    let fx = Fixture::with_config(StaticFileSource::new("text/plain", "x"), config).await;
    for i in 0..9 {
        fx.create_user(&format!("user{}@example.com", i)).await;
    }

    let listed = fx.service.list_users(PageRequest::default()).await.unwrap();
    assert_eq!(listed.limit, 4);
    assert_eq!(listed.total_pages, 3);
}

#[tokio::test]
async fn test_create_file_for_unknown_user() {
    let fx = Fixture::new(StaticFileSource::new("text/plain", "hello")).await;

    let result = fx.service.create_user_file("no-such-user").await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert_eq!(fx.source.calls(), 0);
    assert_eq!(fx.stored_file_count("no-such-user").await, 0);
}

#[tokio::test]
async fn test_corrupted_pdf_is_not_stored() {
    let fx = Fixture::new(StaticFileSource::new("application/pdf", "%PDF-1.7 garbage")).await;
    let user_id = fx.create_user("pdf@example.com").await;

    let result = fx.service.create_user_file(&user_id).await;
    assert!(matches!(result, Err(AppError::Validation(_))));
    assert_eq!(fx.source.calls(), 1);
    assert_eq!(fx.stored_file_count(&user_id).await, 0);
}

#[tokio::test]
async fn test_valid_pdf_is_stored() {
    let pdf = sample_pdf(2);
    let fx = Fixture::new(StaticFileSource::new("application/pdf", pdf.clone())).await;
    let user_id = fx.create_user("pdf@example.com").await;

    let created = fx.service.create_user_file(&user_id).await.unwrap();
    assert_eq!(created.file_type, "application/pdf");

    let downloaded = fx
        .service
        .download_user_file(&user_id, &created.file_id)
        .await
        .unwrap();
    assert_eq!(downloaded.content, pdf);
    assert_eq!(downloaded.extension, "pdf");
}

#[tokio::test]
async fn test_non_pdf_is_stored_unchecked() {
    let fx = Fixture::new(StaticFileSource::new("image/png", "not really a png")).await;
    let user_id = fx.create_user("png@example.com").await;

    let created = fx.service.create_user_file(&user_id).await.unwrap();
    assert_eq!(created.file_type, "image/png");
    assert_eq!(fx.stored_file_count(&user_id).await, 1);
}

#[tokio::test]
async fn test_file_source_failure() {
    let fx = Fixture::new(StaticFileSource::failing()).await;
    let user_id = fx.create_user("down@example.com").await;

    let result = fx.service.create_user_file(&user_id).await;
    assert!(matches!(result, Err(AppError::ExternalDependency(_))));
    assert_eq!(fx.stored_file_count(&user_id).await, 0);
}

#[tokio::test]
async fn test_download_returns_stored_bytes() {
    let content = vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0xff];
    let fx = Fixture::new(StaticFileSource::new("image/png", content.clone())).await;
    let user_id = fx.create_user("png@example.com").await;

    let created = fx.service.create_user_file(&user_id).await.unwrap();
    let downloaded = fx
        .service
        .download_user_file(&user_id, &created.file_id)
        .await
        .unwrap();

    assert_eq!(downloaded.content, content);
    assert_eq!(downloaded.media_type, "image/png");
    assert_eq!(downloaded.extension, "png");
    assert_eq!(downloaded.filename(), format!("{}.png", created.file_id));
}

#[tokio::test]
async fn test_list_and_delete_user_files() {
    let fx = Fixture::new(StaticFileSource::new("text/plain", "hello")).await;
    let owner = fx.create_user("owner@example.com").await;
    let other = fx.create_user("other@example.com").await;

    let mut created = Vec::new();
    for _ in 0..3 {
        created.push(fx.service.create_user_file(&owner).await.unwrap());
    }
    fx.service.create_user_file(&other).await.unwrap();

    let listed = fx
        .service
        .list_user_files(&owner, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(listed.total_rows, 3);
    assert_eq!(listed.data[0].file_id, created[0].file_id);

    fx.service
        .delete_user_file(&owner, &created[1].file_id)
        .await
        .unwrap();

    let listed = fx
        .service
        .list_user_files(&owner, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(listed.total_rows, 2);
    assert!(listed.data.iter().all(|f| f.file_id != created[1].file_id));

    let missing = fx.service.list_user_files("no-such-user", PageRequest::default()).await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_deleting_user_keeps_files() {
    let fx = Fixture::new(StaticFileSource::new("text/plain", "hello")).await;
    let user_id = fx.create_user("owner@example.com").await;
    fx.service.create_user_file(&user_id).await.unwrap();

    fx.service.delete_user(&user_id).await.unwrap();
    assert_eq!(fx.stored_file_count(&user_id).await, 1);
}

#[tokio::test]
async fn test_unknown_file_is_not_found() {
    let fx = Fixture::new(StaticFileSource::new("text/plain", "hello")).await;
    let user_id = fx.create_user("owner@example.com").await;

    let result = fx.service.get_user_file(&user_id, "no-such-file").await;
    assert!(matches!(result, Err(AppError::NotFound(_))));

    let result = fx.service.get_user_file("no-such-user", "no-such-file").await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_cross_owner_file_lookup_is_allowed_by_default() {
    let fx = Fixture::new(StaticFileSource::new("text/plain", "hello")).await;
    let user_a = fx.create_user("a@example.com").await;
    let user_b = fx.create_user("b@example.com").await;

    let file_of_b = fx.service.create_user_file(&user_b).await.unwrap();

    // Ownership is not compared unless enforcement is switched on.
    let fetched = fx
        .service
        .get_user_file(&user_a, &file_of_b.file_id)
        .await
        .unwrap();
    assert_eq!(fetched.file_id, file_of_b.file_id);

    let downloaded = fx
        .service
        .download_user_file(&user_a, &file_of_b.file_id)
        .await
        .unwrap();
    assert_eq!(downloaded.content, b"hello".to_vec());
}

#[tokio::test]
async fn test_cross_owner_file_lookup_rejected_when_enforced() {
    let config = UserServiceConfig {
        enforce_file_ownership: true,
        ..UserServiceConfig::default()
    };
    let fx = Fixture::with_config(StaticFileSource::new("text/plain", "hello"), config).await;
    let user_a = fx.create_user("a@example.com").await;
    let user_b = fx.create_user("b@example.com").await;

    let file_of_b = fx.service.create_user_file(&user_b).await.unwrap();

    let result = fx.service.get_user_file(&user_a, &file_of_b.file_id).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));

    let result = fx
        .service
        .delete_user_file(&user_a, &file_of_b.file_id)
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert_eq!(fx.stored_file_count(&user_b).await, 1);

    assert!(fx
        .service
        .get_user_file(&user_b, &file_of_b.file_id)
        .await
        .is_ok());
}

#[test]
fn test_extension_for() {
    assert_eq!(extension_for("image/png"), "png");
    assert_eq!(extension_for("application/pdf"), "pdf");
    assert_eq!(extension_for("text/plain; charset=utf-8"), "plain");
    assert_eq!(extension_for("image/svg+xml"), "svg+xml");
    assert_eq!(extension_for("octet"), "bin");
    assert_eq!(extension_for("image/"), "bin");
}
