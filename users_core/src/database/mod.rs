pub mod connection;
pub mod migrations;
pub mod pagination;
pub mod repository;

pub use connection::{get_database_pool, DatabaseManager};
pub use migrations::{run_migrations, MigrationManager};
pub use pagination::{Page, PageRequest, Pagination, DEFAULT_PAGE_LIMIT};
pub use repository::Repository;
