use async_trait::async_trait;

use crate::database::pagination::{Page, PageRequest};
use crate::error::Result;

/// Storage contract shared by every persisted resource.
///
/// Rows carry a `deleted_at` tombstone. `list` and `get_by_id` only see
/// active rows, `get_by_uuid` sees tombstoned rows as well.
#[async_trait]
pub trait Repository<T>: Send + Sync
where
    T: Send + Sync,
{
    type Filter: Send + Sync;
    type CreateInput: Send;

    async fn list(&self, filter: &Self::Filter, request: PageRequest) -> Result<Page<T>>;
    async fn get_by_uuid(&self, uuid: &str) -> Result<T>;
    async fn get_by_id(&self, id: i64) -> Result<T>;
    async fn create(&self, input: Self::CreateInput) -> Result<T>;
    /// Sets the tombstone. A row that already has one keeps it.
    async fn soft_delete(&self, entity: &T) -> Result<()>;
    /// Removes the row, tombstoned or not.
    async fn hard_delete(&self, entity: &T) -> Result<()>;
}
