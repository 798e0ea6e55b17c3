use pushkind_common::db::{DbConnection, DbPool};
use pushkind_common::repository::errors::RepositoryResult;

use crate::domain::item::{CatalogItem, CatalogItemChanges, NewCatalogItem};
use crate::domain::types::{DownloadCount, ItemId, ItemKind};

pub mod items;

/// Repository implementation backed by Diesel and SQLite.
///
/// The underlying `r2d2::Pool` is cheap to clone, allowing the repository to
/// be passed around freely between handlers.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool, // r2d2::Pool is cheap to clone
}

impl DieselRepository {
    /// Create a new repository from an established database pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get a pooled database connection.
    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Read-only operations over the `mods` and `versions` collections.
pub trait CatalogReader {
    /// List every item of `kind`, newest first.
    fn list_items(&self, kind: ItemKind) -> RepositoryResult<Vec<CatalogItem>>;
    /// Retrieve a single item by its identifier.
    fn get_item_by_id(&self, kind: ItemKind, id: ItemId) -> RepositoryResult<Option<CatalogItem>>;
    /// Cheap probe used at startup to decide whether live data is available.
    fn check_connection(&self) -> RepositoryResult<()>;
}

/// Write operations over the `mods` and `versions` collections.
pub trait CatalogWriter {
    /// Persist a new item with a zero download counter and return the stored row.
    fn create_item(&self, item: &NewCatalogItem) -> RepositoryResult<CatalogItem>;
    /// Overwrite the editable fields of an item. The kind is taken from `changes`.
    fn update_item(&self, id: ItemId, changes: &CatalogItemChanges) -> RepositoryResult<usize>;
    /// Delete an item by kind and id.
    fn delete_item(&self, kind: ItemKind, id: ItemId) -> RepositoryResult<usize>;
    /// Atomically add one to the download counter and return the new value.
    ///
    /// Returns `Ok(None)` when the item does not exist.
    fn increment_downloads(
        &self,
        kind: ItemKind,
        id: ItemId,
    ) -> RepositoryResult<Option<DownloadCount>>;
}
