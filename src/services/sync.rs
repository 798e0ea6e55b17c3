//! Keeps the in-memory store in step with the database.
//!
//! Every successful mutation is followed by a full reload, so the store
//! always mirrors what the database returned last.

use crate::domain::item::{CatalogItemChanges, NewCatalogItem};
use crate::domain::types::{DownloadCount, ItemId, ItemKind};
use crate::repository::{CatalogReader, CatalogWriter};
use crate::store::{MutationGuard, SharedStore, read_store, write_store};

use super::{ServiceError, ServiceResult};

/// What a full reload ended up showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Live { mods: usize, versions: usize },
    /// The database could not be read and demo data was loaded instead.
    DemoFallback,
}

impl SyncOutcome {
    pub fn is_live(self) -> bool {
        matches!(self, Self::Live { .. })
    }
}

/// Startup load: probe the database and fall back to demo data only when the
/// probe fails.
pub fn initialize<R>(repo: &R, store: &SharedStore) -> SyncOutcome
where
    R: CatalogReader,
{
    if let Err(e) = repo.check_connection() {
        log::warn!("Database unavailable, showing demo data: {e}");
        write_store(store).load_demo();
        return SyncOutcome::DemoFallback;
    }
    load_all(repo, store)
}

/// Fetch both collections and replace the store contents wholesale.
pub fn load_all<R>(repo: &R, store: &SharedStore) -> SyncOutcome
where
    R: CatalogReader,
{
    let fetched = repo
        .list_items(ItemKind::Mod)
        .and_then(|mods| Ok((mods, repo.list_items(ItemKind::Version)?)));

    let mut store = write_store(store);
    match fetched {
        Ok((mods, versions)) => {
            let outcome = SyncOutcome::Live {
                mods: mods.len(),
                versions: versions.len(),
            };
            store.replace_all(ItemKind::Mod, mods);
            store.replace_all(ItemKind::Version, versions);
            store.mark_live();
            log::info!("Catalog reloaded: {outcome:?}");
            outcome
        }
        Err(e) => {
            log::error!("Failed to load catalog: {e}");
            store.load_demo();
            SyncOutcome::DemoFallback
        }
    }
}

/// Demo rows have ids that may belong to unrelated database rows, so no
/// mutation is sent while the store shows them.
fn ensure_live(store: &SharedStore) -> ServiceResult<()> {
    if read_store(store).is_demo() {
        log::warn!("Rejected mutation while showing demo data");
        Err(ServiceError::ReadOnly)
    } else {
        Ok(())
    }
}

pub fn create<R>(repo: &R, store: &SharedStore, item: &NewCatalogItem) -> ServiceResult<bool>
where
    R: CatalogReader + CatalogWriter,
{
    ensure_live(store)?;
    match repo.create_item(item) {
        Ok(created) => {
            log::info!("Created {} {}", created.kind(), created.id);
            load_all(repo, store);
            Ok(true)
        }
        Err(e) => {
            log::error!("Failed to create {}: {e}", item.kind());
            Ok(false)
        }
    }
}

pub fn update<R>(
    repo: &R,
    store: &SharedStore,
    guard: &MutationGuard,
    id: ItemId,
    changes: &CatalogItemChanges,
) -> ServiceResult<bool>
where
    R: CatalogReader + CatalogWriter,
{
    ensure_live(store)?;
    let kind = changes.kind();
    let _ticket = guard.try_begin(kind, id).ok_or(ServiceError::Conflict)?;

    match repo.update_item(id, changes) {
        Ok(0) => Err(ServiceError::NotFound),
        Ok(_) => {
            load_all(repo, store);
            Ok(true)
        }
        Err(e) => {
            log::error!("Failed to update {kind} {id}: {e}");
            Ok(false)
        }
    }
}

pub fn delete<R>(
    repo: &R,
    store: &SharedStore,
    guard: &MutationGuard,
    kind: ItemKind,
    id: ItemId,
) -> ServiceResult<bool>
where
    R: CatalogReader + CatalogWriter,
{
    ensure_live(store)?;
    let _ticket = guard.try_begin(kind, id).ok_or(ServiceError::Conflict)?;

    match repo.delete_item(kind, id) {
        Ok(0) => Err(ServiceError::NotFound),
        Ok(_) => {
            load_all(repo, store);
            Ok(true)
        }
        Err(e) => {
            log::error!("Failed to delete {kind} {id}: {e}");
            Ok(false)
        }
    }
}

/// Count one download.
///
/// Live data is incremented atomically in the database and the confirmed
/// value mirrored into the store. Demo data is only counted locally.
/// Returns `Ok(None)` when the database rejected the increment.
pub fn bump_download<R>(
    repo: &R,
    store: &SharedStore,
    kind: ItemKind,
    id: ItemId,
) -> ServiceResult<Option<DownloadCount>>
where
    R: CatalogWriter,
{
    if read_store(store).is_demo() {
        return write_store(store)
            .bump_downloads(kind, id)
            .map(Some)
            .ok_or(ServiceError::NotFound);
    }

    match repo.increment_downloads(kind, id) {
        Ok(Some(count)) => {
            write_store(store).set_downloads(kind, id, count);
            Ok(Some(count))
        }
        Ok(None) => Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to count download of {kind} {id}: {e}");
            Ok(None)
        }
    }
}
