//! In-memory catalog state shared by all request handlers.
//!
//! The store is built once in `main`, filled by the sync service and read by
//! every page. Collections are only changed through the named operations on
//! [`CatalogStore`]; callers never touch the vectors directly.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{NaiveDateTime, Utc};
use serde::Serialize;

use crate::domain::item::{CatalogItem, ItemDetails};
use crate::domain::stats::CatalogStats;
use crate::domain::types::{
    CategoryName, DownloadCount, DownloadUrl, GameVersion, ImageUrl, ItemDescription, ItemId,
    ItemKind, ItemTitle, TypeConstraintError, VideoUrl,
};

/// Store shared between actix workers.
pub type SharedStore = RwLock<CatalogStore>;

/// Lock the store for reading. A poisoned lock still yields the data.
pub fn read_store(store: &SharedStore) -> RwLockReadGuard<'_, CatalogStore> {
    store.read().unwrap_or_else(PoisonError::into_inner)
}

/// Lock the store for writing. A poisoned lock still yields the data.
pub fn write_store(store: &SharedStore) -> RwLockWriteGuard<'_, CatalogStore> {
    store.write().unwrap_or_else(PoisonError::into_inner)
}

/// Where the current contents of the store came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    /// Nothing has been loaded yet.
    #[default]
    Empty,
    /// Rows loaded from the database.
    Live,
    /// Built-in sample rows used while the database is unavailable.
    Demo,
}

/// Both catalog collections, newest first.
#[derive(Debug, Default)]
pub struct CatalogStore {
    mods: Vec<CatalogItem>,
    versions: Vec<CatalogItem>,
    source: DataSource,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self, kind: ItemKind) -> &[CatalogItem] {
        match kind {
            ItemKind::Mod => &self.mods,
            ItemKind::Version => &self.versions,
        }
    }

    fn items_mut(&mut self, kind: ItemKind) -> &mut Vec<CatalogItem> {
        match kind {
            ItemKind::Mod => &mut self.mods,
            ItemKind::Version => &mut self.versions,
        }
    }

    pub fn get(&self, kind: ItemKind, id: ItemId) -> Option<&CatalogItem> {
        self.items(kind).iter().find(|item| item.id == id)
    }

    /// The first `limit` items of `kind`.
    pub fn latest(&self, kind: ItemKind, limit: usize) -> &[CatalogItem] {
        let items = self.items(kind);
        &items[..items.len().min(limit)]
    }

    pub fn source(&self) -> DataSource {
        self.source
    }

    pub fn is_demo(&self) -> bool {
        self.source == DataSource::Demo
    }

    /// Replace one collection wholesale with a fresh gateway snapshot.
    ///
    /// Items of another kind are dropped.
    pub fn replace_all(&mut self, kind: ItemKind, items: Vec<CatalogItem>) {
        *self.items_mut(kind) = items.into_iter().filter(|i| i.kind() == kind).collect();
    }

    /// Mark the current contents as coming from the database.
    pub fn mark_live(&mut self) {
        self.source = DataSource::Live;
    }

    /// Replace an item with the same id or insert it as the newest entry.
    pub fn upsert(&mut self, item: CatalogItem) {
        let items = self.items_mut(item.kind());
        match items.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) => *existing = item,
            None => items.insert(0, item),
        }
    }

    /// Remove an item. Returns `false` when it was not present.
    pub fn remove(&mut self, kind: ItemKind, id: ItemId) -> bool {
        let items = self.items_mut(kind);
        let before = items.len();
        items.retain(|item| item.id != id);
        items.len() != before
    }

    /// Increase the local download counter of an item by one.
    pub fn bump_downloads(&mut self, kind: ItemKind, id: ItemId) -> Option<DownloadCount> {
        let item = self.items_mut(kind).iter_mut().find(|item| item.id == id)?;
        item.downloads = item.downloads.incremented();
        Some(item.downloads)
    }

    /// Mirror a counter confirmed by the database.
    pub fn set_downloads(&mut self, kind: ItemKind, id: ItemId, downloads: DownloadCount) -> bool {
        match self.items_mut(kind).iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.downloads = downloads;
                true
            }
            None => false,
        }
    }

    /// Swap both collections for the built-in sample catalog.
    pub fn load_demo(&mut self) {
        let now = Utc::now().naive_utc();
        match demo_catalog(now) {
            Ok((mods, versions)) => {
                self.mods = mods;
                self.versions = versions;
            }
            Err(e) => {
                log::error!("Invalid demo catalog: {e}");
                self.mods.clear();
                self.versions.clear();
            }
        }
        self.source = DataSource::Demo;
    }

    pub fn stats(&self) -> CatalogStats {
        let total_downloads = self
            .mods
            .iter()
            .chain(self.versions.iter())
            .map(|item| i64::from(item.downloads.get()))
            .sum();

        CatalogStats {
            mods_count: self.mods.len(),
            versions_count: self.versions.len(),
            total_downloads,
            top_mod: most_downloaded(&self.mods),
            top_version: most_downloaded(&self.versions),
        }
    }
}

/// Title of the item with the highest positive download count. Earlier items
/// win ties.
fn most_downloaded(items: &[CatalogItem]) -> Option<String> {
    let mut top: Option<&CatalogItem> = None;
    for item in items {
        let best = top.map_or(0, |t| t.downloads.get());
        if item.downloads.get() > best {
            top = Some(item);
        }
    }
    top.map(|item| item.title.as_str().to_string())
}

fn demo_catalog(
    now: NaiveDateTime,
) -> Result<(Vec<CatalogItem>, Vec<CatalogItem>), TypeConstraintError> {
    let mods = vec![CatalogItem {
        id: ItemId::new(1)?,
        title: ItemTitle::new("Flaming Sword Mod")?,
        description: ItemDescription::new(
            "A great mod that adds fire swords with special effects to make the game more fun",
        )?,
        image_url: ImageUrl::new("https://via.placeholder.com/400x200/2d5ba9/ffffff?text=Sword+Mod")?,
        video_url: Some(VideoUrl::new("https://www.youtube.com/watch?v=dQw4w9WgXcQ")?),
        download_url: DownloadUrl::new("https://example.com/download/mod1.zip")?,
        downloads: DownloadCount::new(1500)?,
        created_at: now,
        updated_at: now,
        details: ItemDetails::Mod {
            category: CategoryName::new("Weapons")?,
            version: Some(GameVersion::new("1.20.1")?),
        },
    }];

    let versions = vec![CatalogItem {
        id: ItemId::new(1)?,
        title: ItemTitle::new("Minecraft Bedrock 1.20.1")?,
        description: ItemDescription::new(
            "The latest stable Minecraft Bedrock release with all the new features",
        )?,
        image_url: ImageUrl::new(
            "https://via.placeholder.com/400x200/2d5ba9/ffffff?text=Minecraft+1.20.1",
        )?,
        video_url: Some(VideoUrl::new("https://www.youtube.com/watch?v=dQw4w9WgXcQ")?),
        download_url: DownloadUrl::new("https://example.com/download/minecraft-1.20.1.apk")?,
        downloads: DownloadCount::new(15000)?,
        created_at: now,
        updated_at: now,
        details: ItemDetails::Version {
            version: GameVersion::new("1.20.1")?,
        },
    }];

    Ok((mods, versions))
}

/// Items with an update or delete in progress. A repeated submit of the same
/// item is turned away until the first one finishes.
#[derive(Debug, Clone, Default)]
pub struct MutationGuard {
    in_flight: Arc<Mutex<HashSet<(ItemKind, ItemId)>>>,
}

impl MutationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `(kind, id)`. Returns `None` while another mutation holds it.
    pub fn try_begin(&self, kind: ItemKind, id: ItemId) -> Option<MutationTicket> {
        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if in_flight.insert((kind, id)) {
            Some(MutationTicket {
                guard: self.clone(),
                key: (kind, id),
            })
        } else {
            None
        }
    }
}

/// Releases its item when dropped.
#[derive(Debug)]
pub struct MutationTicket {
    guard: MutationGuard,
    key: (ItemKind, ItemId),
}

impl Drop for MutationTicket {
    fn drop(&mut self) {
        let mut in_flight = self
            .guard
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        in_flight.remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test::{sample_mod, sample_version};

    fn id(value: i32) -> ItemId {
        ItemId::new(value).unwrap()
    }

    #[test]
    fn replace_all_discards_previous_items() {
        let mut store = CatalogStore::new();
        store.replace_all(ItemKind::Mod, vec![sample_mod(1, "Old", 0), sample_mod(2, "Stale", 0)]);
        store.replace_all(ItemKind::Mod, vec![sample_mod(3, "Fresh", 0)]);

        let ids: Vec<i32> = store.items(ItemKind::Mod).iter().map(|i| i.id.get()).collect();
        assert_eq!(ids, vec![3]);
    }

    #[test]
    fn replace_all_keeps_collections_apart() {
        let mut store = CatalogStore::new();
        store.replace_all(
            ItemKind::Mod,
            vec![sample_mod(1, "Sword", 0), sample_version(2, "1.20.1", 0)],
        );
        assert_eq!(store.items(ItemKind::Mod).len(), 1);
        assert!(store.items(ItemKind::Version).is_empty());
    }

    #[test]
    fn upsert_replaces_or_prepends() {
        let mut store = CatalogStore::new();
        store.replace_all(ItemKind::Mod, vec![sample_mod(1, "Sword", 0)]);

        store.upsert(sample_mod(1, "Sword v2", 0));
        assert_eq!(store.items(ItemKind::Mod)[0].title.as_str(), "Sword v2");

        store.upsert(sample_mod(2, "Shield", 0));
        let titles: Vec<&str> = store
            .items(ItemKind::Mod)
            .iter()
            .map(|i| i.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Shield", "Sword v2"]);
    }

    #[test]
    fn remove_reports_presence() {
        let mut store = CatalogStore::new();
        store.replace_all(ItemKind::Version, vec![sample_version(4, "1.19", 0)]);
        assert!(!store.remove(ItemKind::Mod, id(4)));
        assert!(store.remove(ItemKind::Version, id(4)));
        assert!(store.items(ItemKind::Version).is_empty());
    }

    #[test]
    fn bump_downloads_counts_sequentially() {
        let mut store = CatalogStore::new();
        store.replace_all(ItemKind::Mod, vec![sample_mod(1, "Sword", 5)]);
        assert_eq!(store.bump_downloads(ItemKind::Mod, id(1)).unwrap(), 6);
        assert_eq!(store.bump_downloads(ItemKind::Mod, id(1)).unwrap(), 7);
        assert!(store.bump_downloads(ItemKind::Version, id(1)).is_none());
    }

    #[test]
    fn latest_is_capped() {
        let mut store = CatalogStore::new();
        store.replace_all(
            ItemKind::Mod,
            (1..=5).map(|i| sample_mod(i, "Mod", 0)).collect(),
        );
        assert_eq!(store.latest(ItemKind::Mod, 3).len(), 3);
        assert_eq!(store.latest(ItemKind::Version, 3).len(), 0);
    }

    #[test]
    fn stats_pick_strictly_highest_downloads() {
        let mut store = CatalogStore::new();
        store.replace_all(
            ItemKind::Mod,
            vec![
                sample_mod(1, "First", 10),
                sample_mod(2, "Second", 10),
                sample_mod(3, "Third", 3),
            ],
        );
        store.replace_all(ItemKind::Version, vec![sample_version(4, "1.20", 0)]);

        let stats = store.stats();
        assert_eq!(stats.mods_count, 3);
        assert_eq!(stats.versions_count, 1);
        assert_eq!(stats.total_downloads, 23);
        assert_eq!(stats.top_mod.as_deref(), Some("First"));
        assert_eq!(stats.top_version, None);
    }

    #[test]
    fn demo_data_is_marked() {
        let mut store = CatalogStore::new();
        store.load_demo();
        assert!(store.is_demo());
        assert_eq!(store.items(ItemKind::Mod).len(), 1);
        assert_eq!(store.items(ItemKind::Version).len(), 1);
        assert_eq!(store.items(ItemKind::Mod)[0].kind(), ItemKind::Mod);
    }

    #[test]
    fn source_follows_loads() {
        let mut store = CatalogStore::new();
        assert_eq!(store.source(), DataSource::Empty);

        store.load_demo();
        assert_eq!(store.source(), DataSource::Demo);

        store.replace_all(ItemKind::Mod, vec![sample_mod(1, "Sword", 0)]);
        store.mark_live();
        assert_eq!(store.source(), DataSource::Live);
        assert!(!store.is_demo());
    }

    #[test]
    fn guard_rejects_overlapping_mutations() {
        let guard = MutationGuard::new();
        let ticket = guard.try_begin(ItemKind::Mod, id(1)).unwrap();
        assert!(guard.try_begin(ItemKind::Mod, id(1)).is_none());
        assert!(guard.try_begin(ItemKind::Version, id(1)).is_some());
        drop(ticket);
        assert!(guard.try_begin(ItemKind::Mod, id(1)).is_some());
    }
}
