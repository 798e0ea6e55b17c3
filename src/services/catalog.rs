use serde::Serialize;

use crate::domain::item::CatalogItem;
use crate::domain::stats::CatalogStats;
use crate::domain::types::{ItemId, ItemKind};
use crate::dto::items::{
    CardLayout, CardList, ItemDetailView, SearchResultsDto, render_cards,
};
use crate::repository::{CatalogReader, CatalogWriter};
use crate::search::{SearchOutcome, filter_items};
use crate::services::sync;
use crate::store::{SharedStore, read_store};

use super::{ServiceError, ServiceResult};

#[derive(Debug, Serialize)]
pub struct HomeView {
    pub latest_mods: CardList,
    pub latest_versions: CardList,
    pub stats: CatalogStats,
}

pub fn show_home(store: &SharedStore, latest: usize) -> HomeView {
    let store = read_store(store);
    HomeView {
        latest_mods: render_cards(store.latest(ItemKind::Mod, latest), CardLayout::Grid),
        latest_versions: render_cards(store.latest(ItemKind::Version, latest), CardLayout::Grid),
        stats: store.stats(),
    }
}

pub fn show_items(store: &SharedStore, kind: ItemKind) -> CardList {
    render_cards(read_store(store).items(kind), CardLayout::Grid)
}

/// Look the item up in the store first and ask the database only on a miss.
fn find_item<R>(repo: &R, store: &SharedStore, kind: ItemKind, id: ItemId) -> ServiceResult<CatalogItem>
where
    R: CatalogReader,
{
    if let Some(item) = read_store(store).get(kind, id) {
        return Ok(item.clone());
    }

    match repo.get_item_by_id(kind, id) {
        Ok(Some(item)) => Ok(item),
        Ok(None) => Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get {kind} {id}: {e}");
            Err(ServiceError::Internal)
        }
    }
}

pub fn show_item<R>(
    repo: &R,
    store: &SharedStore,
    kind: ItemKind,
    id: ItemId,
) -> ServiceResult<ItemDetailView>
where
    R: CatalogReader,
{
    find_item(repo, store, kind, id).map(|item| ItemDetailView::from(&item))
}

/// Search both collections, mods first. `None` hides the results panel.
pub fn search(store: &SharedStore, query: &str, preview_limit: usize) -> Option<SearchResultsDto> {
    let store = read_store(store);
    let items = store
        .items(ItemKind::Mod)
        .iter()
        .chain(store.items(ItemKind::Version));

    match filter_items(query, items) {
        SearchOutcome::Hidden => None,
        SearchOutcome::Results(found) => Some(SearchResultsDto::new(query, &found, preview_limit)),
    }
}

/// Download target of an item after its counter was bumped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadLink {
    pub url: String,
    /// `None` when the counter could not be updated.
    pub downloads: Option<i32>,
}

pub fn download<R>(
    repo: &R,
    store: &SharedStore,
    kind: ItemKind,
    id: ItemId,
) -> ServiceResult<DownloadLink>
where
    R: CatalogReader + CatalogWriter,
{
    let item = find_item(repo, store, kind, id)?;
    let downloads = sync::bump_download(repo, store, kind, id)?;
    Ok(DownloadLink {
        url: item.download_url.into_inner(),
        downloads: downloads.map(|count| count.get()),
    })
}
