use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    CategoryName, DownloadCount, DownloadUrl, GameVersion, ImageUrl, ItemDescription, ItemId,
    ItemKind, ItemTitle, VideoUrl,
};

/// Category given to mods stored without one.
pub const DEFAULT_MOD_CATEGORY: &str = "Tools";

/// Fields that only exist for one kind of catalog item.
///
/// Versions never carry a category and always name the game version they
/// package; mods have a category and may target a specific version.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemDetails {
    Mod {
        category: CategoryName,
        version: Option<GameVersion>,
    },
    Version {
        version: GameVersion,
    },
}

impl ItemDetails {
    pub fn kind(&self) -> ItemKind {
        match self {
            Self::Mod { .. } => ItemKind::Mod,
            Self::Version { .. } => ItemKind::Version,
        }
    }

    pub fn category(&self) -> Option<&CategoryName> {
        match self {
            Self::Mod { category, .. } => Some(category),
            Self::Version { .. } => None,
        }
    }

    pub fn version(&self) -> Option<&GameVersion> {
        match self {
            Self::Mod { version, .. } => version.as_ref(),
            Self::Version { version } => Some(version),
        }
    }
}

/// A mod or game version listed in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogItem {
    pub id: ItemId,
    pub title: ItemTitle,
    pub description: ItemDescription,
    pub image_url: ImageUrl,
    pub video_url: Option<VideoUrl>,
    pub download_url: DownloadUrl,
    pub downloads: DownloadCount,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    #[serde(flatten)]
    pub details: ItemDetails,
}

impl CatalogItem {
    pub fn kind(&self) -> ItemKind {
        self.details.kind()
    }

    pub fn category(&self) -> Option<&CategoryName> {
        self.details.category()
    }

    pub fn version(&self) -> Option<&GameVersion> {
        self.details.version()
    }
}

/// Information required to create a new [`CatalogItem`].
///
/// The download counter is not part of the payload: new rows always start at
/// zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewCatalogItem {
    pub title: ItemTitle,
    pub description: ItemDescription,
    pub image_url: ImageUrl,
    pub video_url: Option<VideoUrl>,
    pub download_url: DownloadUrl,
    pub details: ItemDetails,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl NewCatalogItem {
    pub fn kind(&self) -> ItemKind {
        self.details.kind()
    }
}

/// Editable fields of an existing [`CatalogItem`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogItemChanges {
    pub title: ItemTitle,
    pub description: ItemDescription,
    pub image_url: ImageUrl,
    pub video_url: Option<VideoUrl>,
    pub download_url: DownloadUrl,
    pub details: ItemDetails,
    pub updated_at: NaiveDateTime,
}

impl CatalogItemChanges {
    pub fn kind(&self) -> ItemKind {
        self.details.kind()
    }
}
