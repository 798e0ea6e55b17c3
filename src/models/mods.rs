use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::item::{
    CatalogItem as DomainCatalogItem, CatalogItemChanges as DomainCatalogItemChanges,
    DEFAULT_MOD_CATEGORY, ItemDetails, NewCatalogItem as DomainNewCatalogItem,
};
use crate::domain::types::{
    CategoryName, DownloadCount, DownloadUrl, GameVersion, ImageUrl, ItemDescription, ItemTitle,
    TypeConstraintError, VideoUrl,
};

/// Diesel model representing a row in the `mods` table.
#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::mods)]
pub struct Mod {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub video_url: Option<String>,
    pub download_url: String,
    pub category: String,
    pub version: Option<String>,
    pub downloads: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Insertable form of [`Mod`] used for creating new rows.
#[derive(Insertable)]
#[diesel(table_name = crate::schema::mods)]
pub struct NewMod<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub image_url: &'a str,
    pub video_url: Option<&'a str>,
    pub download_url: &'a str,
    pub category: &'a str,
    pub version: Option<&'a str>,
    pub downloads: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Changeset applied when a mod is edited.
#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::mods)]
#[diesel(treat_none_as_null = true)]
pub struct ModChanges<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub image_url: &'a str,
    pub video_url: Option<&'a str>,
    pub download_url: &'a str,
    pub category: &'a str,
    pub version: Option<&'a str>,
    pub updated_at: NaiveDateTime,
}

impl<'a> NewMod<'a> {
    pub fn new(
        item: &'a DomainNewCatalogItem,
        category: &'a CategoryName,
        version: Option<&'a GameVersion>,
    ) -> Self {
        Self {
            title: item.title.as_str(),
            description: item.description.as_str(),
            image_url: item.image_url.as_str(),
            video_url: item.video_url.as_ref().map(|url| url.as_str()),
            download_url: item.download_url.as_str(),
            category: category.as_str(),
            version: version.map(|v| v.as_str()),
            downloads: 0,
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

impl<'a> ModChanges<'a> {
    pub fn new(
        changes: &'a DomainCatalogItemChanges,
        category: &'a CategoryName,
        version: Option<&'a GameVersion>,
    ) -> Self {
        Self {
            title: changes.title.as_str(),
            description: changes.description.as_str(),
            image_url: changes.image_url.as_str(),
            video_url: changes.video_url.as_ref().map(|url| url.as_str()),
            download_url: changes.download_url.as_str(),
            category: category.as_str(),
            version: version.map(|v| v.as_str()),
            updated_at: changes.updated_at,
        }
    }
}

impl TryFrom<Mod> for DomainCatalogItem {
    type Error = TypeConstraintError;

    fn try_from(row: Mod) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id.try_into()?,
            title: ItemTitle::new(row.title)?,
            description: ItemDescription::new(row.description)?,
            image_url: ImageUrl::new(row.image_url)?,
            video_url: row
                .video_url
                .filter(|v| !v.trim().is_empty())
                .map(VideoUrl::new)
                .transpose()?,
            download_url: DownloadUrl::new(row.download_url)?,
            downloads: DownloadCount::new(row.downloads)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
            details: ItemDetails::Mod {
                category: if row.category.trim().is_empty() {
                    CategoryName::new(DEFAULT_MOD_CATEGORY)?
                } else {
                    CategoryName::new(row.category)?
                },
                version: row
                    .version
                    .filter(|v| !v.trim().is_empty())
                    .map(GameVersion::new)
                    .transpose()?,
            },
        })
    }
}
