use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::item::{
    CatalogItem as DomainCatalogItem, CatalogItemChanges as DomainCatalogItemChanges,
    ItemDetails, NewCatalogItem as DomainNewCatalogItem,
};
use crate::domain::types::{
    DownloadCount, DownloadUrl, GameVersion, ImageUrl, ItemDescription, ItemTitle,
    TypeConstraintError, VideoUrl,
};

/// Diesel model representing a row in the `versions` table.
#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::versions)]
pub struct Version {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub video_url: Option<String>,
    pub download_url: String,
    pub version: String,
    pub downloads: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Insertable form of [`Version`].
#[derive(Insertable)]
#[diesel(table_name = crate::schema::versions)]
pub struct NewVersion<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub image_url: &'a str,
    pub video_url: Option<&'a str>,
    pub download_url: &'a str,
    pub version: &'a str,
    pub downloads: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::versions)]
#[diesel(treat_none_as_null = true)]
pub struct VersionChanges<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub image_url: &'a str,
    pub video_url: Option<&'a str>,
    pub download_url: &'a str,
    pub version: &'a str,
    pub updated_at: NaiveDateTime,
}

impl<'a> NewVersion<'a> {
    pub fn new(item: &'a DomainNewCatalogItem, version: &'a GameVersion) -> Self {
        Self {
            title: item.title.as_str(),
            description: item.description.as_str(),
            image_url: item.image_url.as_str(),
            video_url: item.video_url.as_ref().map(|url| url.as_str()),
            download_url: item.download_url.as_str(),
            version: version.as_str(),
            downloads: 0,
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

impl<'a> VersionChanges<'a> {
    pub fn new(changes: &'a DomainCatalogItemChanges, version: &'a GameVersion) -> Self {
        Self {
            title: changes.title.as_str(),
            description: changes.description.as_str(),
            image_url: changes.image_url.as_str(),
            video_url: changes.video_url.as_ref().map(|url| url.as_str()),
            download_url: changes.download_url.as_str(),
            version: version.as_str(),
            updated_at: changes.updated_at,
        }
    }
}

impl TryFrom<Version> for DomainCatalogItem {
    type Error = TypeConstraintError;

    fn try_from(row: Version) -> Result<Self, Self::Error> {
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
            details: ItemDetails::Version {
                version: GameVersion::new(row.version)?,
            },
        })
    }
}
