//! Helpers for integration tests.

#![allow(dead_code)]

use chrono::{DateTime, NaiveDateTime};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use pushkind_common::db::{DbPool, establish_connection_pool};
use pushkind_mods::domain::item::{ItemDetails, NewCatalogItem};
use pushkind_mods::domain::types::{
    CategoryName, DownloadUrl, GameVersion, ImageUrl, ItemDescription, ItemTitle,
};
use tempfile::NamedTempFile;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Temporary database used in integration tests.
pub struct TestDb {
    _tempfile: NamedTempFile,
    pool: DbPool,
}

impl TestDb {
    pub fn new() -> Self {
        let tempfile = NamedTempFile::new().expect("Failed to create temp file");
        let pool = establish_connection_pool(tempfile.path().to_str().unwrap())
            .expect("Failed to establish SQLite connection.");
        let mut conn = pool
            .get()
            .expect("Failed to get SQLite connection from pool.");
        conn.run_pending_migrations(MIGRATIONS)
            .expect("Migrations failed");
        TestDb {
            _tempfile: tempfile,
            pool,
        }
    }

    /// Database file without any tables.
    pub fn unmigrated() -> Self {
        let tempfile = NamedTempFile::new().expect("Failed to create temp file");
        let pool = establish_connection_pool(tempfile.path().to_str().unwrap())
            .expect("Failed to establish SQLite connection.");
        TestDb {
            _tempfile: tempfile,
            pool,
        }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }
}

pub fn at(seconds: i64) -> NaiveDateTime {
    DateTime::from_timestamp(seconds, 0)
        .expect("valid timestamp")
        .naive_utc()
}

pub fn new_mod(title: &str, created_at: NaiveDateTime) -> NewCatalogItem {
    NewCatalogItem {
        title: ItemTitle::new(title).expect("valid title"),
        description: ItemDescription::new(format!("{title} for the game")).expect("valid text"),
        image_url: ImageUrl::new("https://example.com/mod.png").expect("valid url"),
        video_url: None,
        download_url: DownloadUrl::new("https://example.com/mod.zip").expect("valid url"),
        details: ItemDetails::Mod {
            category: CategoryName::new("Weapons").expect("valid category"),
            version: None,
        },
        created_at,
        updated_at: created_at,
    }
}

pub fn new_version(version: &str, created_at: NaiveDateTime) -> NewCatalogItem {
    NewCatalogItem {
        title: ItemTitle::new(format!("Minecraft Bedrock {version}")).expect("valid title"),
        description: ItemDescription::new("Stable release").expect("valid text"),
        image_url: ImageUrl::new("https://example.com/version.png").expect("valid url"),
        video_url: None,
        download_url: DownloadUrl::new("https://example.com/version.apk").expect("valid url"),
        details: ItemDetails::Version {
            version: GameVersion::new(version).expect("valid version"),
        },
        created_at,
        updated_at: created_at,
    }
}
