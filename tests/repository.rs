use chrono::Utc;
use pushkind_mods::domain::item::{CatalogItemChanges, ItemDetails};
use pushkind_mods::domain::types::{CategoryName, GameVersion, ItemId, ItemKind, ItemTitle};
use pushkind_mods::repository::{CatalogReader, CatalogWriter, DieselRepository};

mod common;

use common::{at, new_mod, new_version};

#[test]
fn test_catalog_repository_crud() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());

    let created = repo
        .create_item(&new_mod("Fire Sword", at(100)))
        .expect("should create mod");
    assert_eq!(created.kind(), ItemKind::Mod);
    assert_eq!(created.downloads, 0);
    assert_eq!(created.created_at, created.updated_at);

    let fetched = repo
        .get_item_by_id(ItemKind::Mod, created.id)
        .expect("should query mod")
        .expect("mod should exist");
    assert_eq!(fetched.title.as_str(), "Fire Sword");
    assert!(
        repo.get_item_by_id(ItemKind::Version, created.id)
            .expect("should query versions")
            .is_none()
    );

    let changes = CatalogItemChanges {
        title: ItemTitle::new("Fire Sword II").unwrap(),
        description: fetched.description.clone(),
        image_url: fetched.image_url.clone(),
        video_url: None,
        download_url: fetched.download_url.clone(),
        details: ItemDetails::Mod {
            category: CategoryName::new("Tools").unwrap(),
            version: Some(GameVersion::new("1.20.1").unwrap()),
        },
        updated_at: Utc::now().naive_utc(),
    };
    assert_eq!(repo.update_item(created.id, &changes).expect("should update"), 1);

    let updated = repo
        .get_item_by_id(ItemKind::Mod, created.id)
        .unwrap()
        .unwrap();
    assert_eq!(updated.title.as_str(), "Fire Sword II");
    assert_eq!(updated.category().unwrap().as_str(), "Tools");
    assert_eq!(updated.version().unwrap().as_str(), "1.20.1");
    assert_eq!(updated.created_at, at(100));

    assert_eq!(repo.delete_item(ItemKind::Mod, created.id).unwrap(), 1);
    assert_eq!(repo.delete_item(ItemKind::Mod, created.id).unwrap(), 0);
    assert!(repo.list_items(ItemKind::Mod).unwrap().is_empty());
}

#[test]
fn lists_newest_first() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());

    repo.create_item(&new_version("1.19", at(100))).unwrap();
    repo.create_item(&new_version("1.21", at(300))).unwrap();
    repo.create_item(&new_version("1.20", at(200))).unwrap();

    let versions: Vec<String> = repo
        .list_items(ItemKind::Version)
        .unwrap()
        .into_iter()
        .map(|item| item.version().unwrap().as_str().to_string())
        .collect();
    assert_eq!(versions, vec!["1.21", "1.20", "1.19"]);
    assert!(repo.list_items(ItemKind::Mod).unwrap().is_empty());
}

#[test]
fn increments_downloads_atomically() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());
    let created = repo.create_item(&new_version("1.20", at(100))).unwrap();

    let first = repo
        .increment_downloads(ItemKind::Version, created.id)
        .unwrap()
        .unwrap();
    let second = repo
        .increment_downloads(ItemKind::Version, created.id)
        .unwrap()
        .unwrap();
    assert_eq!(first, 1);
    assert_eq!(second, 2);

    let missing = ItemId::new(created.id.get() + 100).unwrap();
    assert!(
        repo.increment_downloads(ItemKind::Version, missing)
            .unwrap()
            .is_none()
    );
}

#[test]
fn connection_check_fails_without_tables() {
    let ready = common::TestDb::new();
    assert!(DieselRepository::new(ready.pool()).check_connection().is_ok());

    let empty = common::TestDb::unmigrated();
    assert!(DieselRepository::new(empty.pool()).check_connection().is_err());
}
