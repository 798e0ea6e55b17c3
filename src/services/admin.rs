//! Admin panel operations.
//!
//! Every function takes the `is_admin` flag of the current session and
//! returns [`ServiceError::Unauthorized`] without it. The password check is a
//! plain comparison with the configured secret and is not meant to resist a
//! determined attacker.

use chrono::Utc;
use serde::Serialize;

use crate::domain::stats::{CatalogStats, VisitStats};
use crate::domain::types::{ItemId, ItemKind};
use crate::dto::items::{CardLayout, CardList, ItemCardDto, PreviewView, render_cards};
use crate::forms::items::{
    DeleteItemFormPayload, FormMode, ItemForm, ItemFormPayload, ItemFormState, LoginFormPayload,
};
use crate::repository::{CatalogReader, CatalogWriter};
use crate::search::filter_admin;
use crate::services::sync::{self, SyncOutcome};
use crate::store::{MutationGuard, SharedStore, read_store};

use super::{ServiceError, ServiceResult};

fn ensure_admin(is_admin: bool) -> ServiceResult<()> {
    if is_admin {
        Ok(())
    } else {
        Err(ServiceError::Unauthorized)
    }
}

/// Compare the submitted password with the configured one.
///
/// An empty configured password never matches.
pub fn login(payload: &LoginFormPayload, admin_password: &str) -> ServiceResult<()> {
    if !admin_password.is_empty() && payload.password == admin_password {
        log::info!("Admin logged in");
        Ok(())
    } else {
        log::warn!("Rejected admin login attempt");
        Err(ServiceError::Unauthorized)
    }
}

#[derive(Debug, Serialize)]
pub struct AdminPanelView {
    pub mods: CardList,
    pub versions: CardList,
    pub mods_q: String,
    pub versions_q: String,
    pub mods_count: usize,
    pub versions_count: usize,
}

pub fn show_panel(
    is_admin: bool,
    store: &SharedStore,
    mods_q: &str,
    versions_q: &str,
) -> ServiceResult<AdminPanelView> {
    ensure_admin(is_admin)?;
    let store = read_store(store);
    let mods = store.items(ItemKind::Mod);
    let versions = store.items(ItemKind::Version);

    Ok(AdminPanelView {
        mods: render_cards(filter_admin(mods_q, mods), CardLayout::AdminRow),
        versions: render_cards(filter_admin(versions_q, versions), CardLayout::AdminRow),
        mods_q: mods_q.to_string(),
        versions_q: versions_q.to_string(),
        mods_count: mods.len(),
        versions_count: versions.len(),
    })
}

#[derive(Debug, Serialize)]
pub struct AdminStatsView {
    pub catalog: CatalogStats,
    pub visits: VisitStats,
}

pub fn show_stats(
    is_admin: bool,
    store: &SharedStore,
    visits: VisitStats,
) -> ServiceResult<AdminStatsView> {
    ensure_admin(is_admin)?;
    Ok(AdminStatsView {
        catalog: read_store(store).stats(),
        visits,
    })
}

pub fn refresh<R>(is_admin: bool, repo: &R, store: &SharedStore) -> ServiceResult<SyncOutcome>
where
    R: CatalogReader,
{
    ensure_admin(is_admin)?;
    Ok(sync::load_all(repo, store))
}

pub fn show_form(is_admin: bool, kind: &str) -> ServiceResult<ItemFormState> {
    ensure_admin(is_admin)?;
    Ok(ItemFormState::create(ItemKind::try_from(kind)?))
}

/// Load the item fresh from the database and fill the form with it.
pub fn edit_form<R>(is_admin: bool, repo: &R, kind: &str, id: i32) -> ServiceResult<ItemFormState>
where
    R: CatalogReader,
{
    ensure_admin(is_admin)?;
    let kind = ItemKind::try_from(kind)?;
    let id = ItemId::new(id)?;

    match repo.get_item_by_id(kind, id) {
        Ok(Some(item)) => Ok(ItemFormState::edit(&item)),
        Ok(None) => Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to load {kind} {id} for editing: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Create or update an item depending on the form mode.
pub fn submit_item<R>(
    is_admin: bool,
    repo: &R,
    store: &SharedStore,
    guard: &MutationGuard,
    form: ItemForm,
) -> ServiceResult<bool>
where
    R: CatalogReader + CatalogWriter,
{
    ensure_admin(is_admin)?;
    let payload = ItemFormPayload::try_from(form)?;
    let now = Utc::now().naive_utc();

    match payload.mode {
        FormMode::Create => sync::create(repo, store, &payload.into_new_item(now)),
        FormMode::Edit(id) => sync::update(repo, store, guard, id, &payload.into_changes(now)),
    }
}

#[derive(Debug, Serialize)]
pub struct PreviewPage {
    pub form: ItemFormState,
    pub preview: Option<PreviewView>,
}

/// Render the unsaved form. The preview is missing until the required
/// fields are filled in.
pub fn preview_item(is_admin: bool, form: &ItemForm) -> ServiceResult<PreviewPage> {
    ensure_admin(is_admin)?;
    let state = ItemFormState::from_form(form)?;
    let kind = ItemKind::try_from(state.kind)?;
    let preview = PreviewView::new(
        kind,
        &form.title,
        &form.description,
        &form.image_url,
        &form.category,
        &form.version,
    );
    Ok(PreviewPage {
        form: state,
        preview,
    })
}

/// Item shown on the delete confirmation page.
pub fn confirm_delete<R>(
    is_admin: bool,
    repo: &R,
    store: &SharedStore,
    kind: &str,
    id: i32,
) -> ServiceResult<ItemCardDto>
where
    R: CatalogReader,
{
    ensure_admin(is_admin)?;
    let kind = ItemKind::try_from(kind)?;
    let id = ItemId::new(id)?;

    if let Some(item) = read_store(store).get(kind, id) {
        return Ok(ItemCardDto::new(item, CardLayout::AdminRow));
    }

    match repo.get_item_by_id(kind, id) {
        Ok(Some(item)) => Ok(ItemCardDto::new(&item, CardLayout::AdminRow)),
        Ok(None) => Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to load {kind} {id}: {e}");
            Err(ServiceError::Internal)
        }
    }
}

pub fn delete_item<R>(
    is_admin: bool,
    repo: &R,
    store: &SharedStore,
    guard: &MutationGuard,
    payload: DeleteItemFormPayload,
) -> ServiceResult<bool>
where
    R: CatalogReader + CatalogWriter,
{
    ensure_admin(is_admin)?;
    sync::delete(repo, store, guard, payload.kind, payload.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::items::DeleteItemForm;
    use crate::repository::test::{TestRepository, sample_mod, sample_version};
    use crate::services::sync::load_all;
    use crate::store::CatalogStore;

    fn loaded(repo: &TestRepository) -> SharedStore {
        let store = SharedStore::new(CatalogStore::new());
        load_all(repo, &store);
        store
    }

    fn new_mod_form() -> ItemForm {
        ItemForm {
            kind: "mod".into(),
            edit_id: None,
            title: "Ice Bow".into(),
            description: "Freezes targets".into(),
            image_url: "https://example.com/bow.png".into(),
            video_url: String::new(),
            download_url: "https://example.com/bow.zip".into(),
            category: "Weapons".into(),
            version: "1.20.1".into(),
        }
    }

    #[test]
    fn login_checks_password() {
        let ok = LoginFormPayload {
            password: "secret".into(),
        };
        assert!(login(&ok, "secret").is_ok());
        assert_eq!(login(&ok, "other"), Err(ServiceError::Unauthorized));
        assert_eq!(login(&ok, ""), Err(ServiceError::Unauthorized));
    }

    #[test]
    fn panel_requires_admin() {
        let store = SharedStore::new(CatalogStore::new());
        assert_eq!(
            show_panel(false, &store, "", "").unwrap_err(),
            ServiceError::Unauthorized
        );
    }

    #[test]
    fn panel_filters_each_list() {
        let repo = TestRepository::new(
            vec![sample_mod(1, "Sword", 0), sample_mod(2, "Shield", 0)],
            vec![sample_version(3, "1.20", 0)],
        );
        let store = loaded(&repo);
        let panel = show_panel(true, &store, "shi", "").unwrap();
        assert_eq!(panel.mods.len(), 1);
        assert_eq!(panel.versions.len(), 1);
        assert_eq!(panel.mods_count, 2);
    }

    #[test]
    fn creating_a_mod_starts_at_zero_downloads() {
        let repo = TestRepository::new(vec![sample_mod(1, "Sword", 9)], vec![]);
        let store = loaded(&repo);
        let guard = MutationGuard::new();

        let before = Utc::now().naive_utc();
        assert_eq!(
            submit_item(true, &repo, &store, &guard, new_mod_form()),
            Ok(true)
        );

        let created = repo
            .stored(ItemKind::Mod)
            .into_iter()
            .find(|item| item.title.as_str() == "Ice Bow")
            .unwrap();
        assert_eq!(created.downloads, 0);
        assert!(created.created_at >= before);

        let store = read_store(&store);
        assert_eq!(store.items(ItemKind::Mod)[0].title.as_str(), "Ice Bow");
    }

    #[test]
    fn editing_updates_the_stored_item() {
        let repo = TestRepository::new(vec![sample_mod(1, "Sword", 3)], vec![]);
        let store = loaded(&repo);
        let guard = MutationGuard::new();

        let mut form = new_mod_form();
        form.edit_id = Some("1".into());
        assert_eq!(submit_item(true, &repo, &store, &guard, form), Ok(true));

        let stored = &repo.stored(ItemKind::Mod)[0];
        assert_eq!(stored.title.as_str(), "Ice Bow");
        assert_eq!(stored.downloads, 3);
        assert_eq!(read_store(&store).items(ItemKind::Mod).len(), 1);
    }

    #[test]
    fn invalid_form_is_reported() {
        let repo = TestRepository::new(vec![], vec![]);
        let store = loaded(&repo);
        let mut form = new_mod_form();
        form.title = String::new();
        assert!(matches!(
            submit_item(true, &repo, &store, &MutationGuard::new(), form),
            Err(ServiceError::Form(_))
        ));
    }

    #[test]
    fn edit_form_reads_from_database() {
        let repo = TestRepository::new(vec![], vec![sample_version(5, "1.19", 0)]);
        let state = edit_form(true, &repo, "version", 5).unwrap();
        assert_eq!(state.edit_id, Some(5));
        assert_eq!(state.version, "1.19");
        assert_eq!(
            edit_form(true, &repo, "mod", 5).unwrap_err(),
            ServiceError::NotFound
        );
    }

    #[test]
    fn preview_waits_for_required_fields() {
        let mut form = new_mod_form();
        form.image_url = String::new();
        let page = preview_item(true, &form).unwrap();
        assert!(page.preview.is_none());
        assert_eq!(page.form.title, "Ice Bow");

        let page = preview_item(true, &new_mod_form()).unwrap();
        assert_eq!(page.preview.unwrap().subtitle, "Category: Weapons");
    }

    #[test]
    fn confirmed_delete_removes_item_from_panel() {
        let repo = TestRepository::new(
            vec![sample_mod(1, "Sword", 0), sample_mod(2, "Shield", 0)],
            vec![],
        );
        let store = loaded(&repo);
        let guard = MutationGuard::new();

        let payload = DeleteItemFormPayload::new(
            DeleteItemForm {
                confirm: Some("yes".into()),
            },
            "mod",
            1,
        )
        .unwrap();
        assert_eq!(delete_item(true, &repo, &store, &guard, payload), Ok(true));

        assert_eq!(repo.stored(ItemKind::Mod).len(), 1);
        let panel = show_panel(true, &store, "", "").unwrap();
        let CardList::Cards(cards) = panel.mods else {
            panic!("cards expected");
        };
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].title, "Shield");
    }
}
