use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::item::{
    CatalogItem, CatalogItemChanges, DEFAULT_MOD_CATEGORY, ItemDetails, NewCatalogItem,
};
use crate::domain::types::{
    CategoryName, DownloadUrl, GameVersion, ImageUrl, ItemDescription, ItemId, ItemKind,
    ItemTitle, TypeConstraintError, VideoUrl,
};

/// Suggestions offered by the category field.
pub const MOD_CATEGORIES: [&str; 6] = ["Weapons", "Tools", "Blocks", "Mobs", "Maps", "Other"];

fn optional_text(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Whether the form creates a new item or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(ItemId),
}

/// Raw create/edit form as submitted by the browser.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ItemForm {
    #[validate(length(min = 1))]
    pub kind: String,
    /// Empty for a new item, the item id when editing.
    #[serde(default)]
    pub edit_id: Option<String>,
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub description: String,
    #[validate(url)]
    pub image_url: String,
    #[serde(default)]
    pub video_url: String,
    #[validate(url)]
    pub download_url: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub version: String,
}

impl ItemForm {
    pub fn mode(&self) -> Result<FormMode, TypeConstraintError> {
        match self.edit_id.as_deref().and_then(optional_text) {
            None => Ok(FormMode::Create),
            Some(raw) => {
                let id = raw.parse::<i32>().map_err(|_| {
                    TypeConstraintError::InvalidValue(format!("item id: {raw}"))
                })?;
                Ok(FormMode::Edit(ItemId::new(id)?))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemFormPayload {
    pub mode: FormMode,
    pub title: ItemTitle,
    pub description: ItemDescription,
    pub image_url: ImageUrl,
    pub video_url: Option<VideoUrl>,
    pub download_url: DownloadUrl,
    pub details: ItemDetails,
}

impl ItemFormPayload {
    pub fn kind(&self) -> ItemKind {
        self.details.kind()
    }

    /// New rows start with zero downloads and `created_at == updated_at`.
    pub fn into_new_item(self, now: NaiveDateTime) -> NewCatalogItem {
        NewCatalogItem {
            title: self.title,
            description: self.description,
            image_url: self.image_url,
            video_url: self.video_url,
            download_url: self.download_url,
            details: self.details,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn into_changes(self, now: NaiveDateTime) -> CatalogItemChanges {
        CatalogItemChanges {
            title: self.title,
            description: self.description,
            image_url: self.image_url,
            video_url: self.video_url,
            download_url: self.download_url,
            details: self.details,
            updated_at: now,
        }
    }
}

#[derive(Debug, Error)]
pub enum ItemFormError {
    #[error("Item form validation failed: {0}")]
    Validation(String),
    #[error("Item form contains invalid data: {0}")]
    TypeConstraint(String),
}

impl From<ValidationErrors> for ItemFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for ItemFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

impl TryFrom<ItemForm> for ItemFormPayload {
    type Error = ItemFormError;

    fn try_from(value: ItemForm) -> Result<Self, Self::Error> {
        value.validate()?;
        let mode = value.mode()?;
        let kind = ItemKind::try_from(value.kind.as_str())?;

        let details = match kind {
            ItemKind::Mod => ItemDetails::Mod {
                category: CategoryName::new(value.category)?,
                version: optional_text(&value.version)
                    .map(GameVersion::new)
                    .transpose()?,
            },
            ItemKind::Version => ItemDetails::Version {
                version: GameVersion::new(value.version)?,
            },
        };

        Ok(Self {
            mode,
            title: ItemTitle::new(value.title)?,
            description: ItemDescription::new(value.description)?,
            image_url: ImageUrl::new(value.image_url)?,
            video_url: optional_text(&value.video_url)
                .map(VideoUrl::new)
                .transpose()?,
            download_url: DownloadUrl::new(value.download_url)?,
            details,
        })
    }
}

/// Values used to render the create/edit form.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ItemFormState {
    pub kind: &'static str,
    pub kind_label: &'static str,
    pub edit_id: Option<i32>,
    pub heading: String,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub video_url: String,
    pub download_url: String,
    pub category: String,
    pub version: String,
    pub categories: Vec<&'static str>,
}

impl ItemFormState {
    fn blank(kind: ItemKind, edit_id: Option<i32>) -> Self {
        let heading = match (edit_id, kind) {
            (None, ItemKind::Mod) => "Add new mod".to_string(),
            (None, ItemKind::Version) => "Add new version".to_string(),
            (Some(_), kind) => format!("Edit {}", kind.label().to_lowercase()),
        };
        Self {
            kind: kind.as_str(),
            kind_label: kind.label(),
            edit_id,
            heading,
            title: String::new(),
            description: String::new(),
            image_url: String::new(),
            video_url: String::new(),
            download_url: String::new(),
            category: match kind {
                ItemKind::Mod => DEFAULT_MOD_CATEGORY.to_string(),
                ItemKind::Version => String::new(),
            },
            version: String::new(),
            categories: MOD_CATEGORIES.to_vec(),
        }
    }

    /// Empty form in create mode.
    pub fn create(kind: ItemKind) -> Self {
        Self::blank(kind, None)
    }

    /// Form populated from a stored item, in edit mode.
    pub fn edit(item: &CatalogItem) -> Self {
        let mut state = Self::blank(item.kind(), Some(item.id.get()));
        state.title = item.title.as_str().to_string();
        state.description = item.description.as_str().to_string();
        state.image_url = item.image_url.as_str().to_string();
        state.video_url = item
            .video_url
            .as_ref()
            .map(|v| v.as_str().to_string())
            .unwrap_or_default();
        state.download_url = item.download_url.as_str().to_string();
        if let Some(category) = item.category() {
            state.category = category.as_str().to_string();
        }
        state.version = item
            .version()
            .map(|v| v.as_str().to_string())
            .unwrap_or_default();
        state
    }

    /// Echo a submitted form back, e.g. next to its preview.
    pub fn from_form(form: &ItemForm) -> Result<Self, TypeConstraintError> {
        let kind = ItemKind::try_from(form.kind.as_str())?;
        let edit_id = match form.mode()? {
            FormMode::Create => None,
            FormMode::Edit(id) => Some(id.get()),
        };
        let mut state = Self::blank(kind, edit_id);
        state.title = form.title.clone();
        state.description = form.description.clone();
        state.image_url = form.image_url.clone();
        state.video_url = form.video_url.clone();
        state.download_url = form.download_url.clone();
        if kind == ItemKind::Mod && !form.category.trim().is_empty() {
            state.category = form.category.clone();
        }
        state.version = form.version.clone();
        Ok(state)
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginForm {
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoginFormPayload {
    pub password: String,
}

#[derive(Debug, Error)]
pub enum LoginFormError {
    #[error("Login form validation failed: {0}")]
    Validation(String),
}

impl From<ValidationErrors> for LoginFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl TryFrom<LoginForm> for LoginFormPayload {
    type Error = LoginFormError;

    fn try_from(value: LoginForm) -> Result<Self, Self::Error> {
        value.validate()?;
        Ok(Self {
            password: value.password,
        })
    }
}

/// Confirmation form posted from the delete page.
#[derive(Debug, Default, Deserialize)]
pub struct DeleteItemForm {
    #[serde(default)]
    pub confirm: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteItemFormPayload {
    pub kind: ItemKind,
    pub id: ItemId,
}

#[derive(Debug, Error)]
pub enum DeleteItemFormError {
    #[error("Deletion was not confirmed")]
    NotConfirmed,
    #[error("Delete form contains invalid data: {0}")]
    TypeConstraint(String),
}

impl From<TypeConstraintError> for DeleteItemFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

impl DeleteItemFormPayload {
    /// Accepts the form only when `confirm=yes` was submitted.
    pub fn new(form: DeleteItemForm, kind: &str, id: i32) -> Result<Self, DeleteItemFormError> {
        if form.confirm.as_deref().map(str::trim) != Some("yes") {
            return Err(DeleteItemFormError::NotConfirmed);
        }
        Ok(Self {
            kind: ItemKind::try_from(kind)?,
            id: ItemId::new(id)?,
        })
    }
}

/// `?q=` on the public search endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Filters of the two admin lists.
#[derive(Debug, Default, Deserialize)]
pub struct AdminFilterQuery {
    #[serde(default)]
    pub mods_q: String,
    #[serde(default)]
    pub versions_q: String,
}

/// `?kind=` on the create form.
#[derive(Debug, Deserialize)]
pub struct NewItemQuery {
    pub kind: String,
}
