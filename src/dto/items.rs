use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::domain::item::CatalogItem;
use crate::domain::types::ItemKind;

/// Description length on grid cards.
pub const CARD_DESCRIPTION_LIMIT: usize = 120;
/// Description length on admin and search rows.
pub const ROW_DESCRIPTION_LIMIT: usize = 80;
/// Swapped in by the browser when an item image fails to load.
pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/400x200?text=No+Image";

static YOUTUBE_ID: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^.*(youtu.be/|v/|u/\w/|embed/|watch\?v=|&v=)([^#&?]*).*")
        .map_err(|e| log::error!("Failed to compile YouTube id pattern: {e}"))
        .ok()
});

/// Cut `text` to at most `limit` characters, appending `...` only when
/// something was removed.
pub fn truncate_description(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}

/// Extract the 11 character video id from a YouTube link.
pub fn extract_youtube_id(url: &str) -> Option<String> {
    let captures = YOUTUBE_ID.as_ref()?.captures(url)?;
    let id = captures.get(2)?.as_str();
    (id.chars().count() == 11).then(|| id.to_string())
}

/// CSS class used for the kind badge.
pub fn kind_class(kind: ItemKind) -> &'static str {
    match kind {
        ItemKind::Mod => "mod-type",
        ItemKind::Version => "version-type",
    }
}

/// Where a card is rendered. Decides how much of the description is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardLayout {
    Grid,
    AdminRow,
    SearchRow,
}

impl CardLayout {
    pub const fn description_limit(self) -> usize {
        match self {
            Self::Grid => CARD_DESCRIPTION_LIMIT,
            Self::AdminRow | Self::SearchRow => ROW_DESCRIPTION_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ItemCardDto {
    pub id: i32,
    pub kind: &'static str,
    pub kind_label: &'static str,
    pub kind_class: &'static str,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub fallback_image: &'static str,
    pub created_at: String,
    pub downloads: i32,
    pub category: Option<String>,
    pub version: Option<String>,
    pub detail_url: String,
    pub download_url: String,
    pub edit_url: String,
    pub delete_url: String,
}

impl ItemCardDto {
    pub fn new(item: &CatalogItem, layout: CardLayout) -> Self {
        let kind = item.kind();
        let base = format!("/items/{}/{}", kind.as_str(), item.id);
        let admin_base = format!("/admin{base}");
        Self {
            id: item.id.get(),
            kind: kind.as_str(),
            kind_label: kind.label(),
            kind_class: kind_class(kind),
            title: item.title.as_str().to_string(),
            description: truncate_description(item.description.as_str(), layout.description_limit()),
            image_url: item.image_url.as_str().to_string(),
            fallback_image: PLACEHOLDER_IMAGE,
            created_at: item.created_at.format("%Y-%m-%d").to_string(),
            downloads: item.downloads.get(),
            category: item.category().map(|c| c.as_str().to_string()),
            version: item.version().map(|v| v.as_str().to_string()),
            download_url: format!("{base}/download"),
            edit_url: format!("{admin_base}/edit"),
            delete_url: format!("{admin_base}/delete"),
            detail_url: base,
        }
    }
}

/// A rendered collection: either the "nothing here" placeholder or one card
/// per item in input order.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "state", content = "cards", rename_all = "snake_case")]
pub enum CardList {
    Empty,
    Cards(Vec<ItemCardDto>),
}

impl CardList {
    pub fn len(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Cards(cards) => cards.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

pub fn render_cards<'a, I>(items: I, layout: CardLayout) -> CardList
where
    I: IntoIterator<Item = &'a CatalogItem>,
{
    let cards: Vec<ItemCardDto> = items
        .into_iter()
        .map(|item| ItemCardDto::new(item, layout))
        .collect();
    if cards.is_empty() {
        CardList::Empty
    } else {
        CardList::Cards(cards)
    }
}

/// Search results fragment: a preview of the first matches plus the number
/// of remaining ones.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchResultsDto {
    pub query: String,
    pub total: usize,
    pub items: CardList,
    pub more: usize,
}

impl SearchResultsDto {
    pub fn new(query: &str, found: &[&CatalogItem], preview_limit: usize) -> Self {
        let shown = found.len().min(preview_limit);
        Self {
            query: query.trim().to_string(),
            total: found.len(),
            items: render_cards(found[..shown].iter().copied(), CardLayout::SearchRow),
            more: found.len() - shown,
        }
    }
}

/// Everything the detail page shows about one item.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ItemDetailView {
    pub card: ItemCardDto,
    pub description_lines: Vec<String>,
    /// Only set when the item was downloaded at least once.
    pub downloads: Option<i32>,
    pub video_url: Option<String>,
    pub youtube_id: Option<String>,
    pub direct_download_url: String,
}

impl From<&CatalogItem> for ItemDetailView {
    fn from(item: &CatalogItem) -> Self {
        let video_url = item.video_url.as_ref().map(|v| v.as_str().to_string());
        Self {
            card: ItemCardDto::new(item, CardLayout::Grid),
            description_lines: item
                .description
                .as_str()
                .lines()
                .map(str::to_string)
                .collect(),
            downloads: Some(item.downloads.get()).filter(|d| *d > 0),
            youtube_id: video_url.as_deref().and_then(extract_youtube_id),
            video_url,
            direct_download_url: item.download_url.as_str().to_string(),
        }
    }
}

/// Rendering of an unsaved form.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PreviewView {
    pub kind: &'static str,
    pub kind_label: &'static str,
    pub title: String,
    pub description_lines: Vec<String>,
    pub image_url: String,
    pub fallback_image: &'static str,
    /// "Category: ..." for mods, "Version: ..." for versions.
    pub subtitle: String,
}

impl PreviewView {
    /// Returns `None` until title, description and image URL are all filled in.
    pub fn new(
        kind: ItemKind,
        title: &str,
        description: &str,
        image_url: &str,
        category: &str,
        version: &str,
    ) -> Option<Self> {
        let (title, description, image_url) = (title.trim(), description.trim(), image_url.trim());
        if title.is_empty() || description.is_empty() || image_url.is_empty() {
            return None;
        }

        let subtitle = match kind {
            ItemKind::Mod => format!("Category: {}", category.trim()),
            ItemKind::Version => format!("Version: {}", version.trim()),
        };

        Some(Self {
            kind: kind.as_str(),
            kind_label: kind.label(),
            title: title.to_string(),
            description_lines: description.lines().map(str::to_string).collect(),
            image_url: image_url.to_string(),
            fallback_image: PLACEHOLDER_IMAGE,
            subtitle,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::VideoUrl;
    use crate::repository::test::{sample_mod, sample_version};

    #[test]
    fn short_descriptions_are_untouched() {
        assert_eq!(truncate_description("short", 120), "short");
        let exact = "a".repeat(80);
        assert_eq!(truncate_description(&exact, 80), exact);
    }

    #[test]
    fn long_descriptions_are_cut_on_characters() {
        let text = "é".repeat(130);
        let cut = truncate_description(&text, 120);
        assert_eq!(cut.chars().count(), 123);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn extracts_youtube_ids() {
        assert_eq!(
            extract_youtube_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            extract_youtube_id("https://youtu.be/dQw4w9WgXcQ?t=10").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            extract_youtube_id("https://www.youtube.com/embed/dQw4w9WgXcQ").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(extract_youtube_id("https://youtu.be/short"), None);
        assert_eq!(extract_youtube_id("https://example.com/video.mp4"), None);
    }

    #[test]
    fn empty_input_renders_placeholder() {
        let list = render_cards(&Vec::<CatalogItem>::new(), CardLayout::Grid);
        assert_eq!(list, CardList::Empty);
        assert_eq!(
            serde_json::to_value(&list).unwrap(),
            serde_json::json!({"state": "empty"})
        );
    }

    #[test]
    fn cards_follow_input_order_and_kind() {
        let items = vec![sample_mod(2, "Sword", 0), sample_version(1, "1.20", 3)];
        let CardList::Cards(cards) = render_cards(&items, CardLayout::Grid) else {
            panic!("cards expected");
        };
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].kind, "mod");
        assert_eq!(cards[0].kind_class, "mod-type");
        assert_eq!(cards[0].detail_url, "/items/mod/2");
        assert_eq!(cards[0].download_url, "/items/mod/2/download");
        assert_eq!(cards[1].kind_label, "Game version");
        assert_eq!(cards[1].category, None);
        assert_eq!(cards[1].edit_url, "/admin/items/version/1/edit");
        assert_eq!(cards[0].image_url, "https://example.com/images/mod.png");
        assert_eq!(cards[0].fallback_image, PLACEHOLDER_IMAGE);
    }

    #[test]
    fn search_preview_counts_remaining_results() {
        let items: Vec<CatalogItem> = (1..=7).map(|i| sample_mod(i, "Mod", 0)).collect();
        let found: Vec<&CatalogItem> = items.iter().collect();
        let results = SearchResultsDto::new(" mod ", &found, 5);
        assert_eq!(results.total, 7);
        assert_eq!(results.items.len(), 5);
        assert_eq!(results.more, 2);
        assert_eq!(results.query, "mod");
    }

    #[test]
    fn detail_hides_zero_downloads_and_parses_video() {
        let mut item = sample_mod(1, "Sword", 0);
        item.video_url = Some(VideoUrl::new("https://www.youtube.com/watch?v=dQw4w9WgXcQ").unwrap());
        let view = ItemDetailView::from(&item);
        assert_eq!(view.downloads, None);
        assert_eq!(view.youtube_id.as_deref(), Some("dQw4w9WgXcQ"));

        let view = ItemDetailView::from(&sample_version(2, "1.20", 42));
        assert_eq!(view.downloads, Some(42));
        assert_eq!(view.video_url, None);
    }

    #[test]
    fn preview_requires_core_fields() {
        assert!(PreviewView::new(ItemKind::Mod, "Sword", "", "https://x.io/a.png", "", "").is_none());
        let preview = PreviewView::new(
            ItemKind::Version,
            "Bedrock",
            "Line one\nLine two",
            "https://example.com/a.png",
            "",
            "1.20.1",
        )
        .unwrap();
        assert_eq!(preview.subtitle, "Version: 1.20.1");
        assert_eq!(preview.fallback_image, PLACEHOLDER_IMAGE);
        assert_eq!(preview.description_lines.len(), 2);
    }
}
