//! Case-insensitive substring search over catalog items.

use crate::domain::item::CatalogItem;

/// Result of a public search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome<'a> {
    /// The query was empty, so the results panel stays hidden.
    Hidden,
    /// Matching items in their original order. May be empty.
    Results(Vec<&'a CatalogItem>),
}

/// Trim and lowercase a raw query. Returns `None` for an empty query.
pub fn normalize_query(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Whether `needle` (already normalized) occurs in the title, description,
/// category or version of `item`.
pub fn matches(item: &CatalogItem, needle: &str) -> bool {
    let contains = |value: &str| value.to_lowercase().contains(needle);

    contains(item.title.as_str())
        || contains(item.description.as_str())
        || item.category().is_some_and(|c| contains(c.as_str()))
        || item.version().is_some_and(|v| contains(v.as_str()))
}

/// Filter for the public search box.
pub fn filter_items<'a, I>(query: &str, items: I) -> SearchOutcome<'a>
where
    I: IntoIterator<Item = &'a CatalogItem>,
{
    match normalize_query(query) {
        None => SearchOutcome::Hidden,
        Some(needle) => SearchOutcome::Results(
            items
                .into_iter()
                .filter(|item| matches(item, &needle))
                .collect(),
        ),
    }
}

/// Filter for the admin lists, where an empty query keeps every item.
///
/// The query is trimmed like the public one, so a whitespace-only filter
/// shows the whole list.
pub fn filter_admin<'a>(query: &str, items: &'a [CatalogItem]) -> Vec<&'a CatalogItem> {
    match normalize_query(query) {
        None => items.iter().collect(),
        Some(needle) => items.iter().filter(|item| matches(item, &needle)).collect(),
    }
}
