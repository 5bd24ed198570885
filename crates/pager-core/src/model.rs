//! Canonical pager state and the values derived from it.
//!
//! [`PagerState`] is the triple owned by the store (page, sort, filter).
//! [`ParamSnapshot`] is the immutable value derived from it that decides
//! what is fetched and what the address bar shows.

use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// PAGE / SORT / FILTER
// =============================================================================

/// Current page position. `page_index` is 1-based and never below 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    pub page_index: usize,
    pub page_size: usize,
}

impl PageState {
    /// Number of rows before the first row of this page.
    pub fn skip(&self) -> usize {
        self.page_index.saturating_sub(1).saturating_mul(self.page_size)
    }
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            page_index: 1,
            page_size: 10,
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortOrder {
    Ascending,
    Descending,
    #[default]
    Unsorted,
}

impl SortOrder {
    /// Whether this order actually sorts anything.
    #[inline]
    pub fn is_sorted(self) -> bool {
        !matches!(self, Self::Unsorted)
    }
}

/// Active sort column and direction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SortState {
    pub key: Option<String>,
    pub order: SortOrder,
}

impl SortState {
    pub fn new(key: impl Into<String>, order: SortOrder) -> Self {
        Self {
            key: Some(key.into()),
            order,
        }
    }

    /// The key and order when both are set, i.e. when rows should be reordered.
    pub fn active(&self) -> Option<(&str, SortOrder)> {
        match (&self.key, self.order) {
            (Some(key), order) if order.is_sorted() => Some((key.as_str(), order)),
            _ => None,
        }
    }
}

/// One column filter. An empty value set filters nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterEntry {
    pub key: String,
    pub values: BTreeSet<String>,
}

impl FilterEntry {
    pub fn new<I, V>(key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self {
            key: key.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// Ordered list of column filters.
///
/// Entry order is kept for display; equality ignores it.
#[derive(Debug, Clone, Default)]
pub struct FilterState(Vec<FilterEntry>);

impl FilterState {
    pub fn new(entries: Vec<FilterEntry>) -> Self {
        Self(entries)
    }

    pub fn entries(&self) -> &[FilterEntry] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First entry that actually restricts rows.
    pub fn first_active(&self) -> Option<&FilterEntry> {
        self.0.iter().find(|entry| !entry.values.is_empty())
    }

    /// Key-sorted view with values merged per key.
    fn normalized(&self) -> BTreeMap<&str, BTreeSet<&str>> {
        let mut map: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for entry in &self.0 {
            map.entry(entry.key.as_str())
                .or_default()
                .extend(entry.values.iter().map(String::as_str));
        }
        map
    }
}

impl PartialEq for FilterState {
    fn eq(&self, other: &Self) -> bool {
        self.normalized() == other.normalized()
    }
}

impl Eq for FilterState {}

impl FromIterator<FilterEntry> for FilterState {
    fn from_iter<T: IntoIterator<Item = FilterEntry>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Canonical state owned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PagerState {
    pub page: PageState,
    pub sort: SortState,
    pub filter: FilterState,
}

// =============================================================================
// DERIVED VALUES
// =============================================================================

/// Immutable parameter snapshot derived from [`PagerState`].
///
/// Two snapshots are equal when every field matches, with filters compared
/// independently of entry order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSnapshot {
    pub skip: usize,
    pub limit: usize,
    pub sort_key: Option<String>,
    pub sort_order: SortOrder,
    pub filters: FilterState,
}

impl ParamSnapshot {
    pub fn from_state(state: &PagerState) -> Self {
        Self {
            skip: state.page.skip(),
            limit: state.page.page_size,
            sort_key: state.sort.key.clone(),
            sort_order: state.sort.order,
            filters: state.filter.clone(),
        }
    }

    /// 1-based page index this snapshot addresses.
    pub fn page_index(&self) -> usize {
        self.skip / self.limit.max(1) + 1
    }

    /// Build the request handed to the page source.
    pub fn to_request(&self) -> PageRequest {
        PageRequest {
            skip: self.skip,
            limit: self.limit,
            sort_key: self.sort_key.clone(),
            sort_order: self.sort_order,
            filters: self.filters.entries().to_vec(),
        }
    }
}

/// Parameters a page source receives for one fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub skip: usize,
    pub limit: usize,
    pub sort_key: Option<String>,
    pub sort_order: SortOrder,
    pub filters: Vec<FilterEntry>,
}

impl PageRequest {
    /// 1-based page index this request addresses.
    pub fn page_index(&self) -> usize {
        self.skip / self.limit.max(1) + 1
    }

    /// Sort key and order when the request asks for ordering.
    pub fn active_sort(&self) -> Option<(&str, SortOrder)> {
        match (&self.sort_key, self.sort_order) {
            (Some(key), order) if order.is_sorted() => Some((key.as_str(), order)),
            _ => None,
        }
    }
}

/// One settled page from the remote source.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResult<R> {
    pub items: Vec<R>,
    pub total: usize,
}

impl<R> FetchResult<R> {
    pub fn new(items: Vec<R>, total: usize) -> Self {
        Self { items, total }
    }

    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_equality_ignores_order() {
        let a = FilterState::new(vec![
            FilterEntry::new("gender", ["female", "male"]),
            FilterEntry::new("city", ["Prague"]),
        ]);
        let b = FilterState::new(vec![
            FilterEntry::new("city", ["Prague"]),
            FilterEntry::new("gender", ["male", "female"]),
        ]);
        assert_eq!(a, b);
        assert_ne!(a, FilterState::new(vec![FilterEntry::new("city", ["Prague"])]));
    }

    #[test]
    fn snapshot_skip_and_page_index() {
        let state = PagerState {
            page: PageState {
                page_index: 3,
                page_size: 20,
            },
            ..PagerState::default()
        };
        let snapshot = ParamSnapshot::from_state(&state);
        assert_eq!(snapshot.skip, 40);
        assert_eq!(snapshot.limit, 20);
        assert_eq!(snapshot.page_index(), 3);
        assert_eq!(snapshot.to_request().page_index(), 3);
    }

    #[test]
    fn sort_active_requires_key_and_order() {
        assert_eq!(SortState::default().active(), None);
        assert_eq!(SortState::new("age", SortOrder::Unsorted).active(), None);
        assert_eq!(
            SortState::new("age", SortOrder::Descending).active(),
            Some(("age", SortOrder::Descending))
        );
    }
}
