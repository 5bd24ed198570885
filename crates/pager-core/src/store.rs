//! Pagination, sort and filter store.
//!
//! Every mutator compares against the current value first and reports
//! whether anything changed. An unchanged store produces no snapshot change,
//! which is what keeps the URL, storage and fetch reactions from looping.

use crate::config::PageSizes;
use crate::model::{FilterState, PageState, PagerState, ParamSnapshot, SortOrder, SortState};

/// Owner of the canonical [`PagerState`].
#[derive(Debug, Clone)]
pub struct PagerStore {
    sizes: PageSizes,
    state: PagerState,
}

impl PagerStore {
    /// Create a store from an initial state, normalizing it first.
    pub fn new(sizes: PageSizes, initial: PagerState) -> Self {
        let mut store = Self {
            sizes,
            state: PagerState::default(),
        };
        store.state = store.normalized(initial);
        store
    }

    pub fn sizes(&self) -> &PageSizes {
        &self.sizes
    }

    pub fn state(&self) -> &PagerState {
        &self.state
    }

    pub fn page(&self) -> PageState {
        self.state.page
    }

    pub fn sort(&self) -> &SortState {
        &self.state.sort
    }

    pub fn filter(&self) -> &FilterState {
        &self.state.filter
    }

    /// Parameter snapshot for the current state.
    pub fn snapshot(&self) -> ParamSnapshot {
        ParamSnapshot::from_state(&self.state)
    }

    /// Move to `index` (clamped to at least 1).
    pub fn set_page(&mut self, index: usize) -> bool {
        let index = index.max(1);
        if index == self.state.page.page_index {
            return false;
        }
        self.state.page.page_index = index;
        true
    }

    /// Change the page size. A real change resets the page to 1.
    pub fn set_page_size(&mut self, size: usize) -> bool {
        let size = self.sizes.normalize(size);
        if size == self.state.page.page_size {
            return false;
        }
        self.state.page = PageState {
            page_index: 1,
            page_size: size,
        };
        true
    }

    /// Combined page/size update.
    ///
    /// Missing values keep their current value. When the size changes and no
    /// page was given, the page resets to 1; an explicit page is always kept.
    pub fn set_pagination(&mut self, index: Option<usize>, size: Option<usize>) -> bool {
        let current = self.state.page;
        let next_size = size.map_or(current.page_size, |s| self.sizes.normalize(s));
        let next_index = index.map_or(current.page_index, |i| i.max(1));
        if next_index == current.page_index && next_size == current.page_size {
            return false;
        }
        let page_index = if next_size != current.page_size && index.is_none() {
            1
        } else {
            next_index
        };
        self.state.page = PageState {
            page_index,
            page_size: next_size,
        };
        true
    }

    /// Replace the sort if the key or order differs.
    pub fn set_sort(&mut self, key: Option<String>, order: SortOrder) -> bool {
        if self.state.sort.key == key && self.state.sort.order == order {
            return false;
        }
        self.state.sort = SortState { key, order };
        true
    }

    /// Replace all filters if they differ (order-insensitive).
    pub fn set_filter(&mut self, filter: FilterState) -> bool {
        if self.state.filter == filter {
            return false;
        }
        self.state.filter = filter;
        true
    }

    /// Replace the whole state, taking page and size as given.
    ///
    /// Used when restoring from the address bar or storage.
    pub fn restore(&mut self, state: PagerState) -> bool {
        let state = self.normalized(state);
        if state == self.state {
            return false;
        }
        self.state = state;
        true
    }

    fn normalized(&self, mut state: PagerState) -> PagerState {
        state.page.page_index = state.page.page_index.max(1);
        state.page.page_size = self.sizes.normalize(state.page.page_size);
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FilterEntry;

    fn store_at(page_index: usize, page_size: usize) -> PagerStore {
        PagerStore::new(
            PageSizes::standard(),
            PagerState {
                page: PageState {
                    page_index,
                    page_size,
                },
                ..PagerState::default()
            },
        )
    }

    #[test]
    fn set_page_is_noop_on_equal() {
        let mut store = store_at(2, 10);
        assert!(!store.set_page(2));
        assert!(store.set_page(3));
        assert_eq!(store.page().page_index, 3);
    }

    #[test]
    fn set_page_never_goes_below_one() {
        let mut store = store_at(2, 10);
        assert!(store.set_page(0));
        assert_eq!(store.page().page_index, 1);
    }

    #[test]
    fn size_change_resets_page() {
        let mut store = store_at(3, 10);
        assert!(store.set_page_size(20));
        assert_eq!(
            store.page(),
            PageState {
                page_index: 1,
                page_size: 20
            }
        );
        assert!(!store.set_page_size(20));
    }

    #[test]
    fn unknown_size_becomes_default() {
        let mut store = store_at(3, 20);
        assert!(store.set_page_size(33));
        assert_eq!(store.page().page_size, 10);
        assert_eq!(store.page().page_index, 1);
    }

    #[test]
    fn set_pagination_resets_only_without_explicit_page() {
        let mut store = store_at(3, 10);
        assert!(store.set_pagination(None, Some(20)));
        assert_eq!(store.page().page_index, 1);

        let mut store = store_at(3, 10);
        assert!(store.set_pagination(Some(3), Some(20)));
        assert_eq!(
            store.page(),
            PageState {
                page_index: 3,
                page_size: 20
            }
        );

        assert!(!store.set_pagination(Some(3), Some(20)));
        assert!(!store.set_pagination(None, None));
    }

    #[test]
    fn sort_and_filter_compare_first() {
        let mut store = store_at(1, 10);
        assert!(store.set_sort(Some("age".into()), SortOrder::Descending));
        assert!(!store.set_sort(Some("age".into()), SortOrder::Descending));
        assert!(store.set_sort(Some("age".into()), SortOrder::Ascending));

        let filter = FilterState::new(vec![FilterEntry::new("gender", ["female"])]);
        assert!(store.set_filter(filter.clone()));
        assert!(!store.set_filter(filter));
    }

    #[test]
    fn new_normalizes_initial_state() {
        let store = store_at(0, 999);
        assert_eq!(
            store.page(),
            PageState {
                page_index: 1,
                page_size: 10
            }
        );
    }
}
