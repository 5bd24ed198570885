//! Property tests for the store, the clamp guard and the query encodings.

use pager_core::{
    FilterEntry, FilterState, PageSizes, PageState, PagerState, PagerStore, QueryStyle, SortOrder,
    SortState, clamp_page, clamped_page_index, max_page_index,
};
use proptest::prelude::*;

fn sort_order() -> impl Strategy<Value = SortOrder> {
    prop_oneof![
        Just(SortOrder::Ascending),
        Just(SortOrder::Descending),
        Just(SortOrder::Unsorted),
    ]
}

fn pager_state() -> impl Strategy<Value = PagerState> {
    (
        1usize..500,
        prop::sample::select(vec![5usize, 10, 20]),
        prop::option::of("[a-z]{1,8}"),
        sort_order(),
        prop::collection::btree_map(
            "[a-z]{1,6}",
            prop::collection::btree_set("[a-z0-9]{1,6}", 1..4),
            0..3,
        ),
    )
        .prop_map(|(page_index, page_size, key, order, filters)| PagerState {
            page: PageState {
                page_index,
                page_size,
            },
            sort: SortState { key, order },
            filter: filters
                .into_iter()
                .map(|(key, values)| FilterEntry::new(key, values))
                .collect(),
        })
}

proptest! {
    #[test]
    fn clamped_page_is_always_in_range(
        page in 1usize..1000,
        size in 1usize..100,
        total in 0usize..10_000,
    ) {
        let max = max_page_index(total, size);
        match clamped_page_index(page, size, total) {
            Some(next) => {
                prop_assert!(next >= 1);
                prop_assert!(next <= max);
                prop_assert!(next < page);
            }
            None => prop_assert!(page <= max),
        }
    }

    #[test]
    fn store_never_holds_page_zero(
        pages in prop::collection::vec(0usize..50, 1..20),
        sizes in prop::collection::vec(0usize..30, 0..5),
    ) {
        let mut store = PagerStore::new(PageSizes::standard(), PagerState::default());
        for page in pages {
            store.set_page(page);
            prop_assert!(store.page().page_index >= 1);
        }
        for size in sizes {
            store.set_page_size(size);
            prop_assert!(PageSizes::standard().contains(store.page().page_size));
        }
    }

    #[test]
    fn clamp_is_idle_while_loading(page in 1usize..100, total in 0usize..1000) {
        let mut store = PagerStore::new(
            PageSizes::standard(),
            PagerState {
                page: PageState {
                    page_index: page,
                    page_size: 10,
                },
                ..PagerState::default()
            },
        );
        prop_assert!(!clamp_page(&mut store, total, true));
        prop_assert_eq!(store.page().page_index, page);
    }

    #[test]
    fn page_size_query_round_trips(state in pager_state()) {
        let style = QueryStyle::PageSize;
        let params = style.encode(&state);
        let decoded = style.decode(&params, &PageSizes::standard(), &PagerState::default());
        prop_assert_eq!(decoded, state);
    }

    #[test]
    fn filter_equality_ignores_entry_order(
        mut entries in prop::collection::vec(
            ("[a-z]{1,4}", prop::collection::btree_set("[a-z]{1,4}", 0..3)),
            0..5,
        ),
    ) {
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries.dedup_by(|a, b| a.0 == b.0);
        let forward: FilterState = entries
            .iter()
            .map(|(key, values)| FilterEntry::new(key.clone(), values.clone()))
            .collect();
        let backward: FilterState = entries
            .iter()
            .rev()
            .map(|(key, values)| FilterEntry::new(key.clone(), values.clone()))
            .collect();
        prop_assert_eq!(forward, backward);
    }
}
