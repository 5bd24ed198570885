//! The paged view: store, synchronizer, fetch orchestrator and clamp guard
//! wired together.
//!
//! The view never performs I/O against the page source itself. Every
//! operation that may need fresh data returns a [`PendingFetch`]; the host
//! runs it (possibly concurrently with others) and hands the outcome back to
//! [`PagedView::complete`]. Hosts that run fetches one at a time can use
//! [`PagedView::settle`] instead.

use crate::clamp::{clamp_page, max_page_index};
use crate::config::PagerConfig;
use crate::derived::{DerivedView, Row};
use crate::error::FetchError;
use crate::fetch::{FetchOrchestrator, PageSource, PendingFetch};
use crate::model::{
    FetchResult, FilterState, PageState, PagerState, ParamSnapshot, SortOrder, SortState,
};
use crate::navigation::Navigation;
use crate::query::QueryParamView;
use crate::storage::{KeyValueStore, StorageAdapter};
use crate::store::PagerStore;
use crate::sync::{SeedSource, ViewSynchronizer};

/// A mounted list view.
#[derive(Debug)]
pub struct PagedView<R, N, S> {
    defaults: PagerState,
    seed_source: SeedSource,
    store: PagerStore,
    sync: ViewSynchronizer<N, S>,
    fetch: FetchOrchestrator<R>,
}

impl<R, N, S> PagedView<R, N, S>
where
    N: Navigation,
    S: KeyValueStore,
{
    /// Seed the state and issue the initial fetch.
    pub fn mount(config: &PagerConfig, navigation: N, store: S) -> (Self, Option<PendingFetch>) {
        let sizes = config.page_sizes();
        let defaults = PagerState {
            page: PageState {
                page_index: config.initial_page(),
                page_size: sizes.default_size(),
            },
            ..PagerState::default()
        };
        let storage = StorageAdapter::new(store, config.persist_key());
        let mut sync = ViewSynchronizer::new(
            navigation,
            storage,
            config.query_style.clone(),
            config.url_sync,
        );
        let (seeded, seed_source) = sync.seed(&sizes, &defaults);
        tracing::debug!(source = ?seed_source, "Mounting paged view");

        let mut view = Self {
            defaults,
            seed_source,
            store: PagerStore::new(sizes, seeded),
            sync,
            fetch: FetchOrchestrator::new(),
        };
        let pending = view.commit();
        (view, pending)
    }

    // =========================================================================
    // MUTATIONS
    // =========================================================================

    pub fn set_page(&mut self, index: usize) -> Option<PendingFetch> {
        self.store.set_page(index).then(|| self.commit()).flatten()
    }

    /// Change the page size. A real change returns to page 1.
    pub fn set_page_size(&mut self, size: usize) -> Option<PendingFetch> {
        self.store.set_page_size(size).then(|| self.commit()).flatten()
    }

    /// Change page and size together, as a pagination widget reports them.
    pub fn set_pagination(
        &mut self,
        index: Option<usize>,
        size: Option<usize>,
    ) -> Option<PendingFetch> {
        self.store
            .set_pagination(index, size)
            .then(|| self.commit())
            .flatten()
    }

    pub fn set_sort(&mut self, key: Option<String>, order: SortOrder) -> Option<PendingFetch> {
        self.store.set_sort(key, order).then(|| self.commit()).flatten()
    }

    pub fn set_filter(&mut self, filter: FilterState) -> Option<PendingFetch> {
        self.store.set_filter(filter).then(|| self.commit()).flatten()
    }

    /// Apply a navigation the user made (back, forward, a followed link).
    pub fn navigated(&mut self, params: &QueryParamView) -> Option<PendingFetch> {
        let next = self.sync.inbound(
            params,
            self.store.sizes(),
            self.store.state(),
            &self.defaults,
        )?;
        self.store.restore(next).then(|| self.commit()).flatten()
    }

    /// Drop the persisted state. The current view is left as it is.
    pub fn forget(&mut self) {
        self.sync.forget();
    }

    /// Hand back the outcome of `pending`.
    ///
    /// A superseded outcome is ignored. An applied one may move the page
    /// back into range, which issues a follow-up fetch.
    pub fn complete(
        &mut self,
        pending: &PendingFetch,
        outcome: Result<FetchResult<R>, FetchError>,
    ) -> Option<PendingFetch> {
        if !self.fetch.complete(pending, outcome) {
            return None;
        }
        let moved = clamp_page(&mut self.store, self.fetch.total(), self.fetch.is_loading());
        moved.then(|| self.commit()).flatten()
    }

    /// Run `pending` and every follow-up it causes, one at a time.
    pub async fn settle<P>(&mut self, source: &P, mut pending: Option<PendingFetch>)
    where
        P: PageSource<R>,
    {
        while let Some(ticket) = pending.take() {
            let outcome = ticket.run(source).await;
            pending = self.complete(&ticket, outcome);
        }
    }

    /// Propagate the current state outward: storage, address bar, fetch.
    fn commit(&mut self) -> Option<PendingFetch> {
        let state = self.store.state();
        self.sync.persist(state);
        self.sync.push_url(state);
        self.fetch.begin(self.store.snapshot())
    }

    // =========================================================================
    // READ ACCESS
    // =========================================================================

    pub fn is_loading(&self) -> bool {
        self.fetch.is_loading()
    }

    pub fn total(&self) -> usize {
        self.fetch.total()
    }

    pub fn items(&self) -> &[R] {
        self.fetch.items()
    }

    pub fn page(&self) -> PageState {
        self.store.page()
    }

    pub fn sort(&self) -> &SortState {
        self.store.sort()
    }

    pub fn filter(&self) -> &FilterState {
        self.store.filter()
    }

    pub fn state(&self) -> &PagerState {
        self.store.state()
    }

    pub fn snapshot(&self) -> ParamSnapshot {
        self.store.snapshot()
    }

    /// Number of pages for the last settled total, at least 1.
    pub fn page_count(&self) -> usize {
        max_page_index(self.fetch.total(), self.store.page().page_size)
    }

    pub fn seed_source(&self) -> SeedSource {
        self.seed_source
    }

    pub fn allowed_page_sizes(&self) -> &[usize] {
        self.store.sizes().allowed()
    }

    pub fn navigation(&self) -> &N {
        self.sync.navigation()
    }

    pub fn navigation_mut(&mut self) -> &mut N {
        self.sync.navigation_mut()
    }

    pub fn storage(&self) -> &StorageAdapter<S> {
        self.sync.storage()
    }

    /// Current page after client-side filtering and sorting.
    pub fn visible_rows(&self, derived: &DerivedView<'_>) -> Vec<&R>
    where
        R: Row,
    {
        derived.apply(self.fetch.items(), self.store.filter(), self.store.sort())
    }
}
