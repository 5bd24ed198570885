//! State engine for paginated, sortable, filterable list views.
//!
//! This crate keeps four things in step for one list view: the in-memory
//! state, the address bar, persisted storage, and the remote page fetch.
//!
//! # Features
//!
//! - **URL round trips** in `page/size` or `offset/limit` style
//! - **Persistence** to any key-value store, with a JSON file store built in
//! - **Latest-request-wins** fetch handling with stale result suppression
//! - **Page clamping** once the source reports a smaller total
//! - **Client-side filter and sort** for sources that cannot do it themselves
//!
//! # Example
//!
//! ```ignore
//! use pager_core::{MemoryNavigation, MemoryStore, PagedView, PagerConfig};
//!
//! let config = PagerConfig::default();
//! let nav = MemoryNavigation::from_query("?page=2&size=10");
//! let (mut view, pending) = PagedView::mount(&config, nav, MemoryStore::new());
//! view.settle(&source, pending).await;
//!
//! let pending = view.set_page(3);
//! view.settle(&source, pending).await;
//! ```
//!
//! # Architecture
//!
//! - `store` - canonical state and its compare-before-write mutators
//! - `query` - address bar encodings
//! - `storage` - key-value stores and the persisted snapshot format
//! - `sync` - seeding and the URL and storage reactions
//! - `fetch` - generation-tagged fetches
//! - `clamp` - page index guard
//! - `derived` - client-side filter and sort
//! - `view` - everything above wired into one `PagedView`

mod clamp;
mod config;
mod derived;
mod error;
mod fetch;
mod model;
mod navigation;
mod query;
mod storage;
mod store;
mod sync;
mod util;
mod view;

// Re-export main types
pub use config::{FALLBACK_PAGE_SIZE, PageSizes, PagerConfig, STANDARD_PAGE_SIZES};
pub use error::{ConfigError, FetchError, StorageError, StorageResult};
pub use model::{
    FetchResult, FilterEntry, FilterState, PageRequest, PageState, PagerState, ParamSnapshot,
    SortOrder, SortState,
};
pub use store::PagerStore;

// Re-export address bar and storage types
pub use navigation::{DetachedNavigation, MemoryNavigation, Navigation};
pub use query::{QueryParamView, QueryStyle};
pub use storage::{
    JsonFileStore, KEY_PREFIX, KeyValueStore, MemoryStore, NullStore, PersistedFilter,
    PersistedSnapshot, StorageAdapter,
};
pub use sync::{SeedSource, ViewSynchronizer};

// Re-export fetch and view types
pub use clamp::{clamp_page, clamped_page_index, max_page_index};
pub use derived::{DerivedView, FieldValue, LabelTable, Row, Translate, filter_rows, locale_cmp};
pub use fetch::{FetchOrchestrator, PageSource, PendingFetch};
pub use view::PagedView;
