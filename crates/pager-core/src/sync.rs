//! Reconciliation between the store, the address bar and storage.
//!
//! Every direction compares before it writes: the URL is only replaced when
//! the merged parameters differ from what is already there, storage is only
//! written when the persisted snapshot changed, and inbound navigation is
//! only applied when it decodes to a different state. A round trip
//! URL → store → URL therefore stops after one hop.

use crate::config::PageSizes;
use crate::model::PagerState;
use crate::navigation::Navigation;
use crate::query::{QueryParamView, QueryStyle};
use crate::storage::{KeyValueStore, PersistedSnapshot, StorageAdapter};

/// Where the initial state came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedSource {
    Url,
    Storage,
    Defaults,
}

/// Keeps the address bar and storage in step with the store.
#[derive(Debug)]
pub struct ViewSynchronizer<N, S> {
    navigation: N,
    storage: StorageAdapter<S>,
    style: QueryStyle,
    url_sync: bool,
    /// Parameters observed at mount, consumed by the first inbound event.
    mount_echo: Option<QueryParamView>,
    last_persisted: Option<PersistedSnapshot>,
}

impl<N: Navigation, S: KeyValueStore> ViewSynchronizer<N, S> {
    pub fn new(
        navigation: N,
        storage: StorageAdapter<S>,
        style: QueryStyle,
        url_sync: bool,
    ) -> Self {
        Self {
            navigation,
            storage,
            style,
            url_sync,
            mount_echo: None,
            last_persisted: None,
        }
    }

    pub fn navigation(&self) -> &N {
        &self.navigation
    }

    pub fn navigation_mut(&mut self) -> &mut N {
        &mut self.navigation
    }

    pub fn storage(&self) -> &StorageAdapter<S> {
        &self.storage
    }

    pub fn style(&self) -> &QueryStyle {
        &self.style
    }

    /// Initial state: URL if it carries pager parameters, else storage, else
    /// `defaults`.
    pub fn seed(&mut self, sizes: &PageSizes, defaults: &PagerState) -> (PagerState, SeedSource) {
        if self.url_sync
            && let Some(params) = self.navigation.current_params()
        {
            let seeded = self
                .style
                .has_state(&params)
                .then(|| self.style.decode(&params, sizes, defaults));
            if seeded.is_some() {
                tracing::trace!(query = %params, "Seeding pager state from URL");
            }
            self.mount_echo = Some(params);
            if let Some(state) = seeded {
                return (state, SeedSource::Url);
            }
        }

        if let Some(snapshot) = self.storage.read() {
            tracing::trace!(key = ?self.storage.key(), "Seeding pager state from storage");
            let state = snapshot.to_state(sizes, defaults);
            return (state, SeedSource::Storage);
        }

        tracing::trace!("Seeding pager state from defaults");
        (defaults.clone(), SeedSource::Defaults)
    }

    /// Mirror `state` into the address bar. Returns whether the URL changed.
    pub fn push_url(&mut self, state: &PagerState) -> bool {
        if !self.url_sync {
            return false;
        }
        let Some(current) = self.navigation.current_params() else {
            return false;
        };
        let next = self.style.merge(&current, state);
        if next == current {
            return false;
        }
        tracing::debug!(query = %next, "Replacing URL query");
        self.navigation.replace_params(&next);
        true
    }

    /// Persist `state` if it differs from what was last written.
    pub fn persist(&mut self, state: &PagerState) {
        let snapshot = PersistedSnapshot::from_state(state);
        if self.last_persisted.as_ref() == Some(&snapshot) {
            return;
        }
        self.storage.write(&snapshot);
        self.last_persisted = Some(snapshot);
    }

    /// Remove the persisted state.
    pub fn forget(&mut self) {
        self.storage.clear();
        self.last_persisted = None;
    }

    /// State to apply for an inbound navigation, if it changes anything.
    ///
    /// The first event is dropped when it repeats the parameters consumed by
    /// [`seed`](Self::seed).
    pub fn inbound(
        &mut self,
        params: &QueryParamView,
        sizes: &PageSizes,
        current: &PagerState,
        defaults: &PagerState,
    ) -> Option<PagerState> {
        if !self.url_sync {
            return None;
        }
        if let Some(echo) = self.mount_echo.take()
            && echo == *params
        {
            tracing::trace!("Skipping mount-time navigation echo");
            return None;
        }
        let next = self.style.decode(params, sizes, defaults);
        if next == *current {
            return None;
        }
        tracing::debug!(query = %params, "Applying inbound navigation");
        Some(next)
    }
}
