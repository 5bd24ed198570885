//! Fetch orchestration with latest-request-wins.
//!
//! Each issued fetch is tagged with a generation number. Only a completion
//! carrying the current generation may touch `items`, `total` or `loading`;
//! anything older was superseded and is dropped when it arrives. The
//! underlying request is never cancelled, only ignored.

use std::future::Future;

use crate::error::FetchError;
use crate::model::{FetchResult, PageRequest, ParamSnapshot};

/// Remote collaborator that serves one page per request.
pub trait PageSource<R> {
    fn fetch_page(
        &self,
        request: PageRequest,
    ) -> impl Future<Output = Result<FetchResult<R>, FetchError>>;
}

/// A fetch the host must run and hand back to the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFetch {
    generation: u64,
    snapshot: ParamSnapshot,
}

impl PendingFetch {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn snapshot(&self) -> &ParamSnapshot {
        &self.snapshot
    }

    /// Request to pass to the page source.
    pub fn request(&self) -> PageRequest {
        self.snapshot.to_request()
    }

    /// Run this fetch against `source`.
    pub async fn run<R, P>(&self, source: &P) -> Result<FetchResult<R>, FetchError>
    where
        P: PageSource<R>,
    {
        source.fetch_page(self.request()).await
    }
}

/// Holds the latest settled page and decides which completions count.
#[derive(Debug)]
pub struct FetchOrchestrator<R> {
    generation: u64,
    /// Snapshot of the most recently issued fetch.
    requested: Option<ParamSnapshot>,
    /// Snapshot that produced `items` and `total`.
    settled: Option<ParamSnapshot>,
    items: Vec<R>,
    total: usize,
    loading: bool,
}

impl<R> Default for FetchOrchestrator<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> FetchOrchestrator<R> {
    /// Starts out loading with an empty page, before the first fetch.
    pub fn new() -> Self {
        Self {
            generation: 0,
            requested: None,
            settled: None,
            items: Vec::new(),
            total: 0,
            loading: true,
        }
    }

    #[inline]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn items(&self) -> &[R] {
        &self.items
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Snapshot whose result is currently shown.
    pub fn settled(&self) -> Option<&ParamSnapshot> {
        self.settled.as_ref()
    }

    /// Issue a fetch for `snapshot` unless it is the one already requested.
    ///
    /// Comparing against the latest request (not only the settled one) keeps
    /// an in-flight fetch authoritative when the state bounces back to it.
    pub fn begin(&mut self, snapshot: ParamSnapshot) -> Option<PendingFetch> {
        if self.requested.as_ref() == Some(&snapshot) {
            tracing::debug!(generation = self.generation, "Snapshot unchanged, no fetch");
            return None;
        }
        self.generation += 1;
        self.loading = true;
        self.requested = Some(snapshot.clone());
        tracing::debug!(
            generation = self.generation,
            skip = snapshot.skip,
            limit = snapshot.limit,
            "Issuing page fetch"
        );
        Some(PendingFetch {
            generation: self.generation,
            snapshot,
        })
    }

    /// Apply a completion. Returns `false` when it was superseded.
    ///
    /// Failures settle as an empty page with a total of zero.
    pub fn complete(
        &mut self,
        pending: &PendingFetch,
        outcome: Result<FetchResult<R>, FetchError>,
    ) -> bool {
        if pending.generation != self.generation {
            tracing::debug!(
                stale = pending.generation,
                current = self.generation,
                "Discarding superseded fetch result"
            );
            return false;
        }
        let result = match outcome {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    generation = pending.generation,
                    "Page fetch failed, showing empty page"
                );
                FetchResult::empty()
            }
        };
        self.items = result.items;
        self.total = result.total;
        self.loading = false;
        self.settled = Some(pending.snapshot.clone());
        true
    }
}
