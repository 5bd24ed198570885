//! Address-bar access.
//!
//! The host reports the current query parameters and accepts in-place
//! replacements (no new history entry). Navigations the user makes (back,
//! forward, deep links) are delivered to the view by the host through
//! `PagedView::navigated`.

use crate::query::QueryParamView;

/// Query-parameter access for the current location.
pub trait Navigation {
    /// Current query parameters, or `None` when there is no address bar.
    fn current_params(&self) -> Option<QueryParamView>;

    /// Replace the current entry's query parameters without adding history.
    fn replace_params(&mut self, params: &QueryParamView);
}

/// In-memory location with a history stack.
///
/// `replace_params` rewrites the top entry; `navigate` pushes a new one the
/// way a link click or a typed URL would.
#[derive(Debug, Clone)]
pub struct MemoryNavigation {
    history: Vec<QueryParamView>,
    replacements: usize,
}

impl MemoryNavigation {
    pub fn new(initial: QueryParamView) -> Self {
        Self {
            history: vec![initial],
            replacements: 0,
        }
    }

    /// Location parsed from a query string such as `?page=2&size=10`.
    pub fn from_query(query: &str) -> Self {
        Self::new(QueryParamView::parse(query))
    }

    /// Current top-of-history parameters.
    pub fn current(&self) -> &QueryParamView {
        // History is never empty: `back` keeps the first entry.
        &self.history[self.history.len() - 1]
    }

    /// Number of in-place replacements performed so far.
    pub fn replacements(&self) -> usize {
        self.replacements
    }

    /// Number of history entries.
    pub fn depth(&self) -> usize {
        self.history.len()
    }

    /// Push a new entry and return it for delivery to the view.
    pub fn navigate(&mut self, params: QueryParamView) -> QueryParamView {
        self.history.push(params.clone());
        params
    }

    /// Pop the top entry and return the one now current, if there was one to go back to.
    pub fn back(&mut self) -> Option<QueryParamView> {
        if self.history.len() < 2 {
            return None;
        }
        self.history.pop();
        Some(self.current().clone())
    }
}

impl Default for MemoryNavigation {
    fn default() -> Self {
        Self::new(QueryParamView::new())
    }
}

impl Navigation for MemoryNavigation {
    fn current_params(&self) -> Option<QueryParamView> {
        Some(self.current().clone())
    }

    fn replace_params(&mut self, params: &QueryParamView) {
        let last = self.history.len() - 1;
        self.history[last] = params.clone();
        self.replacements += 1;
    }
}

/// No address bar: reads nothing, ignores writes.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetachedNavigation;

impl Navigation for DetachedNavigation {
    fn current_params(&self) -> Option<QueryParamView> {
        None
    }

    fn replace_params(&mut self, _params: &QueryParamView) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_rewrites_top_entry_only() {
        let mut nav = MemoryNavigation::from_query("?page=1");
        nav.navigate(QueryParamView::parse("page=2"));
        nav.replace_params(&QueryParamView::parse("page=3"));

        assert_eq!(nav.depth(), 2);
        assert_eq!(nav.replacements(), 1);
        assert_eq!(nav.current().get("page"), Some("3"));

        let previous = nav.back().unwrap();
        assert_eq!(previous.get("page"), Some("1"));
        assert_eq!(nav.back(), None);
    }

    #[test]
    fn detached_has_no_params() {
        let mut nav = DetachedNavigation;
        nav.replace_params(&QueryParamView::parse("page=2"));
        assert_eq!(nav.current_params(), None);
    }
}
