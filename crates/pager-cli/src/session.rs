//! One CLI invocation: mount the view, apply an action, settle, report.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use pager_core::{
    FilterEntry, FilterState, JsonFileStore, KeyValueStore, MemoryNavigation, NullStore,
    PageState, PagedView, SeedSource, SortOrder, SortState, Translate,
};
use serde_json::Value;

use crate::settings::Settings;
use crate::source::JsonRowsSource;

/// State change requested on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Show,
    Page(usize),
    Size(usize),
    Sort { key: String, order: SortOrder },
    Filter { key: String, values: Vec<String> },
    Forget,
}

/// Inputs shared by every action.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub rows: PathBuf,
    pub query: String,
    pub state: Option<PathBuf>,
    pub settings: Settings,
    pub latency: Duration,
}

/// What the view looked like once it settled.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOutcome {
    pub columns: Vec<String>,
    pub rows: Vec<Value>,
    pub page: PageState,
    pub page_count: usize,
    pub total: usize,
    pub sort: SortState,
    pub filter: FilterState,
    pub allowed_sizes: Vec<usize>,
    pub seed_source: SeedSource,
    pub query: String,
}

type CliView = PagedView<Value, MemoryNavigation, Box<dyn KeyValueStore>>;

/// Run `action` against the rows file and return the settled view.
pub async fn run_session(options: &SessionOptions, action: &Action) -> Result<SessionOutcome> {
    let source = JsonRowsSource::from_path(&options.rows)?
        .with_sortable(options.settings.view.sortable.iter().cloned())
        .with_latency(options.latency);

    let store: Box<dyn KeyValueStore> = match &options.state {
        Some(path) => Box::new(JsonFileStore::new(path)),
        None => Box::new(NullStore),
    };
    let config = options.settings.pager_config();
    let navigation = MemoryNavigation::from_query(&options.query);
    let (mut view, pending): (CliView, _) = PagedView::mount(&config, navigation, store);
    tracing::info!(source = ?view.seed_source(), "View mounted");
    view.settle(&source, pending).await;

    let pending = match action {
        Action::Show => None,
        Action::Page(index) => view.set_page(*index),
        Action::Size(size) => view.set_page_size(*size),
        Action::Sort { key, order } => {
            if order.is_sorted() {
                view.set_sort(Some(key.clone()), *order)
            } else {
                view.set_sort(None, SortOrder::Unsorted)
            }
        }
        Action::Filter { key, values } => {
            let filter = replace_filter(view.filter(), key, values);
            view.set_filter(filter)
        }
        Action::Forget => {
            view.forget();
            None
        }
    };
    view.settle(&source, pending).await;

    let derived = options.settings.view.derived_view();
    let label_field = options.settings.view.label_field.as_deref();
    let rows: Vec<Value> = view
        .visible_rows(&derived)
        .into_iter()
        .map(|row| match label_field {
            Some(field) => with_label(row, field, &options.settings.view.labels),
            None => row.clone(),
        })
        .collect();

    let outcome = SessionOutcome {
        columns: columns(&rows),
        page: view.page(),
        page_count: view.page_count(),
        total: view.total(),
        sort: view.sort().clone(),
        filter: view.filter().clone(),
        allowed_sizes: view.allowed_page_sizes().to_vec(),
        seed_source: view.seed_source(),
        query: view.navigation().current().to_query_string(),
        rows,
    };
    tracing::info!(
        page = outcome.page.page_index,
        pages = outcome.page_count,
        total = outcome.total,
        "View settled"
    );
    Ok(outcome)
}

/// `current` with the entry for `key` replaced. No values removes it.
fn replace_filter(current: &FilterState, key: &str, values: &[String]) -> FilterState {
    let mut entries: Vec<FilterEntry> = current
        .entries()
        .iter()
        .filter(|entry| entry.key != key)
        .cloned()
        .collect();
    if !values.is_empty() {
        entries.push(FilterEntry::new(key, values.iter().cloned()));
    }
    FilterState::new(entries)
}

fn with_label(row: &Value, field: &str, labels: &dyn Translate) -> Value {
    let mut row = row.clone();
    let label = row
        .get(field)
        .and_then(Value::as_str)
        .map(|raw| labels.translate(field, raw));
    if let (Some(label), Some(object)) = (label, row.as_object_mut()) {
        object.insert(field.to_owned(), Value::String(label));
    }
    row
}

fn columns(rows: &[Value]) -> Vec<String> {
    rows.iter()
        .filter_map(Value::as_object)
        .flat_map(|object| object.keys().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn replace_filter_swaps_one_key() {
        let current = FilterState::new(vec![
            FilterEntry::new("gender", ["male"]),
            FilterEntry::new("city", ["Brno"]),
        ]);
        let next = replace_filter(&current, "gender", &["female".to_owned()]);
        assert_eq!(
            next,
            FilterState::new(vec![
                FilterEntry::new("city", ["Brno"]),
                FilterEntry::new("gender", ["female"]),
            ])
        );
        let cleared = replace_filter(&next, "gender", &[]);
        assert_eq!(cleared.entries().len(), 1);
    }

    #[test]
    fn columns_are_the_sorted_union() {
        let rows = vec![json!({"b": 1, "a": 2}), json!({"c": 3})];
        assert_eq!(columns(&rows), ["a", "b", "c"]);
    }
}
