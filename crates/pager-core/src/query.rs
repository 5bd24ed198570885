//! Address-bar projection of the pager state.
//!
//! A [`QueryParamView`] is an ordered multi-map of query parameters. A
//! [`QueryStyle`] decides which parameter names carry pager state and how
//! they are written and read back. Anything that does not parse falls back
//! to the caller's defaults.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::config::PageSizes;
use crate::model::{FilterEntry, FilterState, PageState, PagerState, SortOrder, SortState};

/// Prefix of per-column filter parameters in the `page-size` style.
const FILTER_PREFIX: &str = "f.";

// =============================================================================
// QUERY PARAM VIEW
// =============================================================================

/// Ordered query parameters, allowing repeated names.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryParamView(Vec<(String, String)>);

impl QueryParamView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a query string, with or without the leading `?`.
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self(form_urlencoded::parse(query.as_bytes()).into_owned().collect())
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl ToString) {
        self.0.push((name.into(), value.to_string()));
    }

    /// First value for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Every value for `name`, in order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Serialize as an `application/x-www-form-urlencoded` string.
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.0.iter())
            .finish()
    }
}

impl fmt::Display for QueryParamView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

// =============================================================================
// QUERY STYLE
// =============================================================================

/// Query parameter convention for pager state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum QueryStyle {
    /// `page`, `size`, `sort`, `order` (`ascend`/`descend`) and `f.<key>`.
    #[default]
    PageSize,

    /// `limit`, `skip`, `sortBy`, `order` (`asc`/`desc`), `key` and `value`.
    ///
    /// Sort keys go through `sort_fields` (view field to source field);
    /// sorts without a mapping stay out of the address bar.
    OffsetLimit {
        #[serde(default)]
        sort_fields: BTreeMap<String, String>,
    },
}

impl QueryStyle {
    /// Offset/limit style with the given view-to-source sort field map.
    pub fn offset_limit<I, K, V>(sort_fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::OffsetLimit {
            sort_fields: sort_fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Whether `name` carries pager state in this style.
    pub fn recognizes(&self, name: &str) -> bool {
        match self {
            Self::PageSize => {
                matches!(name, "page" | "size" | "sort" | "order")
                    || name.starts_with(FILTER_PREFIX)
            }
            Self::OffsetLimit { .. } => {
                matches!(name, "limit" | "skip" | "sortBy" | "order" | "key" | "value")
            }
        }
    }

    /// Whether `params` carries any pager state at all.
    pub fn has_state(&self, params: &QueryParamView) -> bool {
        params
            .pairs()
            .iter()
            .any(|(name, value)| self.recognizes(name) && !value.is_empty())
    }

    /// Project `state` onto query parameters.
    pub fn encode(&self, state: &PagerState) -> QueryParamView {
        let mut view = QueryParamView::new();
        match self {
            Self::PageSize => {
                view.push("page", state.page.page_index);
                view.push("size", state.page.page_size);
                if let Some(key) = &state.sort.key {
                    view.push("sort", key);
                }
                match state.sort.order {
                    SortOrder::Ascending => view.push("order", "ascend"),
                    SortOrder::Descending => view.push("order", "descend"),
                    SortOrder::Unsorted => {}
                }
                for entry in state.filter.entries() {
                    for value in &entry.values {
                        view.push(format!("{FILTER_PREFIX}{}", entry.key), value);
                    }
                }
            }
            Self::OffsetLimit { sort_fields } => {
                view.push("limit", state.page.page_size);
                view.push("skip", state.page.skip());
                if let Some((key, order)) = state.sort.active()
                    && let Some(source_key) = sort_fields.get(key)
                {
                    view.push("sortBy", source_key);
                    view.push(
                        "order",
                        if order == SortOrder::Ascending {
                            "asc"
                        } else {
                            "desc"
                        },
                    );
                }
                if let Some(entry) = state.filter.first_active() {
                    view.push("key", &entry.key);
                    for value in &entry.values {
                        view.push("value", value);
                    }
                }
            }
        }
        view
    }

    /// Read pager state from `params`, using `defaults` for anything absent
    /// or unparseable.
    pub fn decode(
        &self,
        params: &QueryParamView,
        sizes: &PageSizes,
        defaults: &PagerState,
    ) -> PagerState {
        match self {
            Self::PageSize => {
                let page_index =
                    parse_positive(params.get("page")).unwrap_or(defaults.page.page_index);
                let page_size = parse_positive(params.get("size"))
                    .filter(|size| sizes.contains(*size))
                    .unwrap_or(defaults.page.page_size);
                let key = params
                    .get("sort")
                    .filter(|key| !key.is_empty())
                    .map(str::to_owned);
                let order = match params.get("order") {
                    Some("ascend") => SortOrder::Ascending,
                    Some("descend") => SortOrder::Descending,
                    _ => SortOrder::Unsorted,
                };
                PagerState {
                    page: PageState {
                        page_index,
                        page_size,
                    },
                    sort: SortState { key, order },
                    filter: decode_prefixed_filters(params),
                }
            }
            Self::OffsetLimit { sort_fields } => {
                let page_size = parse_positive(params.get("limit"))
                    .map_or(defaults.page.page_size, |size| sizes.normalize(size));
                let skip = params
                    .get("skip")
                    .and_then(|raw| raw.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                let key = params.get("sortBy").and_then(|source_key| {
                    sort_fields
                        .iter()
                        .find(|(_, mapped)| mapped.as_str() == source_key)
                        .map(|(view_key, _)| view_key.clone())
                });
                let order = match params.get("order") {
                    Some("asc") => SortOrder::Ascending,
                    Some("desc") => SortOrder::Descending,
                    _ => SortOrder::Unsorted,
                };
                let filter = match params.get("key").filter(|key| !key.is_empty()) {
                    Some(key) => {
                        let values: Vec<&str> =
                            params.get_all("value").filter(|v| !v.is_empty()).collect();
                        if values.is_empty() {
                            FilterState::default()
                        } else {
                            FilterState::new(vec![FilterEntry::new(key, values)])
                        }
                    }
                    None => FilterState::default(),
                };
                PagerState {
                    page: PageState {
                        page_index: skip / page_size.max(1) + 1,
                        page_size,
                    },
                    sort: SortState { key, order },
                    filter,
                }
            }
        }
    }

    /// Replace the pager parameters in `current` with those for `state`,
    /// keeping every parameter this style does not own.
    pub fn merge(&self, current: &QueryParamView, state: &PagerState) -> QueryParamView {
        let mut merged = QueryParamView::from_pairs(
            current
                .pairs()
                .iter()
                .filter(|(name, _)| !self.recognizes(name))
                .cloned(),
        );
        merged.0.extend(self.encode(state).0);
        merged
    }
}

fn parse_positive(raw: Option<&str>) -> Option<usize> {
    raw.and_then(|raw| raw.trim().parse::<usize>().ok())
        .filter(|n| *n > 0)
}

fn decode_prefixed_filters(params: &QueryParamView) -> FilterState {
    let mut entries: Vec<FilterEntry> = Vec::new();
    for (name, value) in params.pairs() {
        let Some(key) = name.strip_prefix(FILTER_PREFIX) else {
            continue;
        };
        if key.is_empty() || value.is_empty() {
            continue;
        }
        match entries.iter_mut().find(|entry| entry.key == key) {
            Some(entry) => {
                entry.values.insert(value.clone());
            }
            None => entries.push(FilterEntry::new(key, [value.as_str()])),
        }
    }
    FilterState::new(entries)
}
