//! JSON rows file standing in for the remote data source.

use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use pager_core::{DerivedView, FetchError, FetchResult, PageRequest, PageSource, Row};
use serde_json::Value;

/// Serves pages out of an in-memory list of JSON objects.
///
/// Sorting happens here only for `sortable` fields and filtering only for
/// single-value filters. Everything else is left for the client side.
#[derive(Debug, Clone, Default)]
pub struct JsonRowsSource {
    rows: Vec<Value>,
    sortable: BTreeSet<String>,
    latency: Duration,
}

impl JsonRowsSource {
    pub fn new(rows: Vec<Value>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    /// Read rows from a file holding an array of objects, or an object with
    /// an `items` array.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read rows file {}", path.display()))?;
        let document: Value = serde_json::from_str(&content)
            .with_context(|| format!("rows file {} is not valid JSON", path.display()))?;
        let rows = match document {
            Value::Array(rows) => rows,
            Value::Object(mut object) => match object.remove("items") {
                Some(Value::Array(rows)) => rows,
                _ => bail!("rows file {} has no `items` array", path.display()),
            },
            _ => bail!("rows file {} must hold an array of objects", path.display()),
        };
        tracing::debug!(rows = rows.len(), path = %path.display(), "Loaded rows");
        Ok(Self::new(rows))
    }

    #[must_use]
    pub fn with_sortable<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sortable = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Simulated round-trip delay per request.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn query(&self, request: &PageRequest) -> Result<FetchResult<Value>, FetchError> {
        if request.limit == 0 {
            return Err(FetchError::Rejected {
                reason: "limit must be positive".to_owned(),
            });
        }

        let mut matched: Vec<&Value> = self
            .rows
            .iter()
            .filter(|row| {
                request
                    .filters
                    .iter()
                    .filter(|entry| entry.values.len() == 1)
                    .all(|entry| {
                        row.field(&entry.key)
                            .is_some_and(|value| entry.values.contains(&value.to_string()))
                    })
            })
            .collect();

        if let Some((key, order)) = request.active_sort()
            && self.sortable.contains(key)
        {
            let plain = DerivedView::new();
            matched.sort_by(|a, b| plain.compare(*a, *b, key, order));
        }

        let total = matched.len();
        let items = matched
            .into_iter()
            .skip(request.skip)
            .take(request.limit)
            .cloned()
            .collect();
        Ok(FetchResult::new(items, total))
    }
}

impl PageSource<Value> for JsonRowsSource {
    async fn fetch_page(&self, request: PageRequest) -> Result<FetchResult<Value>, FetchError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let result = self.query(&request);
        if let Ok(page) = &result {
            tracing::debug!(
                skip = request.skip,
                limit = request.limit,
                returned = page.items.len(),
                total = page.total,
                "Served page"
            );
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pager_core::{FilterEntry, SortOrder};
    use serde_json::json;

    fn request(skip: usize, limit: usize) -> PageRequest {
        PageRequest {
            skip,
            limit,
            sort_key: None,
            sort_order: SortOrder::Unsorted,
            filters: Vec::new(),
        }
    }

    fn people() -> JsonRowsSource {
        JsonRowsSource::new(vec![
            json!({"name": "Ana", "age": 31, "gender": "female"}),
            json!({"name": "Bo", "age": 25, "gender": "male"}),
            json!({"name": "Cy", "age": 40, "gender": "male"}),
        ])
    }

    #[test]
    fn pages_and_totals() {
        let page = people().query(&request(2, 2)).unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.items, vec![json!({"name": "Cy", "age": 40, "gender": "male"})]);
    }

    #[test]
    fn sorts_only_sortable_fields() {
        let mut sorted = request(0, 3);
        sorted.sort_key = Some("age".into());
        sorted.sort_order = SortOrder::Descending;

        let page = people().with_sortable(["age"]).query(&sorted).unwrap();
        assert_eq!(page.items[0]["name"], "Cy");

        let page = people().query(&sorted).unwrap();
        assert_eq!(page.items[0]["name"], "Ana");
    }

    #[test]
    fn filters_single_values_only() {
        let mut filtered = request(0, 10);
        filtered.filters = vec![FilterEntry::new("gender", ["male"])];
        assert_eq!(people().query(&filtered).unwrap().total, 2);

        filtered.filters = vec![FilterEntry::new("gender", ["male", "female"])];
        assert_eq!(people().query(&filtered).unwrap().total, 3);
    }

    #[test]
    fn zero_limit_is_rejected() {
        assert!(matches!(
            people().query(&request(0, 0)),
            Err(FetchError::Rejected { .. })
        ));
    }
}
