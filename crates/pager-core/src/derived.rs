//! Client-side filtering and sorting over the fetched page.
//!
//! Used when the remote source cannot apply every filter or sort itself. The
//! transform only reorders and drops rows of the current page: the total
//! stays what the source reported, and nothing here triggers a fetch.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::{FilterState, SortOrder, SortState};

// =============================================================================
// ROW ACCESS
// =============================================================================

/// Comparable value of one row field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Number(f64),
    Text(String),
    Bool(bool),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// Field access for rows the engine does not otherwise understand.
pub trait Row {
    /// Value at `key`, or `None` when missing or null.
    fn field(&self, key: &str) -> Option<FieldValue>;
}

impl Row for Map<String, Value> {
    fn field(&self, key: &str) -> Option<FieldValue> {
        match self.get(key)? {
            Value::Null => None,
            Value::Bool(b) => Some(FieldValue::Bool(*b)),
            Value::Number(n) => n.as_f64().map(FieldValue::Number),
            Value::String(s) => Some(FieldValue::Text(s.clone())),
            other => Some(FieldValue::Text(other.to_string())),
        }
    }
}

impl Row for Value {
    fn field(&self, key: &str) -> Option<FieldValue> {
        self.as_object()?.field(key)
    }
}

// =============================================================================
// LABEL SUBSTITUTION
// =============================================================================

/// Maps a raw field value to the label currently displayed for it.
pub trait Translate {
    fn translate(&self, field: &str, raw: &str) -> String;
}

impl<F> Translate for F
where
    F: Fn(&str, &str) -> String,
{
    fn translate(&self, field: &str, raw: &str) -> String {
        self(field, raw)
    }
}

/// Static per-field label table. Unknown values keep their raw text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelTable(BTreeMap<String, BTreeMap<String, String>>);

impl LabelTable {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_label(
        mut self,
        field: impl Into<String>,
        raw: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        self.0
            .entry(field.into())
            .or_default()
            .insert(raw.into(), label.into());
        self
    }
}

impl Translate for LabelTable {
    fn translate(&self, field: &str, raw: &str) -> String {
        self.0
            .get(field)
            .and_then(|labels| labels.get(raw))
            .cloned()
            .unwrap_or_else(|| raw.to_owned())
    }
}

// =============================================================================
// DERIVED VIEW
// =============================================================================

/// Client-side view options.
#[derive(Default)]
pub struct DerivedView<'a> {
    date_fields: BTreeSet<String>,
    labels: Option<(String, &'a dyn Translate)>,
}

impl fmt::Debug for DerivedView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedView")
            .field("date_fields", &self.date_fields)
            .field("label_field", &self.labels.as_ref().map(|(field, _)| field))
            .finish()
    }
}

impl<'a> DerivedView<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare `field` as a timestamp.
    #[must_use]
    pub fn with_date_field(mut self, field: impl Into<String>) -> Self {
        self.date_fields.insert(field.into());
        self
    }

    /// Sort `field` by its translated label instead of its raw value.
    #[must_use]
    pub fn with_labels(mut self, field: impl Into<String>, translate: &'a dyn Translate) -> Self {
        self.labels = Some((field.into(), translate));
        self
    }

    /// Filter, then sort, the rows of the current page.
    pub fn apply<'r, R: Row>(
        &self,
        rows: &'r [R],
        filter: &FilterState,
        sort: &SortState,
    ) -> Vec<&'r R> {
        let mut visible = filter_rows(rows, filter);
        if let Some((key, order)) = sort.active() {
            visible.sort_by(|a, b| self.compare(*a, *b, key, order));
        }
        visible
    }

    /// Ordering of two rows by `key`. Missing values come first when
    /// ascending; descending reverses everything, missing values included.
    pub fn compare<R: Row>(&self, a: &R, b: &R, key: &str, order: SortOrder) -> Ordering {
        let ordering = match (self.sort_value(a, key), self.sort_value(b, key)) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(a), Some(b)) => self.compare_values(key, &a, &b),
        };
        match order {
            SortOrder::Descending => ordering.reverse(),
            _ => ordering,
        }
    }

    fn sort_value<R: Row>(&self, row: &R, key: &str) -> Option<FieldValue> {
        let value = row.field(key)?;
        match &self.labels {
            Some((field, translate)) if field == key => Some(FieldValue::Text(
                translate.translate(field, &value.to_string()),
            )),
            _ => Some(value),
        }
    }

    fn compare_values(&self, key: &str, a: &FieldValue, b: &FieldValue) -> Ordering {
        if let (FieldValue::Number(a), FieldValue::Number(b)) = (a, b) {
            return a.total_cmp(b);
        }
        let (a, b) = (a.to_string(), b.to_string());
        if self.date_fields.contains(key)
            && let (Some(ta), Some(tb)) = (timestamp_millis(&a), timestamp_millis(&b))
        {
            return ta.cmp(&tb);
        }
        locale_cmp(&a, &b)
    }
}

/// Keep rows matching every filter entry. An entry with no values keeps all
/// rows; otherwise the row's value at the entry key must be one of them.
pub fn filter_rows<'r, R: Row>(rows: &'r [R], filter: &FilterState) -> Vec<&'r R> {
    rows.iter()
        .filter(|row| {
            filter.entries().iter().all(|entry| {
                entry.values.is_empty()
                    || row
                        .field(&entry.key)
                        .is_some_and(|value| entry.values.contains(&value.to_string()))
            })
        })
        .collect()
}

/// Case-insensitive ordering with lowercase before uppercase on ties.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
        .then_with(|| b.cmp(a))
}

/// Milliseconds since the epoch for RFC 3339, ISO datetime or `Y-m-d` text.
fn timestamp_millis(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp_millis());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.and_utc().timestamp_millis());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
}
