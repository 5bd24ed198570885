//! Persisted pager state.
//!
//! [`KeyValueStore`] is the capability the host provides (browser storage,
//! a file, memory). [`StorageAdapter`] sits on top of it, namespaces the key
//! and turns every failure into "nothing stored" on read and a logged no-op
//! on write.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::PageSizes;
use crate::error::{StorageError, StorageResult};
use crate::model::{FilterEntry, FilterState, PageState, PagerState, SortOrder, SortState};
use crate::util::best_effort;

/// Namespace prepended to every persisted key.
pub const KEY_PREFIX: &str = "pager:";

// =============================================================================
// KEY-VALUE CAPABILITY
// =============================================================================

/// String key-value persistence.
pub trait KeyValueStore {
    /// Whether the store exists in this context at all.
    fn is_available(&self) -> bool {
        true
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()>;

    fn remove(&mut self, key: &str) -> StorageResult<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        (**self).remove(key)
    }
}

/// In-memory store. Can be told to reject writes to simulate a full quota.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
    reject_writes: bool,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// A store whose writes all fail.
    #[must_use]
    pub fn rejecting(mut self) -> Self {
        self.reject_writes = true;
        self
    }

    /// Number of accepted writes so far.
    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        if self.reject_writes {
            return Err(StorageError::Rejected {
                key: key.to_owned(),
            });
        }
        self.entries.insert(key.to_owned(), value.to_owned());
        self.writes += 1;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Store for contexts without persistence (server rendering, tests).
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStore;

impl KeyValueStore for NullStore {
    fn is_available(&self) -> bool {
        false
    }

    fn get(&self, _key: &str) -> StorageResult<Option<String>> {
        Ok(None)
    }

    fn set(&mut self, _key: &str, _value: &str) -> StorageResult<()> {
        Err(StorageError::Unavailable)
    }

    fn remove(&mut self, _key: &str) -> StorageResult<()> {
        Err(StorageError::Unavailable)
    }
}

/// Store backed by a single JSON object file.
///
/// Values that are JSON objects or arrays are stored inline so the file
/// stays readable; anything else is stored as a JSON string. Writes go
/// through a temp file and a rename, and replace a corrupt document.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> StorageResult<Map<String, Value>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(source) => {
                return Err(StorageError::Io {
                    operation: "read",
                    path: self.path.clone(),
                    source,
                });
            }
        };
        if content.trim().is_empty() {
            return Ok(Map::new());
        }
        serde_json::from_str(&content).map_err(|source| StorageError::Serialization { source })
    }

    /// Like `load`, but a corrupt document reads as empty so the next
    /// write replaces it.
    fn load_for_write(&self) -> StorageResult<Map<String, Value>> {
        match self.load() {
            Err(StorageError::Serialization { source }) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %source,
                    "Replacing corrupt pager state file"
                );
                Ok(Map::new())
            }
            other => other,
        }
    }

    fn save(&self, document: &Map<String, Value>) -> StorageResult<()> {
        let bytes = serde_json::to_vec_pretty(document)
            .map_err(|source| StorageError::Serialization { source })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StorageError::Io {
                operation: "create directory",
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let temp_path = self.path.with_extension("json.tmp");
        let mut file = File::create(&temp_path).map_err(|source| StorageError::Io {
            operation: "create",
            path: temp_path.clone(),
            source,
        })?;
        file.write_all(&bytes).map_err(|source| StorageError::Io {
            operation: "write",
            path: temp_path.clone(),
            source,
        })?;
        file.sync_all().map_err(|source| StorageError::Io {
            operation: "sync",
            path: temp_path.clone(),
            source,
        })?;

        fs::rename(&temp_path, &self.path).map_err(|source| StorageError::Io {
            operation: "rename",
            path: self.path.clone(),
            source,
        })
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.load()?.get(key).map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }))
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        let mut document = self.load_for_write()?;
        let stored = match serde_json::from_str::<Value>(value) {
            Ok(inline @ (Value::Object(_) | Value::Array(_))) => inline,
            _ => Value::String(value.to_owned()),
        };
        document.insert(key.to_owned(), stored);
        self.save(&document)
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        let mut document = self.load_for_write()?;
        if document.remove(key).is_some() {
            self.save(&document)?;
        }
        Ok(())
    }
}

// =============================================================================
// PERSISTED SNAPSHOT
// =============================================================================

/// Serialized subset of the pager state.
///
/// Written as `{page, size, sortField?, sortOrder?, filter?}`. Reading is
/// field-by-field: an invalid field is dropped without discarding the rest.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filter: Vec<PersistedFilter>,
}

/// One persisted column filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersistedFilter {
    pub key: String,
    pub value: Vec<String>,
}

impl PersistedSnapshot {
    pub fn from_state(state: &PagerState) -> Self {
        Self {
            page: Some(state.page.page_index),
            size: Some(state.page.page_size),
            sort_field: state.sort.key.clone(),
            sort_order: match state.sort.order {
                SortOrder::Ascending => Some("ascend"),
                SortOrder::Descending => Some("descend"),
                SortOrder::Unsorted => None,
            },
            filter: state
                .filter
                .entries()
                .iter()
                .map(|entry| PersistedFilter {
                    key: entry.key.clone(),
                    value: entry.values.iter().cloned().collect(),
                })
                .collect(),
        }
    }

    /// Parse leniently. Returns `None` only when `raw` is not a JSON object.
    pub fn from_json(raw: &str) -> Option<Self> {
        let value: Value = serde_json::from_str(raw).ok()?;
        let object = value.as_object()?;
        Some(Self {
            page: object.get("page").and_then(lenient_positive),
            size: object.get("size").and_then(lenient_positive),
            sort_field: object
                .get("sortField")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_owned),
            sort_order: match object.get("sortOrder").and_then(Value::as_str) {
                Some("ascend") => Some("ascend"),
                Some("descend") => Some("descend"),
                _ => None,
            },
            filter: object
                .get("filter")
                .and_then(Value::as_array)
                .map(|entries| entries.iter().filter_map(lenient_filter).collect())
                .unwrap_or_default(),
        })
    }

    pub fn to_json(&self) -> StorageResult<String> {
        serde_json::to_string(self).map_err(|source| StorageError::Serialization { source })
    }

    /// Rebuild pager state, filling gaps from `defaults`.
    pub fn to_state(&self, sizes: &PageSizes, defaults: &PagerState) -> PagerState {
        PagerState {
            page: PageState {
                page_index: self.page.unwrap_or(defaults.page.page_index),
                page_size: self
                    .size
                    .filter(|size| sizes.contains(*size))
                    .unwrap_or(defaults.page.page_size),
            },
            sort: SortState {
                key: self.sort_field.clone(),
                order: match self.sort_order {
                    Some("ascend") => SortOrder::Ascending,
                    Some("descend") => SortOrder::Descending,
                    _ => SortOrder::Unsorted,
                },
            },
            filter: self
                .filter
                .iter()
                .map(|f| FilterEntry::new(f.key.as_str(), f.value.iter().map(String::as_str)))
                .collect::<FilterState>(),
        }
    }
}

fn lenient_positive(value: &Value) -> Option<usize> {
    let n = match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f > 0.0)
                .map(|f| f as u64)
        })?,
        Value::String(s) => s.trim().parse::<u64>().ok()?,
        _ => return None,
    };
    usize::try_from(n).ok().filter(|n| *n > 0)
}

fn lenient_filter(value: &Value) -> Option<PersistedFilter> {
    let object = value.as_object()?;
    let key = object.get("key")?.as_str().filter(|k| !k.is_empty())?;
    let value = match object.get("value")? {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_owned)
            .collect(),
        Value::String(single) => vec![single.clone()],
        _ => return None,
    };
    Some(PersistedFilter {
        key: key.to_owned(),
        value,
    })
}

// =============================================================================
// ADAPTER
// =============================================================================

/// Guarded access to the persisted snapshot under `pager:<persist_key>`.
///
/// Never fails: unreadable state reads as `None`, failed writes are logged.
#[derive(Debug, Clone)]
pub struct StorageAdapter<S> {
    store: S,
    key: Option<String>,
}

impl<S: KeyValueStore> StorageAdapter<S> {
    /// `persist_key` of `None` disables reads and writes.
    pub fn new(store: S, persist_key: Option<&str>) -> Self {
        Self {
            store,
            key: persist_key.map(|key| format!("{KEY_PREFIX}{key}")),
        }
    }

    /// Namespaced key, if persistence is enabled.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn active_key(&self) -> Option<&str> {
        self.key
            .as_deref()
            .filter(|_| self.store.is_available())
    }

    pub fn read(&self) -> Option<PersistedSnapshot> {
        let key = self.active_key()?;
        let raw = match self.store.get(key) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::debug!(key, error = %e, "Persisted pager state unreadable");
                return None;
            }
        };
        let snapshot = PersistedSnapshot::from_json(&raw);
        if snapshot.is_none() {
            tracing::debug!(key, "Ignoring malformed persisted pager state");
        }
        snapshot
    }

    pub fn write(&mut self, snapshot: &PersistedSnapshot) {
        let Some(key) = self.active_key().map(str::to_owned) else {
            return;
        };
        match snapshot.to_json() {
            Ok(json) => best_effort!(self.store.set(&key, &json), "persisting pager state"),
            Err(e) => tracing::warn!(error = %e, "Could not encode pager state"),
        }
    }

    pub fn clear(&mut self) {
        let Some(key) = self.active_key().map(str::to_owned) else {
            return;
        };
        best_effort!(self.store.remove(&key), "clearing pager state");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn lenient_read_keeps_valid_fields() {
        let snapshot = PersistedSnapshot::from_json(
            r#"{"page":"3","size":"abc","sortOrder":"sideways","filter":[{"key":"gender","value":"female"},{"value":["x"]}]}"#,
        )
        .unwrap();
        assert_eq!(snapshot.page, Some(3));
        assert_eq!(snapshot.size, None);
        assert_eq!(snapshot.sort_order, None);
        assert_eq!(
            snapshot.filter,
            vec![PersistedFilter {
                key: "gender".into(),
                value: vec!["female".into()],
            }]
        );
    }

    #[test]
    fn malformed_json_reads_as_absent() {
        assert_eq!(PersistedSnapshot::from_json("{not json"), None);
        assert_eq!(PersistedSnapshot::from_json("[1,2]"), None);
        assert_eq!(
            PersistedSnapshot::from_json(r#"{"page":0,"size":-5}"#),
            Some(PersistedSnapshot::default())
        );
    }

    #[test]
    fn adapter_namespaces_key() {
        let mut adapter = StorageAdapter::new(MemoryStore::new(), Some("users"));
        assert_eq!(adapter.key(), Some("pager:users"));

        let state = PagerState::default();
        adapter.write(&PersistedSnapshot::from_state(&state));
        assert_eq!(
            adapter.store().raw("pager:users"),
            Some(r#"{"page":1,"size":10}"#)
        );
        assert_eq!(
            adapter.read().map(|s| s.to_state(&PageSizes::standard(), &state)),
            Some(state)
        );
    }

    #[test]
    fn rejected_writes_are_swallowed() {
        let mut adapter = StorageAdapter::new(MemoryStore::new().rejecting(), Some("users"));
        adapter.write(&PersistedSnapshot::from_state(&PagerState::default()));
        assert_eq!(adapter.read(), None);
    }

    #[test]
    fn unavailable_store_is_skipped() {
        let mut adapter = StorageAdapter::new(NullStore, Some("users"));
        adapter.write(&PersistedSnapshot::default());
        adapter.clear();
        assert_eq!(adapter.read(), None);
    }

    #[test]
    fn disabled_key_never_touches_store() {
        let mut adapter = StorageAdapter::new(MemoryStore::new(), None);
        adapter.write(&PersistedSnapshot::from_state(&PagerState::default()));
        assert_eq!(adapter.store().writes(), 0);
    }

    #[test]
    fn json_file_store_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state").join("pager.json");
        let mut store = JsonFileStore::new(&path);

        assert_eq!(store.get("pager:users").unwrap(), None);
        store.set("pager:users", r#"{"page":2,"size":5}"#).unwrap();
        store.set("note", "plain text").unwrap();

        assert_eq!(
            store.get("pager:users").unwrap().as_deref(),
            Some(r#"{"page":2,"size":5}"#)
        );
        assert_eq!(store.get("note").unwrap().as_deref(), Some("plain text"));

        store.remove("pager:users").unwrap();
        assert_eq!(store.get("pager:users").unwrap(), None);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn json_file_store_reports_corrupt_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pager.json");
        fs::write(&path, "{{{").unwrap();
        let store = JsonFileStore::new(&path);
        assert!(matches!(
            store.get("pager:users"),
            Err(StorageError::Serialization { .. })
        ));

        let mut adapter = StorageAdapter::new(store, Some("users"));
        assert_eq!(adapter.read(), None);

        let state = PagerState {
            page: PageState {
                page_index: 4,
                page_size: 10,
            },
            ..PagerState::default()
        };
        adapter.write(&PersistedSnapshot::from_state(&state));
        assert_eq!(
            adapter.read().map(|s| s.to_state(&PageSizes::standard(), &PagerState::default())),
            Some(state)
        );
    }

    #[test]
    fn json_file_store_returns_scalars_verbatim() {
        let dir = tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path().join("pager.json"));

        store.set("quoted", "\"quoted\"").unwrap();
        store.set("number", "1e2").unwrap();
        store.set("flag", "true").unwrap();

        assert_eq!(store.get("quoted").unwrap().as_deref(), Some("\"quoted\""));
        assert_eq!(store.get("number").unwrap().as_deref(), Some("1e2"));
        assert_eq!(store.get("flag").unwrap().as_deref(), Some("true"));
    }
}
