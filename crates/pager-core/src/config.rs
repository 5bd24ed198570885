//! Pager configuration.
//!
//! `PagerConfig` is plain serde data so hosts can embed it in their own
//! settings files. It is checked with [`PagerConfig::validate`]; the engine
//! itself never fails on a bad config and falls back to the standard sizes.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::query::QueryStyle;

/// Page sizes offered when nothing else is configured.
pub const STANDARD_PAGE_SIZES: [usize; 3] = [5, 10, 20];

/// Page size used when the allowed set gives no better choice.
pub const FALLBACK_PAGE_SIZE: usize = 10;

/// Configuration for one paged view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagerConfig {
    /// Allowed page sizes. Any other size is replaced by the default.
    pub page_sizes: Vec<usize>,

    /// Size used when none is requested or the requested one is not allowed.
    ///
    /// When unset, the second allowed size is used, then the first.
    pub default_page_size: Option<usize>,

    /// Page shown when neither the URL nor storage say otherwise.
    pub initial_page: usize,

    /// Key under which state is persisted. Blank disables persistence.
    pub persist_key: Option<String>,

    /// Whether the address bar mirrors the view state.
    pub url_sync: bool,

    /// Query parameter convention used in the address bar.
    pub query_style: QueryStyle,
}

impl Default for PagerConfig {
    fn default() -> Self {
        Self {
            page_sizes: STANDARD_PAGE_SIZES.to_vec(),
            default_page_size: None,
            initial_page: 1,
            persist_key: None,
            url_sync: true,
            query_style: QueryStyle::default(),
        }
    }
}

impl PagerConfig {
    /// Check the configuration for values the engine would have to replace.
    pub fn validate(&self) -> Result<(), ConfigError> {
        PageSizes::new(self.page_sizes.clone(), self.default_page_size).map(|_| ())
    }

    /// Allowed sizes, falling back to the standard set when misconfigured.
    pub fn page_sizes(&self) -> PageSizes {
        match PageSizes::new(self.page_sizes.clone(), self.default_page_size) {
            Ok(sizes) => sizes,
            Err(e) => {
                tracing::warn!(error = %e, "Invalid page size configuration, using standard sizes");
                PageSizes::standard()
            }
        }
    }

    /// Trimmed persistence key, if persistence is enabled.
    pub fn persist_key(&self) -> Option<&str> {
        self.persist_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    /// Initial page index, never below 1.
    pub fn initial_page(&self) -> usize {
        self.initial_page.max(1)
    }
}

/// Validated set of allowed page sizes with a default member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSizes {
    allowed: Vec<usize>,
    default: usize,
}

impl PageSizes {
    pub fn new(allowed: Vec<usize>, default: Option<usize>) -> Result<Self, ConfigError> {
        if allowed.is_empty() {
            return Err(ConfigError::EmptyPageSizes);
        }
        if allowed.contains(&0) {
            return Err(ConfigError::ZeroPageSize);
        }
        let default = match default {
            Some(size) if allowed.contains(&size) => size,
            Some(size) => return Err(ConfigError::DefaultNotAllowed { size, allowed }),
            None => allowed.get(1).or(allowed.first()).copied().unwrap_or(FALLBACK_PAGE_SIZE),
        };
        Ok(Self { allowed, default })
    }

    /// `[5, 10, 20]` with 10 as the default.
    pub fn standard() -> Self {
        Self {
            allowed: STANDARD_PAGE_SIZES.to_vec(),
            default: FALLBACK_PAGE_SIZE,
        }
    }

    pub fn allowed(&self) -> &[usize] {
        &self.allowed
    }

    pub fn default_size(&self) -> usize {
        self.default
    }

    #[inline]
    pub fn contains(&self, size: usize) -> bool {
        self.allowed.contains(&size)
    }

    /// `size` if allowed, the default otherwise.
    pub fn normalize(&self, size: usize) -> usize {
        if self.contains(size) {
            size
        } else {
            tracing::debug!(size, default = self.default, "Rejected page size");
            self.default
        }
    }
}

impl Default for PageSizes {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_size_prefers_second_entry() {
        let sizes = PageSizes::new(vec![5, 10, 20], None).unwrap();
        assert_eq!(sizes.default_size(), 10);

        let single = PageSizes::new(vec![25], None).unwrap();
        assert_eq!(single.default_size(), 25);
    }

    #[test]
    fn rejects_bad_sets() {
        assert_eq!(PageSizes::new(vec![], None), Err(ConfigError::EmptyPageSizes));
        assert_eq!(PageSizes::new(vec![0, 10], None), Err(ConfigError::ZeroPageSize));
        assert!(matches!(
            PageSizes::new(vec![5, 10], Some(50)),
            Err(ConfigError::DefaultNotAllowed { size: 50, .. })
        ));
    }

    #[test]
    fn normalize_substitutes_default() {
        let sizes = PageSizes::standard();
        assert_eq!(sizes.normalize(20), 20);
        assert_eq!(sizes.normalize(7), 10);
    }

    #[test]
    fn misconfigured_sizes_fall_back_to_standard() {
        let config = PagerConfig {
            page_sizes: vec![],
            ..PagerConfig::default()
        };
        assert!(config.validate().is_err());
        assert_eq!(config.page_sizes(), PageSizes::standard());
    }

    #[test]
    fn blank_persist_key_disables_persistence() {
        let mut config = PagerConfig {
            persist_key: Some("  ".into()),
            ..PagerConfig::default()
        };
        assert_eq!(config.persist_key(), None);
        config.persist_key = Some(" users ".into());
        assert_eq!(config.persist_key(), Some("users"));
    }
}
