//! CLI settings file.
//!
//! ```toml
//! [pager]
//! page_sizes = [5, 10, 20]
//! persist_key = "users"
//!
//! [pager.query_style]
//! kind = "offset-limit"
//! sort_fields = { birthDate = "birth_date" }
//!
//! [view]
//! date_fields = ["birthDate"]
//! sortable = ["age", "name"]
//! label_field = "gender"
//!
//! [view.labels.gender]
//! male = "Male"
//! female = "Female"
//! ```

use std::path::Path;

use pager_core::{DerivedView, LabelTable, PagerConfig};
use serde::{Deserialize, Serialize};

/// Persistence key used when the settings do not name one.
pub const DEFAULT_PERSIST_KEY: &str = "rows";

// =============================================================================
// ROOT SETTINGS
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Engine configuration.
    pub pager: PagerConfig,

    /// Client-side view options.
    pub view: ViewSettings,
}

impl Settings {
    /// Load settings from `path`, falling back to defaults when the file is
    /// missing or unreadable.
    pub fn load_from(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Settings file unreadable, using defaults"
                );
                return Self::default();
            }
        };
        match toml::from_str::<Self>(&content) {
            Ok(settings) => {
                if let Err(e) = settings.pager.validate() {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Pager settings will be adjusted"
                    );
                }
                settings
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Settings file malformed, using defaults"
                );
                Self::default()
            }
        }
    }

    /// Pager configuration with the CLI's persistence key filled in.
    pub fn pager_config(&self) -> PagerConfig {
        let mut config = self.pager.clone();
        if config.persist_key().is_none() {
            config.persist_key = Some(DEFAULT_PERSIST_KEY.to_owned());
        }
        config
    }
}

// =============================================================================
// VIEW SETTINGS
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewSettings {
    /// Fields compared as dates when sorting client-side.
    pub date_fields: Vec<String>,

    /// Fields the rows source can sort by itself.
    pub sortable: Vec<String>,

    /// Field displayed (and sorted) through `labels`.
    pub label_field: Option<String>,

    /// Display labels per field and raw value.
    pub labels: LabelTable,
}

impl ViewSettings {
    pub fn derived_view(&self) -> DerivedView<'_> {
        let mut view = self
            .date_fields
            .iter()
            .fold(DerivedView::new(), |view, field| view.with_date_field(field.clone()));
        if let Some(field) = &self.label_field {
            view = view.with_labels(field.clone(), &self.labels);
        }
        view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pager_core::{QueryStyle, Translate};
    use std::io::Write;

    #[test]
    fn parses_full_settings() {
        let raw = r#"
            [pager]
            page_sizes = [10, 25]
            persist_key = "users"

            [pager.query_style]
            kind = "offset-limit"
            sort_fields = { birthDate = "birth_date" }

            [view]
            date_fields = ["birthDate"]
            sortable = ["age"]
            label_field = "gender"

            [view.labels.gender]
            male = "Male"
        "#;
        let settings: Settings = toml::from_str(raw).unwrap();
        assert_eq!(settings.pager.page_sizes, vec![10, 25]);
        assert_eq!(settings.pager.page_sizes().default_size(), 25);
        assert_eq!(
            settings.pager.query_style,
            QueryStyle::offset_limit([("birthDate", "birth_date")])
        );
        assert_eq!(settings.view.labels.translate("gender", "male"), "Male");
        assert_eq!(settings.view.labels.translate("gender", "other"), "other");
    }

    #[test]
    fn missing_file_uses_defaults() {
        let settings = Settings::load_from(Path::new("/nonexistent/pager.toml"));
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.pager_config().persist_key(), Some(DEFAULT_PERSIST_KEY));
    }

    #[test]
    fn malformed_file_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[pager\npage_sizes = 3").unwrap();
        assert_eq!(Settings::load_from(file.path()), Settings::default());
    }
}
