//! Error types for the pager engine.
//!
//! None of these errors escape a store or view operation. They exist at the
//! adapter boundaries (storage, remote source, configuration) so that each
//! failure can be logged with context before it is absorbed.

use std::path::PathBuf;
use thiserror::Error;

/// Storage adapter error.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backing store does not exist in this context (no browser, no file).
    #[error("Storage is not available")]
    Unavailable,

    /// The store rejected the write (quota exceeded, read-only medium).
    #[error("Storage rejected write for key '{key}'")]
    Rejected { key: String },

    /// File I/O error.
    #[error("Failed to {operation} storage file: {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The stored document could not be encoded or decoded.
    #[error("Failed to encode storage document")]
    Serialization {
        #[source]
        source: serde_json::Error,
    },
}

/// Failure reported by a page source.
///
/// The fetch orchestrator turns every variant into an empty page with a
/// total of zero.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The request never produced a response.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The source answered with a rejection.
    #[error("Source rejected request: {reason}")]
    Rejected { reason: String },

    /// The response could not be interpreted as a page.
    #[error("Malformed page payload: {0}")]
    Malformed(String),
}

/// Invalid pager configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// No page sizes were configured.
    #[error("At least one page size must be allowed")]
    EmptyPageSizes,

    /// A page size of zero was configured.
    #[error("Page size 0 is not allowed")]
    ZeroPageSize,

    /// The explicit default size is not one of the allowed sizes.
    #[error("Default page size {size} is not in the allowed set {allowed:?}")]
    DefaultNotAllowed { size: usize, allowed: Vec<usize> },
}

/// Result type alias for storage operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;
