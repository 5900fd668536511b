//! Error handling types and utilities.
//!
//! Errors fall into two fatal families: configuration errors, raised before any
//! indexing work starts, and integrity errors, raised when the route list and the
//! build output disagree. Anything that merely excludes a page is not an error and
//! is logged instead.

use std::path::PathBuf;

/// A specialized Result type for sitedex operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error for a search index build.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("build output is inconsistent: {0}")]
    Integrity(#[from] IntegrityError),

    #[error("failed to extract sections from {url}: {reason}")]
    Extract { url: String, reason: String },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("background task failed: {0}")]
    Task(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Invalid option values. Each message names the offending option and the fix.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("`{name}` must be within [{min}, {max}], got {value}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("language '{code}' is deprecated, use '{replacement}' instead")]
    DeprecatedLanguage {
        code: String,
        replacement: &'static str,
    },

    #[error("language '{0}' is not supported")]
    UnsupportedLanguage(String),

    #[error("at least one language must be configured")]
    NoLanguage,

    #[error(
        "`tokenizer_separator` cannot be combined with language '{0}', which controls its own segmentation; remove the separator"
    )]
    SeparatorNotSupported(&'static str),

    #[error("`tokenizer_separator` is not a valid regular expression: {0}")]
    InvalidSeparator(String),

    #[error("`{name}` must not end with '/', got '{value}'")]
    TrailingSeparator { name: &'static str, value: String },

    #[error("`ignore_routes` pattern '{pattern}' is invalid: {reason}")]
    InvalidIgnorePattern { pattern: String, reason: String },

    #[error("failed to parse options file {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("versions manifest {} is not a JSON array of strings: {reason}", path.display())]
    InvalidVersionsManifest { path: PathBuf, reason: String },
}

/// Disagreement between the route list and the files on disk.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntegrityError {
    #[error("route '{route}' does not start with the base URL '{base_url}'")]
    RouteOutsideBaseUrl { route: String, base_url: String },

    #[error("page for route '{route}' is missing or unreadable at {}: {reason}", path.display())]
    MissingPage {
        route: String,
        path: PathBuf,
        reason: String,
    },

    #[error("document {id} added after document {previous}; ids must be strictly increasing")]
    DocumentOrder { id: u32, previous: u32 },
}
