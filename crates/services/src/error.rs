//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;
use tracker_core::FormatError;

/// Why the configured catalog source could not be used.
///
/// Never fatal: the loader falls back and reports this as a warning.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogLoadError {
    #[error("catalog request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("catalog request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("catalog file could not be read: {0}")]
    Io(#[from] std::io::Error),
    #[error("catalog source is not a valid catalog: {0}")]
    Format(#[from] FormatError),
}

/// Errors emitted while importing a progress file.
///
/// State is left untouched for every variant.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ImportError {
    #[error("import file is not valid JSON: {0}")]
    Parse(String),
    #[error("import file has an invalid format: {0}")]
    InvalidFormat(String),
    #[error("import file could not be read: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<FormatError> for ImportError {
    fn from(err: FormatError) -> Self {
        match err {
            FormatError::Parse(msg) => ImportError::Parse(msg),
            FormatError::InvalidFormat(msg) => ImportError::InvalidFormat(msg),
            other => ImportError::InvalidFormat(other.to_string()),
        }
    }
}

/// Errors emitted by `Tracker` mutations and exports.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TrackerError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error("export could not be written: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
