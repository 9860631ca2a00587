use serde_json::error::Category;
use thiserror::Error;

use crate::model::CatalogError;

/// Why a JSON document (catalog, progress, or import file) was rejected.
///
/// `Parse` is malformed JSON text; `InvalidFormat` is well-formed JSON with
/// the wrong shape.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FormatError {
    #[error("malformed JSON: {0}")]
    Parse(String),
    #[error("invalid format: {0}")]
    InvalidFormat(String),
}

impl FormatError {
    #[must_use]
    pub fn is_parse(&self) -> bool {
        matches!(self, FormatError::Parse(_))
    }

    #[must_use]
    pub fn is_invalid_format(&self) -> bool {
        matches!(self, FormatError::InvalidFormat(_))
    }
}

impl From<serde_json::Error> for FormatError {
    fn from(err: serde_json::Error) -> Self {
        match err.classify() {
            Category::Data => FormatError::InvalidFormat(err.to_string()),
            Category::Io | Category::Syntax | Category::Eof => FormatError::Parse(err.to_string()),
        }
    }
}

impl From<CatalogError> for FormatError {
    fn from(err: CatalogError) -> Self {
        FormatError::InvalidFormat(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncated_json_is_a_parse_failure() {
        let err = serde_json::from_str::<serde_json::Value>("{\"progress\": {").unwrap_err();
        assert!(FormatError::from(err).is_parse());
    }

    #[test]
    fn wrong_shape_is_invalid_format() {
        let err = serde_json::from_str::<Vec<String>>("{\"a\": 1}").unwrap_err();
        assert!(FormatError::from(err).is_invalid_format());
    }
}
