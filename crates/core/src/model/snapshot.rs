use std::fmt;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::de::{Deserializer, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::FormatError;
use crate::model::catalog::Catalog;
use crate::model::progress::ProgressStore;

/// Full state written by an export: catalog, progress and a timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    #[serde(serialize_with = "serialize_iso_millis")]
    pub export_date: DateTime<Utc>,
    pub topics: Catalog,
    pub progress: ProgressStore,
}

impl ExportDocument {
    #[must_use]
    pub fn new(export_date: DateTime<Utc>, topics: Catalog, progress: ProgressStore) -> Self {
        Self {
            export_date,
            topics,
            progress,
        }
    }

    /// Pretty JSON with two-space indentation.
    ///
    /// # Errors
    ///
    /// Returns `FormatError` if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, FormatError> {
        serde_json::to_string_pretty(self).map_err(FormatError::from)
    }
}

/// `learning-progress-YYYY-MM-DD.json`
#[must_use]
pub fn export_file_name(date: NaiveDate) -> String {
    format!("learning-progress-{}.json", date.format("%Y-%m-%d"))
}

fn serialize_iso_millis<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&at.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Parsed import file. Each present part replaces the matching store; absent
/// (or `null`) parts leave it untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImportDocument {
    pub topics: Option<Catalog>,
    pub progress: Option<ProgressStore>,
}

impl ImportDocument {
    /// Parse and shape-check an import file in full before anything is applied.
    ///
    /// # Errors
    ///
    /// Returns `FormatError::Parse` for malformed JSON and
    /// `FormatError::InvalidFormat` if the top level is not an object or a
    /// present `topics`/`progress` part has the wrong shape.
    pub fn from_json_str(raw: &str) -> Result<Self, FormatError> {
        Ok(serde_json::from_str(raw)?)
    }
}

impl<'de> Deserialize<'de> for ImportDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(ImportVisitor)
    }
}

struct ImportVisitor;

impl<'de> Visitor<'de> for ImportVisitor {
    type Value = ImportDocument;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object with optional `topics` and `progress` keys")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<ImportDocument, A::Error> {
        let mut doc = ImportDocument::default();
        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "topics" => doc.topics = map.next_value::<Option<Catalog>>()?,
                "progress" => doc.progress = map.next_value::<Option<ProgressStore>>()?,
                _ => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn export_uses_camel_case_and_millisecond_timestamp() {
        let doc = ExportDocument::new(fixed_now(), Catalog::builtin(), ProgressStore::new());
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["exportDate"], "2023-11-14T22:13:20.000Z");
        assert!(value["topics"]["MS_SQL"].is_array());
        assert_eq!(value["progress"], serde_json::json!({}));
    }

    #[test]
    fn export_file_name_uses_utc_date() {
        assert_eq!(
            export_file_name(fixed_now().date_naive()),
            "learning-progress-2023-11-14.json"
        );
    }

    #[test]
    fn export_then_import_reproduces_state() {
        let mut progress = ProgressStore::new();
        progress.set_completed("MS_SQL-Phase-1.0-0", true);
        progress.set_completed("SSIS-Phase-1.0-2", false);
        let doc = ExportDocument::new(fixed_now(), Catalog::builtin(), progress.clone());

        let imported = ImportDocument::from_json_str(&doc.to_json_pretty().unwrap()).unwrap();
        assert_eq!(imported.topics, Some(Catalog::builtin()));
        assert_eq!(imported.progress, Some(progress));
    }

    #[test]
    fn progress_only_import_leaves_topics_absent() {
        let doc = ImportDocument::from_json_str(
            r#"{"progress": {"MS_SQL-Phase-1.0-0": {"completed": true}}}"#,
        )
        .unwrap();
        assert!(doc.topics.is_none());
        assert!(doc.progress.unwrap().is_completed("MS_SQL-Phase-1.0-0"));
    }

    #[test]
    fn null_parts_and_unknown_keys_are_ignored() {
        let doc = ImportDocument::from_json_str(
            r#"{"exportDate": "2024-01-01T00:00:00.000Z", "topics": null, "extra": [1]}"#,
        )
        .unwrap();
        assert_eq!(doc, ImportDocument::default());
    }

    #[test]
    fn non_object_top_level_is_invalid_format() {
        for raw in ["[]", "42", "\"topics\"", "null"] {
            let err = ImportDocument::from_json_str(raw).unwrap_err();
            assert!(err.is_invalid_format(), "{raw}: {err:?}");
        }
    }

    #[test]
    fn wrong_part_shape_is_invalid_format() {
        let err = ImportDocument::from_json_str(r#"{"topics": "MS_SQL"}"#).unwrap_err();
        assert!(err.is_invalid_format());
        let err = ImportDocument::from_json_str(r#"{"progress": [true]}"#).unwrap_err();
        assert!(err.is_invalid_format());
    }

    #[test]
    fn truncated_text_is_parse_failure() {
        let err = ImportDocument::from_json_str(r#"{"progress": {"MS_SQL-Pha"#).unwrap_err();
        assert!(err.is_parse());
    }
}
