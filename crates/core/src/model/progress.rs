use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::FormatError;
use crate::model::catalog::Catalog;

/// Completion state of one sub-topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProgressEntry {
    #[serde(default)]
    pub completed: bool,
}

/// Mutable mapping from composite sub-topic key to completion state.
///
/// Keys are opaque strings: entries for sub-topics that no longer exist in the
/// current catalog are kept and still count toward `count_completed_all`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgressStore {
    entries: BTreeMap<String, ProgressEntry>,
}

impl ProgressStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the persisted `{key: {completed: bool}}` format.
    ///
    /// # Errors
    ///
    /// Returns `FormatError::Parse` for malformed JSON and
    /// `FormatError::InvalidFormat` when the shape is wrong.
    pub fn from_json_str(raw: &str) -> Result<Self, FormatError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Serialize to the persisted format.
    ///
    /// # Errors
    ///
    /// Returns `FormatError` if serialization fails.
    pub fn to_json_string(&self) -> Result<String, FormatError> {
        serde_json::to_string(self).map_err(FormatError::from)
    }

    /// Absent keys read as not completed.
    #[must_use]
    pub fn is_completed(&self, key: &str) -> bool {
        self.entries.get(key).is_some_and(|entry| entry.completed)
    }

    pub fn set_completed(&mut self, key: impl Into<String>, completed: bool) {
        self.entries.entry(key.into()).or_default().completed = completed;
    }

    /// Flip the completion state of `key` and return the new value.
    pub fn toggle(&mut self, key: impl Into<String>) -> bool {
        let entry = self.entries.entry(key.into()).or_default();
        entry.completed = !entry.completed;
        entry.completed
    }

    /// Completed entries whose key starts with `prefix` (plain string prefix).
    #[must_use]
    pub fn count_completed(&self, prefix: &str) -> usize {
        self.entries
            .iter()
            .filter(|(key, entry)| entry.completed && key.starts_with(prefix))
            .count()
    }

    /// Completed entries across the whole store, orphans included.
    #[must_use]
    pub fn count_completed_all(&self) -> usize {
        self.entries.values().filter(|entry| entry.completed).count()
    }

    pub fn replace(&mut self, other: ProgressStore) {
        *self = other;
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ProgressEntry)> {
        self.entries.iter().map(|(key, entry)| (key.as_str(), *entry))
    }

    /// Keys that do not correspond to any sub-topic of `catalog`.
    #[must_use]
    pub fn orphaned_keys(&self, catalog: &Catalog) -> Vec<&str> {
        let known: HashSet<String> = catalog.subtopic_keys().map(|key| key.to_string()).collect();
        self.entries
            .keys()
            .filter(|key| !known.contains(key.as_str()))
            .map(String::as_str)
            .collect()
    }
}

impl FromIterator<(String, bool)> for ProgressStore {
    fn from_iter<I: IntoIterator<Item = (String, bool)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(key, completed)| (key, ProgressEntry { completed }))
                .collect(),
        }
    }
}
