use std::sync::Arc;

use storage::repository::{KeyValueStore, StorageError, StorageKey};
use tracker_core::model::ProgressStore;

/// Persists the progress store under the `progress` key.
#[derive(Clone)]
pub struct ProgressService {
    kv: Arc<dyn KeyValueStore>,
}

impl ProgressService {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Restore persisted progress.
    ///
    /// Missing, unreadable or malformed data yields an empty store.
    pub async fn restore(&self) -> ProgressStore {
        let raw = match self.kv.get(StorageKey::Progress).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return ProgressStore::new(),
            Err(err) => {
                log::warn!("stored progress unavailable: {err}");
                return ProgressStore::new();
            }
        };
        ProgressStore::from_json_str(&raw).unwrap_or_else(|err| {
            log::warn!("discarding malformed stored progress: {err}");
            ProgressStore::new()
        })
    }

    /// Write the whole store.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if serialization or the write fails.
    pub async fn persist(&self, progress: &ProgressStore) -> Result<(), StorageError> {
        let (key, raw) = Self::entry(progress)?;
        self.kv.set(key, &raw).await
    }

    /// Storage entry for the whole store, for batched writes.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the store cannot be encoded.
    pub fn entry(progress: &ProgressStore) -> Result<(StorageKey, String), StorageError> {
        let raw = progress
            .to_json_string()
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        Ok((StorageKey::Progress, raw))
    }
}
