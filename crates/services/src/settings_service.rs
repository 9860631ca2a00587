use std::sync::Arc;

use storage::repository::{KeyValueStore, StorageError, StorageKey};
use tracker_core::model::Theme;

#[derive(Clone)]
pub struct SettingsService {
    kv: Arc<dyn KeyValueStore>,
}

impl SettingsService {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Load the persisted theme (or the default if missing or unreadable).
    pub async fn load_theme(&self) -> Theme {
        match self.kv.get(StorageKey::Theme).await {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                log::warn!("ignoring stored theme {raw:?}: {err}");
                Theme::default()
            }),
            Ok(None) => Theme::default(),
            Err(err) => {
                log::warn!("stored theme unavailable: {err}");
                Theme::default()
            }
        }
    }

    /// Persist the theme preference.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be written.
    pub async fn save_theme(&self, theme: Theme) -> Result<(), StorageError> {
        let raw = serde_json::to_string(&theme)
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        self.kv.set(StorageKey::Theme, &raw).await
    }
}
