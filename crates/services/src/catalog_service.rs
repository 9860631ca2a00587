use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use storage::repository::{KeyValueStore, StorageError, StorageKey};
use tracker_core::model::Catalog;

use crate::error::CatalogLoadError;

/// Upper bound on a catalog fetch; past it the loader falls back.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Where the catalog definition comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CatalogSource {
    Http(String),
    File(PathBuf),
    Builtin,
}

impl CatalogSource {
    /// `http(s)://` URLs are fetched, `builtin` skips loading, anything else is a path.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            Self::Http(trimmed.to_owned())
        } else if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("builtin") {
            Self::Builtin
        } else {
            Self::File(PathBuf::from(trimmed))
        }
    }
}

impl Default for CatalogSource {
    fn default() -> Self {
        Self::File(PathBuf::from("data/topics.json"))
    }
}

impl fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogSource::Http(url) => f.write_str(url),
            CatalogSource::File(path) => write!(f, "{}", path.display()),
            CatalogSource::Builtin => f.write_str("builtin"),
        }
    }
}

/// Result of a catalog load. `warning` is set when the source failed and a
/// fallback catalog was used instead.
#[derive(Debug)]
pub struct CatalogLoad {
    pub catalog: Catalog,
    pub warning: Option<CatalogLoadError>,
}

#[derive(Clone)]
pub struct CatalogService {
    client: Client,
    source: CatalogSource,
    timeout: Duration,
    kv: Arc<dyn KeyValueStore>,
}

impl CatalogService {
    #[must_use]
    pub fn new(source: CatalogSource, kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            client: Client::new(),
            source,
            timeout: DEFAULT_FETCH_TIMEOUT,
            kv,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn source(&self) -> &CatalogSource {
        &self.source
    }

    /// Load the catalog, never failing.
    ///
    /// On any source failure the last imported catalog is used if one was
    /// persisted, otherwise the built-in catalog.
    pub async fn load(&self) -> CatalogLoad {
        let err = match self.fetch().await {
            Ok(catalog) => {
                log::info!(
                    "loaded {} categories from {}",
                    catalog.category_count(),
                    self.source
                );
                return CatalogLoad {
                    catalog,
                    warning: None,
                };
            }
            Err(err) => err,
        };

        log::warn!("catalog source {} failed: {err}", self.source);
        let catalog = match self.load_imported().await {
            Some(catalog) => {
                log::info!("using previously imported catalog");
                catalog
            }
            None => Catalog::builtin(),
        };
        CatalogLoad {
            catalog,
            warning: Some(err),
        }
    }

    /// Read the catalog straight from the configured source.
    ///
    /// # Errors
    ///
    /// Returns `CatalogLoadError` for transport failures, non-success statuses,
    /// unreadable files, or documents that are not a valid catalog.
    pub async fn fetch(&self) -> Result<Catalog, CatalogLoadError> {
        let raw = match &self.source {
            CatalogSource::Builtin => return Ok(Catalog::builtin()),
            CatalogSource::File(path) => tokio::fs::read_to_string(path).await?,
            CatalogSource::Http(url) => {
                let response = self
                    .client
                    .get(url)
                    .timeout(self.timeout)
                    .send()
                    .await?;
                if !response.status().is_success() {
                    return Err(CatalogLoadError::HttpStatus(response.status()));
                }
                response.text().await?
            }
        };
        Ok(Catalog::from_json_str(&raw)?)
    }

    /// Storage entry for a catalog that replaced the loaded one through an import.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the catalog cannot be encoded.
    pub fn imported_entry(catalog: &Catalog) -> Result<(StorageKey, String), StorageError> {
        let raw = serde_json::to_string(catalog)
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        Ok((StorageKey::Topics, raw))
    }

    async fn load_imported(&self) -> Option<Catalog> {
        let raw = match self.kv.get(StorageKey::Topics).await {
            Ok(raw) => raw?,
            Err(err) => {
                log::warn!("stored catalog unavailable: {err}");
                return None;
            }
        };
        match Catalog::from_json_str(&raw) {
            Ok(catalog) => Some(catalog),
            Err(err) => {
                log::warn!("ignoring stored catalog: {err}");
                None
            }
        }
    }
}
