use std::sync::Arc;

use storage::repository::{KeyValueStore, Storage};

use crate::Clock;
use crate::catalog_service::{CatalogService, CatalogSource};
use crate::error::AppServicesError;
use crate::progress_service::ProgressService;
use crate::settings_service::SettingsService;
use crate::transfer_service::TransferService;

/// Assembles the services a `Tracker` is built from.
#[derive(Clone)]
pub struct AppServices {
    catalog: Arc<CatalogService>,
    progress: Arc<ProgressService>,
    settings: Arc<SettingsService>,
    transfer: TransferService,
    kv: Arc<dyn KeyValueStore>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        source: CatalogSource,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, clock, source))
    }

    #[must_use]
    pub fn from_storage(storage: &Storage, clock: Clock, source: CatalogSource) -> Self {
        Self::from_parts(
            CatalogService::new(source, Arc::clone(&storage.kv)),
            storage,
            clock,
        )
    }

    /// Like `from_storage`, with a preconfigured catalog service (e.g. a custom timeout).
    #[must_use]
    pub fn from_parts(catalog: CatalogService, storage: &Storage, clock: Clock) -> Self {
        Self {
            catalog: Arc::new(catalog),
            progress: Arc::new(ProgressService::new(Arc::clone(&storage.kv))),
            settings: Arc::new(SettingsService::new(Arc::clone(&storage.kv))),
            transfer: TransferService::new(clock),
            kv: Arc::clone(&storage.kv),
        }
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<CatalogService> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }

    #[must_use]
    pub fn settings(&self) -> Arc<SettingsService> {
        Arc::clone(&self.settings)
    }

    #[must_use]
    pub fn transfer(&self) -> TransferService {
        self.transfer
    }

    /// The underlying store, for writes that span several services.
    #[must_use]
    pub fn store(&self) -> Arc<dyn KeyValueStore> {
        Arc::clone(&self.kv)
    }
}
