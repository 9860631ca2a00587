//! Application controller: owns the catalog, the progress store and the
//! current selection, and persists every mutation before returning.

use std::path::{Path, PathBuf};

use tracker_core::aggregate::{self, CategoryProgress, OverallProgress};
use tracker_core::model::{Catalog, CategoryId, ImportDocument, ProgressStore, SubtopicKey, Theme};

use crate::app_services::AppServices;
use crate::catalog_service::CatalogService;
use crate::progress_service::ProgressService;
use crate::error::{CatalogLoadError, ImportError, TrackerError};
use crate::transfer_service::ExportFile;

/// What an import replaced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImportOutcome {
    pub replaced_topics: bool,
    pub replaced_progress: bool,
}

pub struct Tracker {
    services: AppServices,
    catalog: Catalog,
    progress: ProgressStore,
    current_category: Option<CategoryId>,
    theme: Theme,
}

impl Tracker {
    /// Restore theme and progress, then load the catalog.
    ///
    /// Always yields a usable tracker; a failed catalog source is returned as
    /// a warning alongside it.
    pub async fn bootstrap(services: AppServices) -> (Self, Option<CatalogLoadError>) {
        let theme = services.settings().load_theme().await;
        let progress = services.progress().restore().await;
        let load = services.catalog().load().await;

        let orphaned = progress.orphaned_keys(&load.catalog).len();
        if orphaned > 0 {
            log::debug!("{orphaned} stored progress entries are not in the current catalog");
        }

        let current_category = load.catalog.default_category().cloned();
        let tracker = Self {
            services,
            catalog: load.catalog,
            progress,
            current_category,
            theme,
        };
        (tracker, load.warning)
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn progress(&self) -> &ProgressStore {
        &self.progress
    }

    #[must_use]
    pub fn theme(&self) -> Theme {
        self.theme
    }

    #[must_use]
    pub fn current_category(&self) -> Option<&CategoryId> {
        self.current_category.as_ref()
    }

    pub fn select_category(&mut self, category: CategoryId) {
        self.current_category = Some(category);
    }

    #[must_use]
    pub fn is_completed(&self, key: &SubtopicKey) -> bool {
        self.progress.is_completed(&key.to_string())
    }

    /// Set one sub-topic's state and persist the store.
    ///
    /// The in-memory change is kept even if persisting fails.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Storage` if the store cannot be persisted.
    pub async fn set_completed(
        &mut self,
        key: &SubtopicKey,
        completed: bool,
    ) -> Result<(), TrackerError> {
        self.progress.set_completed(key.to_string(), completed);
        self.persist_progress().await
    }

    /// Flip one sub-topic's state, persist, and return the new state.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Storage` if the store cannot be persisted.
    pub async fn toggle(&mut self, key: &SubtopicKey) -> Result<bool, TrackerError> {
        let completed = self.progress.toggle(key.to_string());
        self.persist_progress().await?;
        Ok(completed)
    }

    /// Import a file's text. Parsed and persisted in full before any in-memory
    /// state changes; on error nothing changes.
    ///
    /// # Errors
    ///
    /// Returns `ImportError::Parse`/`InvalidFormat` for bad input and
    /// `ImportError::Storage` if the new state cannot be persisted.
    pub async fn import_text(&mut self, raw: &str) -> Result<ImportOutcome, ImportError> {
        let doc = self.services.transfer().parse_import(raw)?;
        self.apply_import(doc).await
    }

    /// Read and import a file from disk.
    ///
    /// # Errors
    ///
    /// Returns `ImportError::Io` if the file cannot be read, otherwise the
    /// errors of `import_text`.
    pub async fn import_file(&mut self, path: &Path) -> Result<ImportOutcome, ImportError> {
        let doc = self.services.transfer().read_import(path).await?;
        self.apply_import(doc).await
    }

    async fn apply_import(&mut self, doc: ImportDocument) -> Result<ImportOutcome, ImportError> {
        let mut entries = Vec::with_capacity(2);
        if let Some(catalog) = doc.topics.as_ref() {
            entries.push(CatalogService::imported_entry(catalog)?);
        }
        if let Some(progress) = doc.progress.as_ref() {
            entries.push(ProgressService::entry(progress)?);
        }
        // One batch, so a failed write leaves neither part persisted.
        if !entries.is_empty() {
            self.services.store().set_many(&entries).await?;
        }

        let outcome = ImportOutcome {
            replaced_topics: doc.topics.is_some(),
            replaced_progress: doc.progress.is_some(),
        };
        if let Some(catalog) = doc.topics {
            self.catalog = catalog;
            let still_present = self
                .current_category
                .as_ref()
                .is_some_and(|id| self.catalog.contains_category(id));
            if !still_present {
                self.current_category = self.catalog.default_category().cloned();
            }
        }
        if let Some(progress) = doc.progress {
            self.progress.replace(progress);
        }
        log::info!(
            "imported (topics: {}, progress: {})",
            outcome.replaced_topics,
            outcome.replaced_progress
        );
        Ok(outcome)
    }

    /// Render the current catalog and progress as an export file.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Format` if serialization fails.
    pub fn export(&self) -> Result<ExportFile, TrackerError> {
        Ok(self
            .services
            .transfer()
            .export(&self.catalog, &self.progress)?)
    }

    /// Export into `dir` and return the written path.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Format` if serialization fails and
    /// `TrackerError::Io` if the file cannot be written.
    pub async fn export_to_dir(&self, dir: &Path) -> Result<PathBuf, TrackerError> {
        let file = self.export()?;
        Ok(self.services.transfer().write_export(dir, &file).await?)
    }

    /// Clear all progress and persist the empty store. Not undoable.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Storage` if the empty store cannot be persisted.
    pub async fn reset(&mut self) -> Result<(), TrackerError> {
        self.progress.clear();
        self.persist_progress().await
    }

    /// Switch between light and dark, persist, and return the new theme.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Storage` if the preference cannot be persisted.
    pub async fn toggle_theme(&mut self) -> Result<Theme, TrackerError> {
        self.theme = self.theme.toggled();
        self.services.settings().save_theme(self.theme).await?;
        Ok(self.theme)
    }

    /// Per-phase and per-category figures for the selected category.
    #[must_use]
    pub fn current_category_progress(&self) -> Option<CategoryProgress> {
        self.current_category
            .as_ref()
            .map(|id| self.category_progress(id))
    }

    #[must_use]
    pub fn category_progress(&self, id: &CategoryId) -> CategoryProgress {
        aggregate::category_progress(&self.catalog, id, &self.progress)
    }

    #[must_use]
    pub fn overall_progress(&self) -> OverallProgress {
        aggregate::overall_progress(&self.catalog, &self.progress)
    }

    async fn persist_progress(&self) -> Result<(), TrackerError> {
        self.services.progress().persist(&self.progress).await?;
        Ok(())
    }
}
