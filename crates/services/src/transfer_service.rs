use std::path::{Path, PathBuf};

use tracker_core::FormatError;
use tracker_core::model::{Catalog, ExportDocument, ImportDocument, ProgressStore, export_file_name};

use crate::Clock;
use crate::error::ImportError;

/// A rendered export, ready to be saved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub contents: String,
}

/// Builds export files and reads import files.
#[derive(Clone, Copy, Debug, Default)]
pub struct TransferService {
    clock: Clock,
}

impl TransferService {
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        Self { clock }
    }

    /// Render both stores plus an export timestamp.
    ///
    /// # Errors
    ///
    /// Returns `FormatError` if serialization fails.
    pub fn export(
        &self,
        catalog: &Catalog,
        progress: &ProgressStore,
    ) -> Result<ExportFile, FormatError> {
        let doc = ExportDocument::new(self.clock.now(), catalog.clone(), progress.clone());
        Ok(ExportFile {
            file_name: export_file_name(self.clock.today()),
            contents: doc.to_json_pretty()?,
        })
    }

    /// Write `file` into `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `std::io::Error` if the directory or file cannot be written.
    pub async fn write_export(&self, dir: &Path, file: &ExportFile) -> std::io::Result<PathBuf> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(&file.file_name);
        tokio::fs::write(&path, file.contents.as_bytes()).await?;
        log::info!("exported progress to {}", path.display());
        Ok(path)
    }

    /// Parse an import file's text.
    ///
    /// # Errors
    ///
    /// Returns `ImportError::Parse` for malformed JSON and
    /// `ImportError::InvalidFormat` for a structurally wrong document.
    pub fn parse_import(&self, raw: &str) -> Result<ImportDocument, ImportError> {
        Ok(ImportDocument::from_json_str(raw)?)
    }

    /// Read and parse an import file from disk.
    ///
    /// # Errors
    ///
    /// Returns `ImportError::Io` if the file cannot be read, otherwise the
    /// errors of `parse_import`.
    pub async fn read_import(&self, path: &Path) -> Result<ImportDocument, ImportError> {
        let raw = tokio::fs::read_to_string(path).await?;
        self.parse_import(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracker_core::time::fixed_clock;

    #[test]
    fn export_names_file_by_date_and_pretty_prints() {
        let service = TransferService::new(fixed_clock());
        let file = service
            .export(&Catalog::builtin(), &ProgressStore::new())
            .unwrap();
        assert_eq!(file.file_name, "learning-progress-2023-11-14.json");
        assert!(file.contents.starts_with("{\n  \"exportDate\": \"2023-11-14T22:13:20.000Z\""));
    }

    #[test]
    fn parse_import_classifies_errors() {
        let service = TransferService::new(fixed_clock());
        assert!(matches!(
            service.parse_import("{\"topics\": "),
            Err(ImportError::Parse(_))
        ));
        assert!(matches!(
            service.parse_import("{\"topics\": []}"),
            Err(ImportError::InvalidFormat(_))
        ));
    }

    #[tokio::test]
    async fn read_import_reports_missing_file() {
        let service = TransferService::new(fixed_clock());
        let missing = std::env::temp_dir().join("learning-progress-does-not-exist.json");
        assert!(matches!(
            service.read_import(&missing).await,
            Err(ImportError::Io(_))
        ));
    }
}
