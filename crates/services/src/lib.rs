#![forbid(unsafe_code)]

pub mod app_services;
pub mod catalog_service;
pub mod error;
pub mod progress_service;
pub mod settings_service;
pub mod tracker;
pub mod transfer_service;

pub use tracker_core::Clock;

pub use app_services::AppServices;
pub use catalog_service::{CatalogLoad, CatalogService, CatalogSource, DEFAULT_FETCH_TIMEOUT};
pub use error::{AppServicesError, CatalogLoadError, ImportError, TrackerError};
pub use progress_service::ProgressService;
pub use settings_service::SettingsService;
pub use tracker::{ImportOutcome, Tracker};
pub use transfer_service::{ExportFile, TransferService};
