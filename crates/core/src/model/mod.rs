mod catalog;
mod category_meta;
mod ids;
mod progress;
mod snapshot;
mod theme;

pub use catalog::{Catalog, CatalogError, Phase};
pub use category_meta::CategoryMeta;
pub use ids::{CategoryId, KeyError, PhaseKey, SubtopicKey};
pub use progress::{ProgressEntry, ProgressStore};
pub use snapshot::{ExportDocument, ImportDocument, export_file_name};
pub use theme::Theme;
