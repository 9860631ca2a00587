use std::path::PathBuf;
use std::sync::Arc;

use services::Tracker;
use tokio::sync::Mutex;

/// The tracker shared between the view and its spawned actions.
pub type SharedTracker = Arc<Mutex<Tracker>>;

pub trait UiApp: Send + Sync {
    fn tracker(&self) -> SharedTracker;
    fn export_dir(&self) -> PathBuf;

    /// Message to show once the window opens (e.g. a catalog fallback warning).
    fn startup_notice(&self) -> Option<String>;
}

#[derive(Clone)]
pub struct AppContext {
    tracker: SharedTracker,
    export_dir: PathBuf,
    startup_notice: Option<String>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            tracker: app.tracker(),
            export_dir: app.export_dir(),
            startup_notice: app.startup_notice(),
        }
    }

    #[must_use]
    pub fn tracker(&self) -> SharedTracker {
        Arc::clone(&self.tracker)
    }

    #[must_use]
    pub fn export_dir(&self) -> PathBuf {
        self.export_dir.clone()
    }

    #[must_use]
    pub fn startup_notice(&self) -> Option<String> {
        self.startup_notice.clone()
    }
}

// This context is provided by the application composition root (e.g. `crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
