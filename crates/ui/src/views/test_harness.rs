use std::path::PathBuf;
use std::sync::Arc;

use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use services::{AppServices, CatalogSource, Clock, Tracker};
use storage::repository::Storage;
use tokio::sync::Mutex;
use tracker_core::time::fixed_now;

use crate::context::{SharedTracker, UiApp, build_app_context};
use crate::views::DashboardView;

struct TestApp {
    tracker: SharedTracker,
    startup_notice: Option<String>,
}

impl UiApp for TestApp {
    fn tracker(&self) -> SharedTracker {
        Arc::clone(&self.tracker)
    }

    fn export_dir(&self) -> PathBuf {
        std::env::temp_dir().join("learning-tracker-view-tests")
    }

    fn startup_notice(&self) -> Option<String> {
        self.startup_notice.clone()
    }
}

#[derive(Props, Clone)]
struct HarnessProps {
    app: Arc<TestApp>,
}

impl PartialEq for HarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

#[component]
fn DashboardHarness(props: HarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
    rsx! { DashboardView {} }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
    pub tracker: SharedTracker,
}

impl ViewHarness {
    /// Build the dom and let the initial load settle.
    pub async fn mount(&mut self) {
        self.dom.rebuild_in_place();
        self.drive_async().await;
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            self.dom.wait_for_work(),
        )
        .await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }
}

/// A tracker over in-memory storage and the built-in catalog.
pub async fn builtin_tracker() -> Tracker {
    let storage = Storage::in_memory();
    let services =
        AppServices::from_storage(&storage, Clock::fixed(fixed_now()), CatalogSource::Builtin);
    let (tracker, warning) = Tracker::bootstrap(services).await;
    assert!(warning.is_none());
    tracker
}

pub fn setup_view_harness(tracker: Tracker, startup_notice: Option<&str>) -> ViewHarness {
    let tracker = Arc::new(Mutex::new(tracker));
    let app = Arc::new(TestApp {
        tracker: Arc::clone(&tracker),
        startup_notice: startup_notice.map(str::to_owned),
    });
    let dom = VirtualDom::new_with_props(DashboardHarness, HarnessProps { app });
    ViewHarness { dom, tracker }
}
