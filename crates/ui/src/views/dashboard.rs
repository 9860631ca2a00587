use std::path::PathBuf;
use std::time::Duration;

use dioxus::prelude::*;
use tracker_core::model::{CategoryId, SubtopicKey};

use crate::context::AppContext;
use crate::views::{Notice, ViewState};
use crate::vm::{CategoryNavVm, DashboardVm, PhaseCardVm, StatsVm, SubtopicVm, map_dashboard};

const NOTICE_TTL: Duration = Duration::from_secs(3);

/// Show `next` and clear it after `NOTICE_TTL` unless it was replaced meanwhile.
fn show_notice(mut notice: Signal<Option<Notice>>, next: Notice) {
    notice.set(Some(next.clone()));
    spawn(async move {
        tokio::time::sleep(NOTICE_TTL).await;
        let unchanged = *notice.peek() == Some(next.clone());
        if unchanged {
            notice.set(None);
        }
    });
}

#[component]
pub fn DashboardView() -> Element {
    let ctx = use_context::<AppContext>();
    let state = use_signal(|| ViewState::<DashboardVm>::Loading);
    let notice = use_signal(|| ctx.startup_notice().map(Notice::error));
    let mut confirm_reset = use_signal(|| false);
    let mut import_path = use_signal(String::new);

    let tracker = ctx.tracker();
    use_future(move || {
        let tracker = tracker.clone();
        let mut state = state;
        async move {
            let guard = tracker.lock().await;
            state.set(ViewState::Ready(map_dashboard(&guard)));
        }
    });

    let on_select = {
        let tracker = ctx.tracker();
        use_callback(move |id: CategoryId| {
            let tracker = tracker.clone();
            let mut state = state;
            spawn(async move {
                let mut guard = tracker.lock().await;
                guard.select_category(id);
                state.set(ViewState::Ready(map_dashboard(&guard)));
            });
        })
    };

    let on_toggle = {
        let tracker = ctx.tracker();
        use_callback(move |key: SubtopicKey| {
            let tracker = tracker.clone();
            let mut state = state;
            spawn(async move {
                let mut guard = tracker.lock().await;
                if let Err(err) = guard.toggle(&key).await {
                    log::warn!("saving progress for {key} failed: {err}");
                    show_notice(notice, Notice::error(format!("Could not save progress: {err}")));
                }
                state.set(ViewState::Ready(map_dashboard(&guard)));
            });
        })
    };

    let on_theme = {
        let tracker = ctx.tracker();
        use_callback(move |()| {
            let tracker = tracker.clone();
            let mut state = state;
            spawn(async move {
                let mut guard = tracker.lock().await;
                if let Err(err) = guard.toggle_theme().await {
                    log::warn!("saving theme failed: {err}");
                }
                state.set(ViewState::Ready(map_dashboard(&guard)));
            });
        })
    };

    let on_import = {
        let tracker = ctx.tracker();
        use_callback(move |()| {
            let path = import_path.peek().trim().to_owned();
            if path.is_empty() {
                show_notice(notice, Notice::error("Enter the path of a file to import."));
                return;
            }
            let tracker = tracker.clone();
            let mut state = state;
            spawn(async move {
                let mut guard = tracker.lock().await;
                match guard.import_file(&PathBuf::from(&path)).await {
                    Ok(_) => {
                        import_path.set(String::new());
                        show_notice(notice, Notice::success("Learning path imported successfully!"));
                    }
                    Err(err) => {
                        log::warn!("import of {path} failed: {err}");
                        show_notice(
                            notice,
                            Notice::error(format!(
                                "Error importing file. Please ensure it is valid JSON. ({err})"
                            )),
                        );
                    }
                }
                state.set(ViewState::Ready(map_dashboard(&guard)));
            });
        })
    };

    let on_export = {
        let tracker = ctx.tracker();
        let dir = ctx.export_dir();
        use_callback(move |()| {
            let tracker = tracker.clone();
            let dir = dir.clone();
            spawn(async move {
                let guard = tracker.lock().await;
                match guard.export_to_dir(&dir).await {
                    Ok(path) => show_notice(
                        notice,
                        Notice::success(format!("Progress exported to {}", path.display())),
                    ),
                    Err(err) => {
                        log::warn!("export failed: {err}");
                        show_notice(notice, Notice::error(format!("Export failed: {err}")));
                    }
                }
            });
        })
    };

    let on_reset = {
        let tracker = ctx.tracker();
        use_callback(move |()| {
            let tracker = tracker.clone();
            let mut state = state;
            confirm_reset.set(false);
            spawn(async move {
                let mut guard = tracker.lock().await;
                match guard.reset().await {
                    Ok(()) => show_notice(notice, Notice::success("Progress reset successfully!")),
                    Err(err) => {
                        log::warn!("reset failed: {err}");
                        show_notice(notice, Notice::error(format!("Reset failed: {err}")));
                    }
                }
                state.set(ViewState::Ready(map_dashboard(&guard)));
            });
        })
    };

    let vm = match state() {
        ViewState::Loading => {
            return rsx! {
                div { class: "app",
                    p { class: "loading", "Loading topics..." }
                }
            };
        }
        ViewState::Ready(vm) => vm,
    };
    let root_class = format!("app {}", vm.theme.css_class());
    let is_dark = vm.theme.is_dark();
    let current_notice = notice();
    let import_value = import_path();

    rsx! {
        div { class: "{root_class}",
            Sidebar { items: vm.nav.clone(), stats: vm.stats, on_select }
            main { class: "main-content",
                if let Some(current) = current_notice {
                    div { class: current.css_class(), role: "status", "{current.message}" }
                }

                div { class: "action-bar",
                    label { class: "theme-toggle",
                        input {
                            r#type: "checkbox",
                            checked: is_dark,
                            onchange: move |_| on_theme.call(()),
                        }
                        span { "Dark mode" }
                    }
                    input {
                        class: "import-path",
                        r#type: "text",
                        placeholder: "Path to learning-progress JSON",
                        value: "{import_value}",
                        oninput: move |evt: FormEvent| import_path.set(evt.value()),
                    }
                    button { r#type: "button", onclick: move |_| on_import.call(()), "Import" }
                    button { r#type: "button", onclick: move |_| on_export.call(()), "Export" }
                    if confirm_reset() {
                        span { class: "confirm",
                            "Are you sure you want to reset all progress? This action cannot be undone."
                            button {
                                r#type: "button",
                                class: "danger",
                                onclick: move |_| on_reset.call(()),
                                "Reset"
                            }
                            button {
                                r#type: "button",
                                onclick: move |_| confirm_reset.set(false),
                                "Cancel"
                            }
                        }
                    } else {
                        button {
                            r#type: "button",
                            class: "danger",
                            onclick: move |_| confirm_reset.set(true),
                            "Reset"
                        }
                    }
                }

                if let Some(header) = vm.header.clone() {
                    h2 { class: "category-title", "{header.label}" }
                    p { class: "category-description", "{header.description}" }
                }

                div { class: "topics",
                    if vm.phases.is_empty() {
                        p { class: "loading", "No topics found" }
                    } else {
                        for card in vm.phases.clone() {
                            PhaseCard { key: "{card.badge}", card, on_toggle }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn Sidebar(items: Vec<CategoryNavVm>, stats: StatsVm, on_select: Callback<CategoryId>) -> Element {
    rsx! {
        nav { class: "sidebar",
            h1 { "Learning Path" }
            div { class: "category-nav",
                for item in items {
                    CategoryButton { key: "{item.id}", item, on_select }
                }
            }
            div { class: "progress-stats",
                p { "Completed: {stats.completed} / {stats.total}" }
                div { class: "progress-bar",
                    div { class: "progress-fill", style: "width: {stats.bar_width}%" }
                }
                p { class: "progress-percentage", "{stats.percentage}%" }
            }
        }
    }
}

#[component]
fn CategoryButton(item: CategoryNavVm, on_select: Callback<CategoryId>) -> Element {
    let id = item.id.clone();
    rsx! {
        button {
            class: if item.active { "category-btn active" } else { "category-btn" },
            r#type: "button",
            title: "{item.label}",
            onclick: move |_| on_select.call(id.clone()),
            span { class: "icon", "{item.icon}" }
            span { class: "label", "{item.label}" }
        }
    }
}

#[component]
fn PhaseCard(card: PhaseCardVm, on_toggle: Callback<SubtopicKey>) -> Element {
    rsx! {
        div { class: "topic-card",
            div { class: "topic-header",
                span { class: "phase-badge", "{card.badge}" }
                span { class: "topic-title", "{card.title}" }
                div { class: "completion-percentage",
                    div { class: "value", "{card.percentage}%" }
                    div { class: "label", "complete" }
                }
            }
            div { class: "subtopics-list",
                for subtopic in card.subtopics.clone() {
                    SubtopicRow { key: "{subtopic.dom_id}", subtopic, on_toggle }
                }
            }
        }
    }
}

#[component]
fn SubtopicRow(subtopic: SubtopicVm, on_toggle: Callback<SubtopicKey>) -> Element {
    let key = subtopic.key.clone();
    rsx! {
        div { class: "subtopic-item",
            input {
                r#type: "checkbox",
                id: "{subtopic.dom_id}",
                checked: subtopic.checked,
                onchange: move |_| on_toggle.call(key.clone()),
            }
            label { r#for: "{subtopic.dom_id}", "{subtopic.label}" }
        }
    }
}
