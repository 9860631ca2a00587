use tracker_core::model::{CategoryId, PhaseKey, SubtopicKey};

use super::test_harness::{builtin_tracker, setup_view_harness};

fn ms_sql_key(index: usize) -> SubtopicKey {
    SubtopicKey::new(
        CategoryId::new("MS_SQL").unwrap(),
        PhaseKey::new("Phase-1.0").unwrap(),
        index,
    )
}

#[tokio::test(flavor = "current_thread")]
async fn dashboard_smoke_renders_builtin_catalog() {
    let mut harness = setup_view_harness(builtin_tracker().await, None);
    harness.mount().await;
    let html = harness.render();

    for expected in ["MS SQL Server", "Oracle", "Phase-1.0", "Completed: 0 / 20"] {
        assert!(html.contains(expected), "missing {expected} in {html}");
    }
    assert!(html.contains("light-mode"), "missing theme class in {html}");
    assert!(html.contains("MS_SQL-Phase-1.0-0"), "missing sub-topic id in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn dashboard_smoke_reflects_stored_progress() {
    let mut tracker = builtin_tracker().await;
    tracker.set_completed(&ms_sql_key(0), true).await.unwrap();
    tracker.set_completed(&ms_sql_key(3), true).await.unwrap();

    let mut harness = setup_view_harness(tracker, None);
    harness.mount().await;
    let html = harness.render();
    assert!(html.contains("Completed: 2 / 20"), "missing counters in {html}");
    assert!(html.contains("40%"), "missing phase percentage in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn dashboard_smoke_shows_empty_category_placeholder() {
    let mut tracker = builtin_tracker().await;
    tracker
        .import_text(r#"{"topics": {"AI": []}}"#)
        .await
        .unwrap();

    let mut harness = setup_view_harness(tracker, None);
    harness.mount().await;
    let html = harness.render();
    assert!(html.contains("No topics found"), "missing placeholder in {html}");
    assert!(html.contains("AI Fundamentals"), "missing header in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn dashboard_smoke_renders_startup_notice_and_dark_theme() {
    let mut tracker = builtin_tracker().await;
    tracker.toggle_theme().await.unwrap();

    let mut harness = setup_view_harness(tracker, Some("Could not load topics"));
    harness.mount().await;
    let html = harness.render();
    assert!(html.contains("toast error"), "missing toast in {html}");
    assert!(html.contains("Could not load topics"), "missing message in {html}");
    assert!(html.contains("dark-mode"), "missing theme class in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn harness_shares_tracker_with_view() {
    let harness = setup_view_harness(builtin_tracker().await, None);
    let tracker = harness.tracker.lock().await;
    assert_eq!(tracker.catalog().category_count(), 4);
}
