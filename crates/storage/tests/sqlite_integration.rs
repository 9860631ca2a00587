use storage::repository::{KeyValueStore, Storage, StorageKey};
use storage::sqlite::SqliteRepository;

#[tokio::test]
async fn sqlite_roundtrip_persists_values_by_key() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_kv_roundtrip?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    assert_eq!(repo.get(StorageKey::Progress).await.unwrap(), None);

    repo.set(StorageKey::Progress, r#"{"AI-P-0":{"completed":true}}"#)
        .await
        .unwrap();
    repo.set(StorageKey::Theme, "\"dark\"").await.unwrap();

    assert_eq!(
        repo.get(StorageKey::Progress).await.unwrap().as_deref(),
        Some(r#"{"AI-P-0":{"completed":true}}"#)
    );
    assert_eq!(
        repo.get(StorageKey::Theme).await.unwrap().as_deref(),
        Some("\"dark\"")
    );
}

#[tokio::test]
async fn sqlite_set_overwrites_and_remove_deletes() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_kv_overwrite?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    repo.set(StorageKey::Progress, "{}").await.unwrap();
    repo.set(StorageKey::Progress, r#"{"x":{"completed":false}}"#)
        .await
        .unwrap();
    assert_eq!(
        repo.get(StorageKey::Progress).await.unwrap().as_deref(),
        Some(r#"{"x":{"completed":false}}"#)
    );

    repo.remove(StorageKey::Progress).await.unwrap();
    repo.remove(StorageKey::Progress).await.unwrap();
    assert_eq!(repo.get(StorageKey::Progress).await.unwrap(), None);
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let url = "sqlite:file:memdb_kv_migrate?mode=memory&cache=shared";
    let repo = SqliteRepository::connect(url).await.expect("connect");
    repo.migrate().await.expect("first migrate");
    repo.set(StorageKey::Topics, "{}").await.unwrap();
    repo.migrate().await.expect("second migrate");
    assert_eq!(
        repo.get(StorageKey::Topics).await.unwrap().as_deref(),
        Some("{}")
    );
}

#[tokio::test]
async fn storage_sqlite_exposes_kv_handle() {
    let storage = Storage::sqlite("sqlite:file:memdb_kv_storage?mode=memory&cache=shared")
        .await
        .expect("storage");
    storage.kv.set(StorageKey::Theme, "\"light\"").await.unwrap();
    assert!(storage.kv.get(StorageKey::Theme).await.unwrap().is_some());
}

#[tokio::test]
async fn sqlite_set_many_writes_all_or_nothing() {
    let url = "sqlite:file:memdb_kv_batch?mode=memory&cache=shared";
    let repo = SqliteRepository::connect(url).await.expect("connect");
    repo.migrate().await.expect("migrate");

    repo.set_many(&[
        (StorageKey::Topics, "{}".to_owned()),
        (StorageKey::Progress, "{}".to_owned()),
    ])
    .await
    .expect("batch");
    assert_eq!(repo.get(StorageKey::Topics).await.unwrap().as_deref(), Some("{}"));
    assert_eq!(repo.get(StorageKey::Progress).await.unwrap().as_deref(), Some("{}"));

    // Make every progress write fail from here on.
    let admin = sqlx::SqlitePool::connect(url).await.expect("second connection");
    sqlx::query(
        r"
        CREATE TRIGGER reject_progress BEFORE INSERT ON kv_entries
        WHEN NEW.key = 'progress'
        BEGIN
            SELECT RAISE(ABORT, 'disk full');
        END;
        ",
    )
    .execute(&admin)
    .await
    .expect("create insert trigger");
    sqlx::query(
        r"
        CREATE TRIGGER reject_progress_update BEFORE UPDATE ON kv_entries
        WHEN NEW.key = 'progress'
        BEGIN
            SELECT RAISE(ABORT, 'disk full');
        END;
        ",
    )
    .execute(&admin)
    .await
    .expect("create update trigger");
    admin.close().await;

    let result = repo
        .set_many(&[
            (StorageKey::Topics, r#"{"AI":[]}"#.to_owned()),
            (StorageKey::Progress, r#"{"AI-P-0":{"completed":true}}"#.to_owned()),
        ])
        .await;
    assert!(result.is_err());
    assert_eq!(repo.get(StorageKey::Topics).await.unwrap().as_deref(), Some("{}"));
    assert_eq!(repo.get(StorageKey::Progress).await.unwrap().as_deref(), Some("{}"));
}
