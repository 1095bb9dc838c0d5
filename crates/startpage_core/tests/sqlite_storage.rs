use rusqlite::Connection;
use serde_json::json;
use startpage_core::db::migrations::latest_version;
use startpage_core::db::{open_db, DbError};
use startpage_core::{
    FixedClock, Preconfirmed, Record, SharedStorage, SqliteStorage, StorageAdapter, StorageError,
    TodoDraft, TodoService, TodoServiceError,
};
use std::sync::Arc;

#[tokio::test]
async fn todos_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("startpage.sqlite3");

    {
        let storage: SharedStorage = Arc::new(SqliteStorage::open(&path).unwrap());
        let service = TodoService::new(storage, Arc::new(FixedClock::new(10)));
        service.save(TodoDraft::new("one"), None).await.unwrap();
        service.save(TodoDraft::new("two"), None).await.unwrap();
        service.delete(0, &Preconfirmed).await.unwrap();
    }

    let storage: SharedStorage = Arc::new(SqliteStorage::open(&path).unwrap());
    let service = TodoService::new(storage, Arc::new(FixedClock::new(20)));
    let list = service.list().await.unwrap();
    let titles = list
        .iter()
        .map(|entry| entry.todo.title.as_str())
        .collect::<Vec<_>>();
    assert_eq!(titles, vec!["two"]);
}

#[tokio::test]
async fn set_overwrites_and_get_skips_missing_keys() {
    let storage = SqliteStorage::open_in_memory().unwrap();

    let mut first = Record::new();
    first.insert("backgroundType".to_string(), json!("color"));
    first.insert("backgroundColor".to_string(), json!("#abcdef"));
    storage.set(first).await.unwrap();

    let mut second = Record::new();
    second.insert("backgroundType".to_string(), json!("gradient"));
    storage.set(second).await.unwrap();

    let record = storage
        .get(&["backgroundType", "backgroundColor", "gradientColors"])
        .await
        .unwrap();
    assert_eq!(record.len(), 2);
    assert_eq!(record["backgroundType"], json!("gradient"));
    assert_eq!(record["backgroundColor"], json!("#abcdef"));
}

#[tokio::test]
async fn corrupt_row_surfaces_through_service() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("startpage.sqlite3");
    drop(open_db(&path).unwrap());

    Connection::open(&path)
        .unwrap()
        .execute(
            "INSERT INTO kv_entries (key, value) VALUES ('todos', 'oops');",
            [],
        )
        .unwrap();

    let storage: SharedStorage = Arc::new(SqliteStorage::open(&path).unwrap());
    let service = TodoService::new(storage, Arc::new(FixedClock::new(0)));
    assert!(matches!(
        service.list().await,
        Err(TodoServiceError::Storage(StorageError::Corrupt { .. }))
    ));
}

#[test]
fn newer_schema_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");
    Connection::open(&path)
        .unwrap()
        .execute_batch(&format!("PRAGMA user_version = {};", latest_version() + 1))
        .unwrap();

    let err = open_db(&path).unwrap_err();
    assert!(matches!(err, DbError::SchemaTooNew { .. }));
    assert!(matches!(
        SqliteStorage::open(&path),
        Err(StorageError::Db(DbError::SchemaTooNew { .. }))
    ));
}

#[test]
fn migrations_set_user_version() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fresh.sqlite3");
    drop(open_db(&path).unwrap());

    let version: u32 = Connection::open(&path)
        .unwrap()
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version, latest_version());
}
