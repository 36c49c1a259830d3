//! Integration tests for the persisted reference-image history.
//!
//! Each test creates its own in-memory SQLite database for isolation.

use nami::remix::{ReferenceHistory, HISTORY_KEY};
use nami::storage::Database;
use pretty_assertions::assert_eq;

async fn test_db() -> Database {
    Database::open(":memory:").await.unwrap()
}

// ============================================================================
// Persistence
// ============================================================================

#[tokio::test]
async fn test_empty_when_nothing_stored() {
    let db = test_db().await;
    let history = ReferenceHistory::load(&db, 5).await.unwrap();
    assert!(history.is_empty());
}

#[tokio::test]
async fn test_save_and_reload() {
    let db = test_db().await;
    let mut history = ReferenceHistory::new(5);
    history.record(["jersey.png", "stadium.jpg"]);
    history.save(&db).await.unwrap();

    let reloaded = ReferenceHistory::load(&db, 5).await.unwrap();
    assert_eq!(reloaded.entries(), ["jersey.png", "stadium.jpg"]);
}

#[tokio::test]
async fn test_stored_as_json_array() {
    let db = test_db().await;
    let mut history = ReferenceHistory::new(5);
    history.push("a.png");
    history.save(&db).await.unwrap();

    let raw = db.get_preference(HISTORY_KEY).await.unwrap().unwrap();
    assert_eq!(raw, r#"["a.png"]"#);
}

#[tokio::test]
async fn test_smaller_limit_truncates_on_load() {
    let db = test_db().await;
    let mut history = ReferenceHistory::new(10);
    for name in ["1.png", "2.png", "3.png", "4.png"] {
        history.push(name);
    }
    history.save(&db).await.unwrap();

    let reloaded = ReferenceHistory::load(&db, 2).await.unwrap();
    assert_eq!(reloaded.entries(), ["4.png", "3.png"]);
}

#[tokio::test]
async fn test_duplicates_in_stored_row_collapse() {
    let db = test_db().await;
    db.set_preference(HISTORY_KEY, r#"["a.png", "b.png", "a.png"]"#)
        .await
        .unwrap();

    let history = ReferenceHistory::load(&db, 5).await.unwrap();
    assert_eq!(history.entries(), ["a.png", "b.png"]);
}

// ============================================================================
// Recovery & Reset
// ============================================================================

#[tokio::test]
async fn test_corrupt_row_starts_empty() {
    let db = test_db().await;
    db.set_preference(HISTORY_KEY, "{not json").await.unwrap();

    let history = ReferenceHistory::load(&db, 5).await.unwrap();
    assert!(history.is_empty());
}

#[tokio::test]
async fn test_clear_removes_stored_copy() {
    let db = test_db().await;
    let mut history = ReferenceHistory::new(5);
    history.push("a.png");
    history.save(&db).await.unwrap();

    history.clear(&db).await.unwrap();
    assert!(history.is_empty());
    assert!(db.get_preference(HISTORY_KEY).await.unwrap().is_none());
    assert!(ReferenceHistory::load(&db, 5).await.unwrap().is_empty());
}
