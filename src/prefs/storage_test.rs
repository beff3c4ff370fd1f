use super::*;

fn temp_dir(label: &str) -> PathBuf {
    std::env::temp_dir().join(format!("sessiongate-{label}-{}", Uuid::new_v4().simple()))
}

// =============================================================================
// MemoryStorage
// =============================================================================

#[tokio::test]
async fn memory_set_get_remove() {
    let storage = MemoryStorage::new();
    assert_eq!(storage.get_item("k").await.unwrap(), None);

    storage.set_item("k", "v").await.unwrap();
    assert_eq!(storage.get_item("k").await.unwrap().as_deref(), Some("v"));

    storage.remove_item("k").await.unwrap();
    assert_eq!(storage.get_item("k").await.unwrap(), None);
    assert!(storage.is_empty());
}

#[tokio::test]
async fn memory_clones_share_items() {
    let storage = MemoryStorage::new();
    let restarted = storage.clone();
    storage.set_item("k", "v").await.unwrap();
    assert_eq!(restarted.get_item("k").await.unwrap().as_deref(), Some("v"));
}

#[tokio::test]
async fn memory_failing_rejects_writes_and_keeps_items() {
    let storage = MemoryStorage::new();
    storage.set_item("k", "old").await.unwrap();
    storage.set_failing(true);

    let err = storage.set_item("k", "new").await.unwrap_err();
    assert!(matches!(err, StorageError::Unavailable(_)));
    assert_eq!(storage.raw("k").as_deref(), Some("old"));
}

// =============================================================================
// FileStorage
// =============================================================================

#[tokio::test]
async fn file_missing_item_is_none() {
    let storage = FileStorage::new(temp_dir("missing"));
    assert_eq!(storage.get_item("@app_theme").await.unwrap(), None);
}

#[tokio::test]
async fn file_round_trip_survives_new_instance() {
    let dir = temp_dir("roundtrip");
    let storage = FileStorage::new(&dir);
    storage.set_item("@app_theme", "\"dark\"").await.unwrap();

    let reopened = FileStorage::new(&dir);
    assert_eq!(reopened.get_item("@app_theme").await.unwrap().as_deref(), Some("\"dark\""));

    tokio::fs::remove_dir_all(&dir).await.unwrap();
}

#[tokio::test]
async fn file_overwrite_leaves_no_temp_files() {
    let dir = temp_dir("overwrite");
    let storage = FileStorage::new(&dir);
    storage.set_item("k", "1").await.unwrap();
    storage.set_item("k", "2").await.unwrap();

    let mut entries = tokio::fs::read_dir(&dir).await.unwrap();
    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await.unwrap() {
        names.push(entry.file_name().to_string_lossy().to_string());
    }
    assert_eq!(names, vec![format!("{}.item", bytes_to_hex(b"k"))]);
    assert_eq!(storage.get_item("k").await.unwrap().as_deref(), Some("2"));

    tokio::fs::remove_dir_all(&dir).await.unwrap();
}

#[tokio::test]
async fn file_remove_absent_item_succeeds() {
    let storage = FileStorage::new(temp_dir("remove"));
    storage.remove_item("nothing").await.unwrap();
}

#[tokio::test]
async fn file_keys_with_separators_map_to_distinct_files() {
    let dir = temp_dir("separators");
    let storage = FileStorage::new(&dir);
    storage.set_item("a/b", "1").await.unwrap();
    storage.set_item("a:b", "2").await.unwrap();

    assert_eq!(storage.get_item("a/b").await.unwrap().as_deref(), Some("1"));
    assert_eq!(storage.get_item("a:b").await.unwrap().as_deref(), Some("2"));

    tokio::fs::remove_dir_all(&dir).await.unwrap();
}
