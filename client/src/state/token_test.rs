use super::*;

fn temp_token_path() -> PathBuf {
    std::env::temp_dir()
        .join(format!("parishat-token-{}", uuid::Uuid::new_v4()))
        .join(TOKEN_KEY)
}

// =============================================================================
// MemoryTokenStore
// =============================================================================

#[test]
fn memory_store_starts_empty() {
    let store = MemoryTokenStore::new();
    assert_eq!(store.load().unwrap(), None);
}

#[test]
fn memory_store_round_trips_token() {
    let store = MemoryTokenStore::new();
    store.store("abc").unwrap();
    assert_eq!(store.load().unwrap().as_deref(), Some("abc"));
    store.clear().unwrap();
    assert_eq!(store.load().unwrap(), None);
}

#[test]
fn memory_store_last_write_wins() {
    let store = MemoryTokenStore::new();
    store.store("first").unwrap();
    store.store("second").unwrap();
    assert_eq!(store.load().unwrap().as_deref(), Some("second"));
}

#[test]
fn memory_store_with_token_is_silent() {
    let store = MemoryTokenStore::with_token("seed");
    let mut rx = store.subscribe();
    assert_eq!(store.load().unwrap().as_deref(), Some("seed"));
    assert!(rx.try_recv().is_err());
}

#[test]
fn memory_store_announces_changes() {
    let store = MemoryTokenStore::new();
    let mut rx = store.subscribe();
    store.store("abc").unwrap();
    store.clear().unwrap();
    assert_eq!(rx.try_recv().unwrap(), TokenChange { key: TOKEN_KEY, present: true });
    assert_eq!(rx.try_recv().unwrap(), TokenChange { key: TOKEN_KEY, present: false });
}

#[test]
fn memory_store_unchanged_writes_are_silent() {
    let store = MemoryTokenStore::new();
    let mut rx = store.subscribe();
    store.clear().unwrap();
    store.store("abc").unwrap();
    store.store("abc").unwrap();
    assert_eq!(rx.try_recv().unwrap().present, true);
    assert!(rx.try_recv().is_err());
}

// =============================================================================
// FileTokenStore
// =============================================================================

#[test]
fn file_store_missing_file_is_none() {
    let store = FileTokenStore::new(temp_token_path());
    assert_eq!(store.load().unwrap(), None);
}

#[test]
fn file_store_creates_parent_and_persists() {
    let path = temp_token_path();
    let store = FileTokenStore::new(&path);
    store.store("file-token").unwrap();

    let reopened = FileTokenStore::new(&path);
    assert_eq!(reopened.load().unwrap().as_deref(), Some("file-token"));

    store.clear().unwrap();
    assert!(!path.exists());
    let _ = std::fs::remove_dir_all(path.parent().unwrap());
}

#[test]
fn file_store_trims_and_ignores_blank_contents() {
    let path = temp_token_path();
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "  tok\n").unwrap();
    let store = FileTokenStore::new(&path);
    assert_eq!(store.load().unwrap().as_deref(), Some("tok"));

    std::fs::write(&path, "\n").unwrap();
    assert_eq!(store.load().unwrap(), None);
    let _ = std::fs::remove_dir_all(path.parent().unwrap());
}

#[test]
fn file_store_clear_missing_file_is_ok() {
    let store = FileTokenStore::new(temp_token_path());
    let mut rx = store.subscribe();
    store.clear().unwrap();
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn file_store_watch_detects_external_write() {
    let path = temp_token_path();
    let store = Arc::new(FileTokenStore::new(&path));
    let mut rx = store.subscribe();
    let watcher = Arc::clone(&store).watch(Duration::from_millis(10));

    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "from-another-process").unwrap();

    let change = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("change within timeout")
        .unwrap();
    assert_eq!(change, TokenChange { key: TOKEN_KEY, present: true });

    watcher.abort();
    let _ = std::fs::remove_dir_all(path.parent().unwrap());
}
