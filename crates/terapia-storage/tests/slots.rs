use terapia_storage::kv::{FileStore, KeyValueStore, MemoryStore};
use terapia_storage::state::{load_state, save_state};

#[test]
fn memory_store_batch_sets_and_removes() {
    let store = MemoryStore::default();
    store
        .write_batch(&[("auth_token", Some("abc")), ("auth_user", Some("{}"))])
        .unwrap();
    assert_eq!(store.get("auth_token").unwrap().as_deref(), Some("abc"));

    store
        .write_batch(&[("auth_token", None), ("auth_user", None)])
        .unwrap();
    assert_eq!(store.get("auth_token").unwrap(), None);
    assert_eq!(store.get("auth_user").unwrap(), None);
}

#[test]
fn file_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("session.json");

    {
        let store = FileStore::open(&path).unwrap();
        store.set("auth_token", "tok-1").unwrap();
        save_state(&store, "auth_user", &vec!["ADMIN".to_string()]).unwrap();
    }

    let reopened = FileStore::open(&path).unwrap();
    assert_eq!(reopened.get("auth_token").unwrap().as_deref(), Some("tok-1"));
    let roles: Option<Vec<String>> = load_state(&reopened, "auth_user").unwrap();
    assert_eq!(roles, Some(vec!["ADMIN".to_string()]));
    assert!(!path.with_extension("json.tmp").exists());
}

#[cfg(unix)]
#[test]
fn file_store_is_private() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    let store = FileStore::open(&path).unwrap();
    store.set("auth_token", "tok").unwrap();

    let mode = std::fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[test]
fn corrupt_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, "not json").unwrap();
    assert!(FileStore::open(&path).is_err());
}

#[test]
fn empty_slot_loads_as_none() {
    let store = MemoryStore::default();
    let loaded: Option<String> = load_state(&store, "missing").unwrap();
    assert!(loaded.is_none());
}
