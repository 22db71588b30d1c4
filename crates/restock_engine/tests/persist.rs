use std::fs;

use restock_core::{AlertStore, Timestamp};
use restock_engine::{
    load_alert_store, load_targets, save_alert_store, write_atomically, PersistError,
};
use tempfile::TempDir;

#[test]
fn saved_state_loads_back() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("state").join("instock.csv");
    let mut store = AlertStore::new();
    store.mark_alerted("https://a.example/ps5", Timestamp::from_nanos(123));
    store.set_counter("microsoft", 1);

    save_alert_store(&path, &store).unwrap();

    assert_eq!(load_alert_store(&path).unwrap(), store);
}

#[test]
fn missing_state_file_is_an_empty_store() {
    let temp = TempDir::new().unwrap();
    let store = load_alert_store(&temp.path().join("instock.csv")).unwrap();
    assert_eq!(store, AlertStore::new());
}

#[test]
fn unreadable_state_is_an_error() {
    let temp = TempDir::new().unwrap();
    let err = load_alert_store(temp.path()).unwrap_err();
    assert!(matches!(err, PersistError::Read { .. }));
}

#[test]
fn save_replaces_the_whole_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("instock.csv");
    fs::write(&path, "https://old.example/x,1\ngarbage\n").unwrap();
    let mut store = AlertStore::new();
    store.mark_alerted("https://new.example/y", Timestamp::from_nanos(2));

    save_alert_store(&path, &store).unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "https://new.example/y,2\n"
    );
}

#[test]
fn atomic_write_into_a_file_path_fails_cleanly() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("not_a_dir");
    fs::write(&blocker, "x").unwrap();

    let result = write_atomically(&blocker.join("instock.csv"), "data");

    assert!(result.is_err());
    assert_eq!(fs::read_to_string(&blocker).unwrap(), "x");
}

#[test]
fn target_list_loads_and_missing_list_fails() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("urls.csv");
    fs::write(
        &path,
        "https://a.example/ps5,Sold out,button,Add,PS5\n,broken\n",
    )
    .unwrap();

    let list = load_targets(&path).unwrap();
    assert_eq!(list.targets.len(), 1);
    assert_eq!(list.skipped.len(), 1);

    let err = load_targets(&temp.path().join("missing.csv")).unwrap_err();
    assert!(matches!(err, PersistError::Read { .. }));
}
