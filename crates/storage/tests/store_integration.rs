use std::sync::Arc;

use course_core::model::{ProgressDocument, UnitId};
use course_core::time::fixed_now;
use storage::{keys, FileStore, LocalStore, NullSession, ProgressBridge};

fn document_with(ids: &[u32]) -> ProgressDocument {
    let now = fixed_now();
    let mut doc = ProgressDocument::empty(now);
    for id in ids {
        doc.mark_completed(UnitId::new(*id), now);
    }
    doc
}

#[test]
fn file_store_round_trips_across_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("presenter-data.json");

    {
        let store = FileStore::open(&path).unwrap();
        store.set(keys::PROGRESS, r#"{"completedUnits":[1,2]}"#).unwrap();
        store.set(keys::LOCATION, "unit_2_completed").unwrap();
    }

    let reopened = FileStore::open(&path).unwrap();
    assert_eq!(
        reopened.get(keys::PROGRESS).unwrap().as_deref(),
        Some(r#"{"completedUnits":[1,2]}"#)
    );
    assert_eq!(
        reopened.get(keys::LOCATION).unwrap().as_deref(),
        Some("unit_2_completed")
    );
    assert_eq!(reopened.get(keys::STATUS).unwrap(), None);
}

#[test]
fn file_store_treats_a_corrupt_file_as_empty() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("data.json");
    std::fs::write(&path, "]]] nonsense").unwrap();

    let store = FileStore::open(&path).unwrap();
    assert_eq!(store.get(keys::PROGRESS).unwrap(), None);

    // It heals on the next write.
    store.set(keys::STATUS, "completed").unwrap();
    let reopened = FileStore::open(&path).unwrap();
    assert_eq!(reopened.get(keys::STATUS).unwrap().as_deref(), Some("completed"));
}

#[test]
fn file_store_creates_missing_parent_directories() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nested/deeper/data.json");

    let store = FileStore::open(&path).unwrap();
    store.set(keys::PROGRESS, "{}").unwrap();
    assert!(path.exists());
}

#[test]
fn bridge_persists_progress_to_disk_in_demo_mode() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("data.json");

    {
        let store = Arc::new(FileStore::open(&path).unwrap());
        let bridge = ProgressBridge::new(Arc::new(NullSession), store);
        bridge.save(&document_with(&[3, 5])).unwrap();
    }

    // A fresh process (new store, new bridge) sees the same document.
    let store = Arc::new(FileStore::open(&path).unwrap());
    let bridge = ProgressBridge::new(Arc::new(NullSession), store);
    let loaded = bridge.load(fixed_now());
    let ids: Vec<u32> = loaded.completed().iter().map(UnitId::value).collect();
    assert_eq!(ids, vec![3, 5]);
}
