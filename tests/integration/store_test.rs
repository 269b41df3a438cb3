//! Persisted-store tests: durability across reopen, corrupt-file
//! handling, cross-writer notification, and echo suppression.

use std::fs;
use std::sync::mpsc;
use std::time::Duration;

use prompt_stash::models::{PromptRecord, StashConfig};
use prompt_stash::services::library::PromptLibrary;
use prompt_stash::storage::store::{StashStore, KEY_CONFIG, KEY_PROMPTS};

#[test]
fn test_library_state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();

    let store = StashStore::new(dir.path().to_path_buf()).unwrap();
    let mut lib = PromptLibrary::new(store);
    lib.initialize();
    let count = lib.prompts().len();
    drop(lib);

    let store = StashStore::new(dir.path().to_path_buf()).unwrap();
    let reopened = PromptLibrary::new(store);
    assert_eq!(reopened.prompts().len(), count);
    assert!(reopened.config().is_initialized);
}

#[test]
fn test_corrupt_prompts_file_reads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("prompts.json"), "#### not json ####").unwrap();

    let store = StashStore::new(dir.path().to_path_buf()).unwrap();
    let prompts: Vec<PromptRecord> = store.load(KEY_PROMPTS, vec![]);
    assert!(prompts.is_empty());
}

#[test]
fn test_corrupt_config_falls_back_to_default() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("config.json"), "{\"selected\": 42}").unwrap();

    let store = StashStore::new(dir.path().to_path_buf()).unwrap();
    let config: StashConfig = store.load(KEY_CONFIG, StashConfig::default());
    assert_eq!(config, StashConfig::default());
}

#[test]
fn test_external_writer_notifies_subscriber() {
    let dir = tempfile::tempdir().unwrap();
    let reader = StashStore::new(dir.path().to_path_buf()).unwrap();
    let writer = StashStore::new(dir.path().to_path_buf()).unwrap();

    let (tx, rx) = mpsc::channel();
    let _sub = reader
        .subscribe(KEY_PROMPTS, move |prompts: Vec<PromptRecord>| {
            let _ = tx.send(prompts);
        })
        .unwrap();

    let mut lib = PromptLibrary::new(writer);
    lib.initialize();

    let received = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(received.len(), lib.prompts().len());
}

#[test]
fn test_own_writes_are_not_echoed_back() {
    let dir = tempfile::tempdir().unwrap();
    let store = StashStore::new(dir.path().to_path_buf()).unwrap();

    let (tx, rx) = mpsc::channel();
    let _sub = store
        .subscribe(KEY_PROMPTS, move |prompts: Vec<PromptRecord>| {
            let _ = tx.send(prompts);
        })
        .unwrap();

    let mut lib = PromptLibrary::new(store);
    lib.initialize();

    assert!(rx.recv_timeout(Duration::from_secs(1)).is_err());
}

#[test]
fn test_last_write_wins_between_writers() {
    let dir = tempfile::tempdir().unwrap();
    let a = StashStore::new(dir.path().to_path_buf()).unwrap();
    let b = StashStore::new(dir.path().to_path_buf()).unwrap();

    a.save(KEY_PROMPTS, &vec!["from-a".to_string()]);
    b.save(KEY_PROMPTS, &vec!["from-b".to_string()]);

    let read: Vec<String> = a.load(KEY_PROMPTS, vec![]);
    assert_eq!(read, vec!["from-b".to_string()]);
}
