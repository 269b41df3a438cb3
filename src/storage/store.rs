//! Persisted Key-Value Store
//!
//! Durable storage for the stash collections: one JSON file per key under
//! the stash directory. Semantics follow a last-write-wins model with no
//! locking; concurrent writers (other processes sharing the directory)
//! clobber each other silently.
//!
//! `subscribe` delivers changes made by OTHER writers via file watching.
//! Writes made through the same `StashStore` instance are suppressed by
//! comparing content digests, so a writer never receives its own change
//! notifications back.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{new_debouncer, Debouncer};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::utils::error::{AppError, AppResult};
use crate::utils::paths::{ensure_dir, ensure_stash_dir, store_key_path};

/// Store key for the prompt collection
pub const KEY_PROMPTS: &str = "prompts";
/// Store key for the drafts map
pub const KEY_DRAFTS: &str = "drafts";
/// Store key for the config record
pub const KEY_CONFIG: &str = "config";
/// Store key for the chat transcript
pub const KEY_TRANSCRIPT: &str = "transcript";

/// Debounce window for change notifications
const DEBOUNCE_MS: u64 = 200;

type DigestMap = Arc<Mutex<HashMap<String, [u8; 32]>>>;

/// Durable key-addressed JSON store
///
/// Cheap to clone; clones share the same echo-suppression state, so all
/// handles cloned from one store count as the same writer.
#[derive(Clone)]
pub struct StashStore {
    dir: PathBuf,
    /// Digest of the last content this instance wrote per key,
    /// used to suppress echo notifications
    own_writes: DigestMap,
}

/// Active change subscription; dropping it stops the watcher.
pub struct StoreSubscription {
    _debouncer: Debouncer<RecommendedWatcher>,
}

impl StashStore {
    /// Create a store over the given directory, creating it if needed.
    pub fn new(dir: PathBuf) -> AppResult<Self> {
        ensure_dir(&dir)?;
        Ok(Self {
            dir,
            own_writes: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    /// Create a store over the default stash directory (~/.prompt-stash/).
    pub fn open_default() -> AppResult<Self> {
        Self::new(ensure_stash_dir()?)
    }

    /// The directory backing this store.
    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    /// Load the value stored under `key`.
    ///
    /// Absent file, unreadable file, and parse failure all yield the
    /// supplied default; parse failures are logged, never surfaced.
    pub fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let path = store_key_path(&self.dir, key);
        if !path.exists() {
            return default;
        }
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                warn!(key, error = %e, "Failed to read store file, using default");
                return default;
            }
        };
        match serde_json::from_str(&content) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "Failed to parse store file, using default");
                default
            }
        }
    }

    /// Persist `value` under `key`, best effort.
    ///
    /// Serialization or I/O failures are logged and swallowed; the caller
    /// never sees them (no durability guarantee beyond last write wins).
    pub fn save<T: Serialize>(&self, key: &str, value: &T) {
        let content = match serde_json::to_string_pretty(value) {
            Ok(content) => content,
            Err(e) => {
                warn!(key, error = %e, "Failed to serialize store value, write skipped");
                return;
            }
        };

        // Record the digest before writing so the watcher callback sees it
        // even if the notification races the write.
        let digest = content_digest(content.as_bytes());
        if let Ok(mut own) = self.own_writes.lock() {
            own.insert(key.to_string(), digest);
        }

        let path = store_key_path(&self.dir, key);
        if let Err(e) = fs::write(&path, content) {
            warn!(key, error = %e, "Failed to write store file");
        }
    }

    /// Subscribe to external changes of `key`.
    ///
    /// `on_change` receives the freshly parsed value whenever another
    /// writer modifies the key's file. Changes written through this store
    /// instance are not delivered. The subscription ends when the returned
    /// handle is dropped.
    pub fn subscribe<T, F>(&self, key: &str, on_change: F) -> AppResult<StoreSubscription>
    where
        T: DeserializeOwned + Send + 'static,
        F: Fn(T) + Send + 'static,
    {
        let watched_file = store_key_path(&self.dir, key);
        let own_writes = self.own_writes.clone();
        let key_owned = key.to_string();

        let mut debouncer = new_debouncer(
            Duration::from_millis(DEBOUNCE_MS),
            move |result: Result<Vec<notify_debouncer_mini::DebouncedEvent>, notify::Error>| {
                let events = match result {
                    Ok(events) => events,
                    Err(e) => {
                        warn!(key = %key_owned, error = %e, "Store watcher error");
                        return;
                    }
                };
                for event in events {
                    if event.path != watched_file {
                        continue;
                    }
                    let content = match fs::read(&watched_file) {
                        Ok(content) => content,
                        Err(e) => {
                            debug!(key = %key_owned, error = %e, "Changed store file unreadable");
                            continue;
                        }
                    };
                    // Suppress echo of our own writes.
                    let digest = content_digest(&content);
                    let is_own = own_writes
                        .lock()
                        .map(|own| own.get(&key_owned) == Some(&digest))
                        .unwrap_or(false);
                    if is_own {
                        continue;
                    }
                    match serde_json::from_slice::<T>(&content) {
                        Ok(value) => on_change(value),
                        Err(e) => {
                            warn!(key = %key_owned, error = %e, "External change unparsable, skipped");
                        }
                    }
                }
            },
        )
        .map_err(|e| AppError::internal(format!("Failed to create store watcher: {}", e)))?;

        // Watch the directory, not the file: the key's file may not exist
        // yet, and watching the parent catches creation too.
        debouncer
            .watcher()
            .watch(&self.dir, RecursiveMode::NonRecursive)
            .map_err(|e| {
                AppError::internal(format!("Failed to watch store directory: {}", e))
            })?;

        Ok(StoreSubscription {
            _debouncer: debouncer,
        })
    }
}

fn content_digest(content: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hasher.finalize().into()
}
