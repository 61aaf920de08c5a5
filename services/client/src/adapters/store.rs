//! services/client/src/adapters/store.rs
//!
//! Implementations of the `KeyValueStore` port: a JSON file that survives
//! restarts, and an in-memory map for tests and throwaway sessions.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use studysmarter_core::ports::{KeyValueStore, PortError, PortResult, StorageKey};
use tracing::{debug, trace, warn};

type Entries = BTreeMap<String, String>;

fn lock(entries: &Mutex<Entries>) -> PortResult<MutexGuard<'_, Entries>> {
    entries
        .lock()
        .map_err(|_| PortError::Storage("preference store lock poisoned".to_string()))
}

//=========================================================================================
// File-backed Store
//=========================================================================================

/// Keeps every key in one JSON object on disk.
///
/// The file is read once when opened and rewritten in full on every change.
/// Two processes sharing a file overwrite each other; the last write wins.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<Entries>,
}

impl FileStore {
    /// Opens (or lazily creates) the store at `path`.
    ///
    /// A missing file is an empty store. An unreadable or malformed file is
    /// also treated as empty so the views keep working.
    pub fn open(path: impl Into<PathBuf>) -> PortResult<Self> {
        let path: PathBuf = path.into();
        let entries = if path.exists() {
            let raw = fs::read_to_string(&path)
                .map_err(|e| PortError::Storage(format!("{}: {}", path.display(), e)))?;
            match serde_json::from_str::<Entries>(&raw) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Preference file is malformed, starting empty.");
                    Entries::new()
                }
            }
        } else {
            Entries::new()
        };
        debug!(path = %path.display(), keys = entries.len(), "Opened preference store.");

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &Entries) -> PortResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| PortError::Storage(format!("{}: {}", parent.display(), e)))?;
        }
        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| PortError::Storage(e.to_string()))?;

        // Write to a sibling file first so a crash never leaves half a document.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| PortError::Storage(format!("{}: {}", tmp.display(), e)))?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| PortError::Storage(format!("{}: {}", self.path.display(), e)))?;
        trace!(path = %self.path.display(), "Persisted preference store.");
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: StorageKey) -> PortResult<Option<String>> {
        Ok(lock(&self.entries)?.get(key.as_str()).cloned())
    }

    fn set(&self, key: StorageKey, value: &str) -> PortResult<()> {
        let mut entries = lock(&self.entries)?;
        entries.insert(key.as_str().to_string(), value.to_string());
        self.persist(&entries)
    }

    fn remove(&self, key: StorageKey) -> PortResult<()> {
        let mut entries = lock(&self.entries)?;
        if entries.remove(key.as_str()).is_some() {
            self.persist(&entries)?;
        }
        Ok(())
    }
}

//=========================================================================================
// In-memory Store
//=========================================================================================

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<Entries>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: StorageKey) -> PortResult<Option<String>> {
        Ok(lock(&self.entries)?.get(key.as_str()).cloned())
    }

    fn set(&self, key: StorageKey, value: &str) -> PortResult<()> {
        lock(&self.entries)?.insert(key.as_str().to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: StorageKey) -> PortResult<()> {
        lock(&self.entries)?.remove(key.as_str());
        Ok(())
    }
}
