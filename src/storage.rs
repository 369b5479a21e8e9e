//! Durable string key-value storage behind the session stores.
//!
//! Mirrors the browser-storage contract the portal relies on: synchronous
//! reads from an in-memory view, last-write-wins on mutation, no multi-key
//! transactions. `FileStorage` persists the whole map as one JSON object.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::errors::{AppError, AppResult};

/// Fixed storage keys shared by the stores.
pub mod keys {
    pub const TOKEN: &str = "acesse.token";
    pub const CURRENT_USER: &str = "acesse.current_user";
    pub const LAST_SYNC: &str = "acesse.last_sync";

    /// Per-view list-display-mode preference, namespaced by the calling view.
    pub fn display_mode(namespace: &str) -> String {
        format!("acesse.display_mode.{namespace}")
    }
}

pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> AppResult<()>;
    fn remove(&self, key: &str) -> AppResult<()>;
}

/// Ephemeral storage for tests and non-persistent sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().expect("storage lock poisoned").get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.entries
            .lock()
            .expect("storage lock poisoned")
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        self.entries.lock().expect("storage lock poisoned").remove(key);
        Ok(())
    }
}

/// File-backed storage: the map is loaded once at open and the whole file is
/// rewritten on every mutation. Single writer by construction.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileStorage {
    /// Opens (or creates) the backing file. An unreadable or non-JSON file is
    /// treated as empty rather than failing the session bootstrap.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<HashMap<String, String>>(&raw) {
                Ok(map) => map,
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "discarding corrupt storage file");
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };

        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    fn flush(&self, entries: &HashMap<String, String>) -> AppResult<()> {
        let raw = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, raw)
            .map_err(|err| AppError::storage(format!("{}: {err}", self.path.display())))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().expect("storage lock poisoned").get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let mut entries = self.entries.lock().expect("storage lock poisoned");
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries)
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        let mut entries = self.entries.lock().expect("storage lock poisoned");
        if entries.remove(key).is_none() {
            return Ok(());
        }
        self.flush(&entries)
    }
}
