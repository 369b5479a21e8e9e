use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use crate::errors::AppResult;
use crate::storage::{keys, Storage};

/// How a view renders its item list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListDisplayMode {
    List,
    Grid,
}

impl ListDisplayMode {
    fn as_str(&self) -> &'static str {
        match self {
            ListDisplayMode::List => "list",
            ListDisplayMode::Grid => "grid",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "list" => Some(ListDisplayMode::List),
            "grid" => Some(ListDisplayMode::Grid),
            _ => None,
        }
    }
}

/// Typed access to the small UI preferences kept in durable storage.
#[derive(Clone)]
pub struct Preferences {
    storage: Arc<dyn Storage>,
}

impl Preferences {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Stored as epoch millis, as a string.
    pub fn set_last_sync(&self, at: DateTime<Utc>) -> AppResult<()> {
        self.storage.set(keys::LAST_SYNC, &at.timestamp_millis().to_string())
    }

    /// None when never synced or the stored value does not parse.
    pub fn last_sync(&self) -> Option<DateTime<Utc>> {
        let raw = self.storage.get(keys::LAST_SYNC)?;
        let millis = raw.parse::<i64>().ok()?;
        Utc.timestamp_millis_opt(millis).single()
    }

    pub fn set_display_mode(&self, namespace: &str, mode: ListDisplayMode) -> AppResult<()> {
        self.storage.set(&keys::display_mode(namespace), mode.as_str())
    }

    pub fn display_mode(&self, namespace: &str) -> Option<ListDisplayMode> {
        self.storage
            .get(&keys::display_mode(namespace))
            .and_then(|raw| ListDisplayMode::parse(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn last_sync_roundtrip() {
        let prefs = Preferences::new(Arc::new(MemoryStorage::new()));
        assert!(prefs.last_sync().is_none());

        let at = Utc.timestamp_millis_opt(1_724_500_000_123).single().unwrap();
        prefs.set_last_sync(at).unwrap();
        assert_eq!(prefs.last_sync(), Some(at));
    }

    #[test]
    fn display_mode_is_per_namespace() {
        let prefs = Preferences::new(Arc::new(MemoryStorage::new()));

        prefs.set_display_mode("solicitations", ListDisplayMode::Grid).unwrap();
        assert_eq!(prefs.display_mode("solicitations"), Some(ListDisplayMode::Grid));
        assert_eq!(prefs.display_mode("documents"), None);
    }

    #[test]
    fn garbage_stored_values_read_as_none() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(keys::LAST_SYNC, "yesterday").unwrap();
        storage.set(&keys::display_mode("pipeline"), "mosaic").unwrap();

        let prefs = Preferences::new(storage);
        assert!(prefs.last_sync().is_none());
        assert!(prefs.display_mode("pipeline").is_none());
    }
}
