use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::Mutex;

/// Durable per-device key/value store for user preferences
///
/// Mirrors browser localStorage semantics: reads return the stored JSON value
/// or nothing, and writes are best-effort. A failed write leaves the in-memory
/// configuration authoritative for the session; no error surfaces to callers.
pub trait PreferenceStore: Send + Sync {
    fn read(&self, key: &str) -> Option<Value>;
    fn write(&self, key: &str, value: Value);
}

/// Preference store backed by a single JSON file on disk
pub struct JsonFilePreferences {
    path: PathBuf,
    entries: Mutex<Map<String, Value>>,
}

impl JsonFilePreferences {
    /// Opens the store, loading existing entries from `path`. A missing or
    /// corrupt file starts the store empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<Map<String, Value>>(&raw) {
                Ok(map) => map,
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "Discarding corrupt preference file");
                    Map::new()
                }
            },
            Err(_) => Map::new(),
        };

        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    fn flush(&self, entries: &Map<String, Value>) {
        let json = match serde_json::to_string_pretty(entries) {
            Ok(j) => j,
            Err(e) => {
                tracing::warn!(error = %e, "Preference serialization error");
                return;
            }
        };

        if let Err(e) = std::fs::write(&self.path, json) {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to persist preferences");
        }
    }
}

impl PreferenceStore for JsonFilePreferences {
    fn read(&self, key: &str) -> Option<Value> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn write(&self, key: &str, value: Value) {
        let Ok(mut entries) = self.entries.lock() else {
            return;
        };
        entries.insert(key.to_string(), value);
        self.flush(&entries);
    }
}

/// In-memory preference store, used in tests and when no file path is wanted
#[derive(Default)]
pub struct MemoryPreferences {
    entries: Mutex<Map<String, Value>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferences {
    fn read(&self, key: &str) -> Option<Value> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn write(&self, key: &str, value: Value) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value);
        }
    }
}
