//! Key-value preference storage.
//!
//! Values are plain strings so the stored format stays readable and
//! forward compatible. Persistence is best effort: a failed write is
//! logged and otherwise ignored.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Delay in seconds, decimal string.
pub const DELAY_KEY: &str = "delay_seconds";
/// Grid lines per axis, integer string.
pub const GRID_COUNT_KEY: &str = "grid_count";
/// Grid overlay shown, "true"/"false".
pub const GRID_ENABLED_KEY: &str = "grid_enabled";
/// Mirroring enabled, "true"/"false".
pub const MIRROR_ENABLED_KEY: &str = "mirror_enabled";

/// Local, synchronous preference store.
pub trait SettingsStore {
    /// Stored value for `key`.
    fn get(&self, key: &str) -> Option<String>;
    /// Stores `value` under `key`.
    fn set(&mut self, key: &str, value: &str);
}

/// Volatile store, mostly for tests and headless runs.
#[derive(Debug, Clone, Default)]
pub struct MemorySettings {
    values: HashMap<String, String>,
}

impl MemorySettings {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }
}

/// Store backed by a TOML file of string values.
#[derive(Debug, Clone)]
pub struct FileSettings {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileSettings {
    /// Opens the store at `path`. A missing or unreadable file yields an
    /// empty store.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let values = match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable settings");
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read settings");
                BTreeMap::new()
            }
        };
        Self { path, values }
    }

    /// Backing file location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) {
        let content = match toml::to_string(&self.values) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to encode settings");
                return;
            }
        };
        if let Err(e) = std::fs::write(&self.path, content) {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to save settings");
        }
    }
}

impl SettingsStore for FileSettings {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
        self.flush();
    }
}
