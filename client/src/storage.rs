//! Persistent key/value storage for scores and preferences
//!
//! Values are stored as strings under fixed keys. Every failure is absorbed
//! here: callers always get an answer, and a failed write leaves the
//! in-memory value in place.

use crate::error::StorageError;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

pub const HIGH_SCORE_KEY: &str = "snake_high";
pub const THEME_KEY: &str = "snake_theme";
pub const LEADERBOARD_KEY: &str = "snake_lb";

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError>;
}

/// Store backed by a single JSON object on disk.
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStore {
    /// Opens the store at `path`. A missing or unreadable file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match Self::load(&path) {
            Ok(values) => values,
            Err(StorageError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                BTreeMap::new()
            }
            Err(e) => {
                warn!("Ignoring unreadable store {}: {}", path.display(), e);
                BTreeMap::new()
            }
        };

        Self { path, values }
    }

    fn load(path: &Path) -> Result<BTreeMap<String, String>, StorageError> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    fn flush(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(&self.values)?)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        self.values.insert(key.to_string(), value);
        self.flush()
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
    read_only: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose writes always fail, as when the data directory is read-only.
    pub fn unavailable() -> Self {
        Self {
            values: BTreeMap::new(),
            read_only: true,
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        if self.read_only {
            return Err(StorageError::Unavailable);
        }
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// Shared handle to the one store of the process.
#[derive(Clone)]
pub struct Persistence {
    store: Rc<RefCell<dyn KeyValueStore>>,
}

impl Persistence {
    pub fn new<S: KeyValueStore + 'static>(store: S) -> Self {
        Self {
            store: Rc::new(RefCell::new(store)),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    pub fn read(&self, key: &str) -> Option<String> {
        match self.store.borrow().get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to read {}: {}", key, e);
                None
            }
        }
    }

    /// Returns false when the value could not be persisted.
    pub fn write(&self, key: &str, value: String) -> bool {
        match self.store.borrow_mut().set(key, value) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to persist {}: {}", key, e);
                false
            }
        }
    }

    pub fn read_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let text = self.read(key)?;
        match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!("Discarding malformed {}: {}", key, e);
                None
            }
        }
    }

    pub fn write_json<T: Serialize>(&self, key: &str, value: &T) -> bool {
        match serde_json::to_string(value) {
            Ok(text) => self.write(key, text),
            Err(e) => {
                warn!("Failed to encode {}: {}", key, e);
                false
            }
        }
    }
}

/// Best score ever seen, never decreasing.
pub struct HighScore {
    persistence: Persistence,
    best: u32,
}

impl HighScore {
    pub fn load(persistence: Persistence) -> Self {
        let best = persistence
            .read(HIGH_SCORE_KEY)
            .and_then(|text| text.trim().parse().ok())
            .unwrap_or(0);

        Self { persistence, best }
    }

    pub fn best(&self) -> u32 {
        self.best
    }

    /// Records `score`; returns true when it raised the high score.
    pub fn observe(&mut self, score: u32) -> bool {
        if score <= self.best {
            return false;
        }

        self.best = score;
        self.persistence.write(HIGH_SCORE_KEY, score.to_string());
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

pub struct ThemeStore {
    persistence: Persistence,
    theme: Theme,
}

impl ThemeStore {
    /// Applies the stored theme, persisting the dark default when none is stored.
    pub fn load(persistence: Persistence) -> Self {
        let stored = persistence
            .read(THEME_KEY)
            .and_then(|value| Theme::parse(&value));

        let theme = match stored {
            Some(theme) => theme,
            None => {
                persistence.write(THEME_KEY, Theme::Dark.as_str().to_string());
                Theme::Dark
            }
        };

        Self { persistence, theme }
    }

    pub fn current(&self) -> Theme {
        self.theme
    }

    pub fn toggle(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.persistence
            .write(THEME_KEY, self.theme.as_str().to_string());
        self.theme
    }
}
