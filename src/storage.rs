//! Preference persistence.
//!
//! [`PreferenceStore`] is what the state layer talks to. [`Preferences`] is the
//! standard implementation: it encodes flags and stats as strings over any
//! [`KeyValueBackend`], using the same keys and values as the browser build:
//!
//! | key            | values                  |
//! |----------------|-------------------------|
//! | `theme`        | `dark` / `light`        |
//! | `highContrast` | `1` / `0`               |
//! | `gameMode`     | `hard` / `normal`       |
//! | `gameStats`    | JSON [`GameStats`]      |
//!
//! Reads never fail: a missing or unreadable value falls back to its default
//! and is logged. Writes return their error so callers can keep memory and
//! storage in step.

use std::cell::{Ref, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::GameConfig;
use crate::error::Result;
use crate::state::stats::GameStats;

pub const THEME_KEY: &str = "theme";
pub const HIGH_CONTRAST_KEY: &str = "highContrast";
pub const GAME_MODE_KEY: &str = "gameMode";
pub const GAME_STATS_KEY: &str = "gameStats";

/// Durable storage for player preferences and stats.
pub trait PreferenceStore {
    fn initial_dark_mode(&self) -> bool;
    fn initial_high_contrast(&self) -> bool;
    fn stored_hard_mode(&self) -> bool;
    fn set_stored_dark_mode(&self, value: bool) -> Result<()>;
    fn set_stored_hard_mode(&self, value: bool) -> Result<()>;
    fn set_stored_high_contrast_mode(&self, value: bool) -> Result<()>;
    fn load_stats(&self) -> GameStats;
    fn save_stats(&self, stats: &GameStats) -> Result<()>;
}

/// Raw string storage.
pub trait KeyValueBackend {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// In-memory backend. Nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: HashMap<String, String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Backend persisted as a single JSON object on disk.
///
/// The whole file is rewritten on every `set`.
#[derive(Debug)]
pub struct JsonFileBackend {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileBackend {
    /// Open `path`, starting empty if the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), entries = entries.len(), "opened preference file");
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let raw = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }
}

impl KeyValueBackend for JsonFileBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let previous = self.entries.insert(key.to_string(), value.to_string());
        if let Err(e) = self.flush() {
            // keep the in-memory view in line with what is on disk
            match previous {
                Some(old) => self.entries.insert(key.to_string(), old),
                None => self.entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }
}

/// [`PreferenceStore`] over a string backend.
#[derive(Debug)]
pub struct Preferences<B> {
    backend: RefCell<B>,
    prefers_dark_mode: bool,
    max_challenges: u8,
}

impl<B: KeyValueBackend> Preferences<B> {
    pub fn new(backend: B, config: &GameConfig) -> Self {
        Self {
            backend: RefCell::new(backend),
            prefers_dark_mode: config.prefers_dark_mode,
            max_challenges: config.max_challenges,
        }
    }

    pub fn backend(&self) -> Ref<'_, B> {
        self.backend.borrow()
    }

    pub fn into_backend(self) -> B {
        self.backend.into_inner()
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.backend.borrow().get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "preference read failed, using default");
                None
            }
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        self.backend.borrow_mut().set(key, value)?;
        debug!(key, value, "preference stored");
        Ok(())
    }

    /// Decode a two-valued flag. Unknown values are logged and ignored.
    fn read_flag(&self, key: &str, on: &str, off: &str) -> Option<bool> {
        let raw = self.read(key)?;
        match raw.as_str() {
            v if v == on => Some(true),
            v if v == off => Some(false),
            _ => {
                warn!(key, value = %raw, "ignoring unrecognised preference value");
                None
            }
        }
    }
}

impl<B: KeyValueBackend> PreferenceStore for Preferences<B> {
    fn initial_dark_mode(&self) -> bool {
        self.read_flag(THEME_KEY, "dark", "light")
            .unwrap_or(self.prefers_dark_mode)
    }

    fn initial_high_contrast(&self) -> bool {
        self.read_flag(HIGH_CONTRAST_KEY, "1", "0").unwrap_or(false)
    }

    fn stored_hard_mode(&self) -> bool {
        self.read_flag(GAME_MODE_KEY, "hard", "normal")
            .unwrap_or(false)
    }

    fn set_stored_dark_mode(&self, value: bool) -> Result<()> {
        self.write(THEME_KEY, if value { "dark" } else { "light" })
    }

    fn set_stored_hard_mode(&self, value: bool) -> Result<()> {
        self.write(GAME_MODE_KEY, if value { "hard" } else { "normal" })
    }

    fn set_stored_high_contrast_mode(&self, value: bool) -> Result<()> {
        self.write(HIGH_CONTRAST_KEY, if value { "1" } else { "0" })
    }

    fn load_stats(&self) -> GameStats {
        let Some(raw) = self.read(GAME_STATS_KEY) else {
            return GameStats::new(self.max_challenges);
        };
        match serde_json::from_str::<GameStats>(&raw) {
            Ok(stats) => stats.normalized(self.max_challenges),
            Err(e) => {
                warn!(error = %e, "stored stats unreadable, starting fresh");
                GameStats::new(self.max_challenges)
            }
        }
    }

    fn save_stats(&self, stats: &GameStats) -> Result<()> {
        let raw = serde_json::to_string(stats)?;
        self.write(GAME_STATS_KEY, &raw)
    }
}
