use crate::api::Editions;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use thiserror::Error;

#[cfg(target_arch = "wasm32")]
use gloo_storage::{LocalStorage, Storage};

pub const SETTINGS_KEY: &str = "quran_reader.settings";
pub const API_KEY_KEY: &str = "quran_reader.gemini_api_key";
pub const BACKGROUND_POSITION_KEY: &str = "quran_reader.background.position";
pub const BACKGROUND_PLAYING_KEY: &str = "quran_reader.background.playing";
pub const BACKGROUND_SUSPENDED_KEY: &str = "quran_reader.background.suspended";

/// Playback speeds offered by the speed selector.
pub const SPEED_OPTIONS: [f64; 6] = [0.5, 0.75, 1.0, 1.25, 1.5, 2.0];

#[derive(Debug, Error)]
pub enum DbError {
    #[cfg(not(target_arch = "wasm32"))]
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[cfg(not(target_arch = "wasm32"))]
    #[error("failed to prepare data directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage unavailable: {0}")]
    Storage(String),

    #[error("serialization: {0}")]
    Serde(#[from] serde_json::Error),
}

/// String key/value persistence shared by every service.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), DbError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), DbError> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// `window.localStorage`, values stored as raw strings.
#[cfg(target_arch = "wasm32")]
pub struct BrowserStore;

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for BrowserStore {
    fn get(&self, key: &str) -> Option<String> {
        LocalStorage::raw().get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), DbError> {
        LocalStorage::raw()
            .set_item(key, value)
            .map_err(|e| DbError::Storage(format!("{e:?}")))
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub struct SqliteStore {
    conn: rusqlite::Connection,
}

#[cfg(not(target_arch = "wasm32"))]
impl SqliteStore {
    pub fn open(path: &std::path::Path) -> Result<Self, DbError> {
        let conn = rusqlite::Connection::open(path)?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;
        Ok(Self { conn })
    }

    /// Opens `quran-reader.db` in the platform data directory.
    pub fn open_default() -> Result<Self, DbError> {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| std::path::PathBuf::from("."))
            .join("quran-reader");
        std::fs::create_dir_all(&data_dir)?;
        Self::open(&data_dir.join("quran-reader.db"))
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Option<String> {
        self.conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                [key],
                |row: &rusqlite::Row| row.get(0),
            )
            .ok()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
            [key, value],
        )?;
        Ok(())
    }
}

/// The store for the current platform, in-memory when it cannot be opened.
#[cfg(target_arch = "wasm32")]
pub fn open_default_store() -> Rc<dyn KeyValueStore> {
    Rc::new(BrowserStore)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn open_default_store() -> Rc<dyn KeyValueStore> {
    match SqliteStore::open_default() {
        Ok(store) => Rc::new(store),
        Err(e) => {
            tracing::warn!("falling back to in-memory settings: {e}");
            Rc::new(MemoryStore::new())
        }
    }
}

/// User preferences kept between sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReaderSettings {
    #[serde(default = "default_speed")]
    pub speed: f64,
    #[serde(default)]
    pub editions: Editions,
}

fn default_speed() -> f64 {
    1.0
}

impl Default for ReaderSettings {
    fn default() -> Self {
        Self {
            speed: default_speed(),
            editions: Editions::default(),
        }
    }
}

/// Snaps `speed` to the closest selector value.
pub fn nearest_speed(speed: f64) -> f64 {
    if !speed.is_finite() {
        return default_speed();
    }
    SPEED_OPTIONS
        .iter()
        .copied()
        .min_by(|a, b| (a - speed).abs().total_cmp(&(b - speed).abs()))
        .unwrap_or(1.0)
}

pub fn load_settings(store: &dyn KeyValueStore) -> ReaderSettings {
    let Some(json) = store.get(SETTINGS_KEY) else {
        return ReaderSettings::default();
    };
    match serde_json::from_str::<ReaderSettings>(&json) {
        Ok(mut settings) => {
            settings.speed = nearest_speed(settings.speed);
            settings
        }
        Err(e) => {
            tracing::warn!("ignoring unreadable settings: {e}");
            ReaderSettings::default()
        }
    }
}

pub fn save_settings(store: &dyn KeyValueStore, settings: &ReaderSettings) -> Result<(), DbError> {
    let json = serde_json::to_string(settings)?;
    store.set(SETTINGS_KEY, &json)
}

/// Stored credential, then the one baked in at build time.
pub fn load_api_key(store: &dyn KeyValueStore) -> Option<String> {
    store
        .get(API_KEY_KEY)
        .filter(|k| !k.trim().is_empty())
        .or_else(|| option_env!("GEMINI_API_KEY").map(str::to_string))
        .filter(|k| !k.trim().is_empty())
}

pub fn save_api_key(store: &dyn KeyValueStore, key: &str) -> Result<(), DbError> {
    store.set(API_KEY_KEY, key.trim())
}

/// Background track state as it survives a reload.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BackgroundState {
    pub position: f64,
    pub playing: bool,
    pub suspended: bool,
}

pub fn load_background_state(store: &dyn KeyValueStore) -> BackgroundState {
    let position = store
        .get(BACKGROUND_POSITION_KEY)
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|p| p.is_finite() && *p >= 0.0)
        .unwrap_or(0.0);
    let flag = |key: &str| store.get(key).map(|v| v.trim() == "true").unwrap_or(false);
    BackgroundState {
        position,
        playing: flag(BACKGROUND_PLAYING_KEY),
        suspended: flag(BACKGROUND_SUSPENDED_KEY),
    }
}

pub fn save_background_state(
    store: &dyn KeyValueStore,
    state: &BackgroundState,
) -> Result<(), DbError> {
    store.set(BACKGROUND_POSITION_KEY, &state.position.to_string())?;
    store.set(BACKGROUND_PLAYING_KEY, if state.playing { "true" } else { "false" })?;
    store.set(
        BACKGROUND_SUSPENDED_KEY,
        if state.suspended { "true" } else { "false" },
    )
}
