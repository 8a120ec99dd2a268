//! Save snapshot and storage backends
//!
//! Features:
//! - Versioned JSON snapshot (missing fields fall back to defaults)
//! - Atomic file writes on native (tmp → save)
//! - LocalStorage on wasm32
//!
//! Persistence is opportunistic: callers log failures and carry on with the
//! in-memory state.

use serde::{Deserialize, Serialize};

use crate::run_stats::GameStats;
use crate::sim::stats::WeaponUpgrades;

pub const SAVE_VERSION: u32 = 1;

/// Everything that survives between runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveData {
    pub version: u32,
    pub total_coins: u64,
    pub unlocked_cosmetics: Vec<String>,
    pub weapon_upgrades: WeaponUpgrades,
    pub selected_cosmetic: String,
    /// Unlocked achievement ids
    pub achievements: Vec<String>,
    pub stats: GameStats,
}

impl Default for SaveData {
    fn default() -> Self {
        Self {
            version: SAVE_VERSION,
            total_coins: 0,
            unlocked_cosmetics: vec!["default".to_string()],
            weapon_upgrades: WeaponUpgrades::default(),
            selected_cosmetic: "default".to_string(),
            achievements: Vec::new(),
            stats: GameStats::default(),
        }
    }
}

impl SaveData {
    pub fn to_json(&self) -> Result<String, PersistenceError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, PersistenceError> {
        let data: Self = serde_json::from_str(json)?;
        if data.version > SAVE_VERSION {
            return Err(PersistenceError::UnsupportedVersion(data.version));
        }
        Ok(data)
    }

    pub fn unlock_achievement(&mut self, id: &str) -> bool {
        if self.achievements.iter().any(|a| a == id) {
            return false;
        }
        self.achievements.push(id.to_string());
        true
    }
}

/// Error type for save/load
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to (de)serialize save data: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unsupported save version: {0}")]
    UnsupportedVersion(u32),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Storage collaborator
pub trait Persistence {
    /// `Ok(None)` when nothing has been saved yet
    fn load(&mut self) -> Result<Option<SaveData>, PersistenceError>;

    fn save(&mut self, data: &SaveData) -> Result<(), PersistenceError>;
}

/// Load a snapshot, falling back to a fresh profile on any failure
pub fn load_or_default(store: &mut dyn Persistence) -> SaveData {
    match store.load() {
        Ok(Some(data)) => {
            log::info!("Loaded save ({} coins)", data.total_coins);
            data
        }
        Ok(None) => {
            log::info!("No save found, starting fresh");
            SaveData::default()
        }
        Err(e) => {
            log::warn!("Failed to load save, starting fresh: {}", e);
            SaveData::default()
        }
    }
}

/// Save a snapshot, logging (not propagating) failures
pub fn save_or_warn(store: &mut dyn Persistence, data: &SaveData) {
    if let Err(e) = store.save(data) {
        log::warn!("Failed to save: {}", e);
    }
}

/// In-memory store (tests, headless runs)
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    json: Option<String>,
    /// Simulate an unavailable backend
    pub offline: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offline() -> Self {
        Self {
            json: None,
            offline: true,
        }
    }
}

impl Persistence for MemoryStore {
    fn load(&mut self) -> Result<Option<SaveData>, PersistenceError> {
        if self.offline {
            return Err(PersistenceError::Unavailable("memory store offline".to_string()));
        }
        self.json.as_deref().map(SaveData::from_json).transpose()
    }

    fn save(&mut self, data: &SaveData) -> Result<(), PersistenceError> {
        if self.offline {
            return Err(PersistenceError::Unavailable("memory store offline".to_string()));
        }
        self.json = Some(data.to_json()?);
        Ok(())
    }
}

/// JSON file on disk
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl JsonFileStore {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Persistence for JsonFileStore {
    fn load(&mut self) -> Result<Option<SaveData>, PersistenceError> {
        match std::fs::read_to_string(&self.path) {
            Ok(json) => SaveData::from_json(&json).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, data: &SaveData) -> Result<(), PersistenceError> {
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, data.to_json()?)?;
        std::fs::rename(&tmp, &self.path)?;
        log::debug!("Saved to {}", self.path.display());
        Ok(())
    }
}

/// Browser LocalStorage
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Default)]
pub struct LocalStorageStore;

#[cfg(target_arch = "wasm32")]
impl LocalStorageStore {
    const STORAGE_KEY: &'static str = "milk_heist_save";

    fn storage() -> Result<web_sys::Storage, PersistenceError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or_else(|| PersistenceError::Unavailable("localStorage".to_string()))
    }
}

#[cfg(target_arch = "wasm32")]
impl Persistence for LocalStorageStore {
    fn load(&mut self) -> Result<Option<SaveData>, PersistenceError> {
        let storage = Self::storage()?;
        match storage.get_item(Self::STORAGE_KEY) {
            Ok(Some(json)) => SaveData::from_json(&json).map(Some),
            Ok(None) => Ok(None),
            Err(_) => Err(PersistenceError::Unavailable("localStorage read".to_string())),
        }
    }

    fn save(&mut self, data: &SaveData) -> Result<(), PersistenceError> {
        let storage = Self::storage()?;
        storage
            .set_item(Self::STORAGE_KEY, &data.to_json()?)
            .map_err(|_| PersistenceError::Unavailable("localStorage write".to_string()))?;
        log::info!("Game saved ({} coins)", data.total_coins);
        Ok(())
    }
}
