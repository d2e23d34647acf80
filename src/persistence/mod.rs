//! Snapshot persistence
//!
//! Features:
//! - Plain JSON snapshot of [`GameState`] under one storage key
//! - Field-by-field merge onto defaults when loading
//! - Level counter migration for snapshots that predate it
//! - Degrades to unpersisted play when storage is unavailable

pub mod migration;
pub mod snapshot;
pub mod storage;

use std::fmt;

pub use snapshot::{decode, encode};
pub use storage::{MemoryStorage, Storage};

#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorage;

use crate::sim::state::GameState;

#[derive(Debug)]
pub enum PersistenceError {
    /// No storage backend in this environment
    Unavailable,
    /// The backend rejected a read or write
    Storage(String),
    /// The snapshot is not a JSON object
    Malformed(String),
    Json(serde_json::Error),
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistenceError::Unavailable => write!(f, "Storage is not available"),
            PersistenceError::Storage(msg) => write!(f, "Storage error: {}", msg),
            PersistenceError::Malformed(msg) => write!(f, "Malformed snapshot: {}", msg),
            PersistenceError::Json(e) => write!(f, "Snapshot JSON error: {}", e),
        }
    }
}

impl std::error::Error for PersistenceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PersistenceError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(e: serde_json::Error) -> Self {
        PersistenceError::Json(e)
    }
}

/// Owns the storage backend and the autosave timer
pub struct SaveManager {
    storage: Box<dyn Storage>,
    key: String,
    autosave_ms: f64,
    last_save_ms: f64,
    degraded: bool,
}

impl SaveManager {
    pub fn new(storage: Box<dyn Storage>, key: impl Into<String>, autosave_secs: f64) -> Self {
        Self {
            storage,
            key: key.into(),
            autosave_ms: autosave_secs.max(0.0) * 1000.0,
            last_save_ms: 0.0,
            degraded: false,
        }
    }

    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    /// True once a write has failed; cleared by the next successful write
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Load the stored snapshot. Missing or unreadable snapshots yield `None`.
    pub fn load(&mut self) -> Option<GameState> {
        let json = match self.storage.load(&self.key) {
            Ok(Some(json)) => json,
            Ok(None) => {
                log::info!("No saved game found, starting fresh");
                return None;
            }
            Err(e) => {
                log::warn!("Could not read saved game: {}", e);
                return None;
            }
        };
        match decode(&json) {
            Ok(state) => {
                log::info!(
                    "Loaded saved game ({:.0} energy, {} collisions)",
                    state.resource,
                    state.collision_count
                );
                Some(state)
            }
            Err(e) => {
                log::warn!("Discarding unreadable saved game: {}", e);
                None
            }
        }
    }

    /// Write a snapshot now and restart the autosave timer
    pub fn save(&mut self, state: &GameState, now_ms: f64) -> Result<(), PersistenceError> {
        self.last_save_ms = now_ms;
        let result = encode(state).and_then(|json| self.storage.store(&self.key, &json));
        match &result {
            Ok(()) => {
                if self.degraded {
                    log::info!("Storage recovered, saving again");
                }
                self.degraded = false;
            }
            Err(e) => {
                if !self.degraded {
                    log::warn!("Saving failed, continuing without persistence: {}", e);
                }
                self.degraded = true;
            }
        }
        result
    }

    /// Save if the autosave interval has elapsed. Returns true if a save was attempted.
    pub fn autosave(&mut self, state: &GameState, now_ms: f64) -> bool {
        if now_ms - self.last_save_ms < self.autosave_ms {
            return false;
        }
        // Failures are logged and tracked by `save`
        let _ = self.save(state, now_ms);
        true
    }

    pub fn clear(&mut self) -> Result<(), PersistenceError> {
        self.storage.remove(&self.key)
    }
}
