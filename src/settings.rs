//! Host settings and preferences
//!
//! Persisted separately from the game snapshot.

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_VIEWPORT;
use crate::persistence::{PersistenceError, Storage};

/// Visual effect presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum EffectsPreset {
    Minimal,
    #[default]
    Standard,
    Full,
}

impl EffectsPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            EffectsPreset::Minimal => "Minimal",
            EffectsPreset::Standard => "Standard",
            EffectsPreset::Full => "Full",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "minimal" | "min" => Some(EffectsPreset::Minimal),
            "standard" | "std" => Some(EffectsPreset::Standard),
            "full" => Some(EffectsPreset::Full),
            _ => None,
        }
    }

    /// Visual events kept per frame
    pub fn max_events(&self) -> usize {
        match self {
            EffectsPreset::Minimal => 32,
            EffectsPreset::Standard => 256,
            EffectsPreset::Full => 1024,
        }
    }

    /// Whether near misses produce sparks
    pub fn near_misses(&self) -> bool {
        !matches!(self, EffectsPreset::Minimal)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Logical edge length of the square play field
    pub viewport_size: f32,
    /// Seconds between periodic saves
    pub autosave_secs: f64,
    /// Fixed RNG seed; the wall clock seeds the run when absent
    pub seed: Option<u64>,

    // === Effects ===
    pub effects: EffectsPreset,
    pub near_miss_effects: bool,
    pub max_events_per_frame: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            viewport_size: DEFAULT_VIEWPORT,
            autosave_secs: 10.0,
            seed: None,
            effects: EffectsPreset::Standard,
            near_miss_effects: true,
            max_events_per_frame: EffectsPreset::Standard.max_events(),
        }
    }
}

impl Settings {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "collider_idle_settings";

    pub fn from_preset(preset: EffectsPreset) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    /// Apply an effects preset (updates preset-dependent settings)
    pub fn apply_preset(&mut self, preset: EffectsPreset) {
        self.effects = preset;
        self.near_miss_effects = preset.near_misses();
        self.max_events_per_frame = preset.max_events();
    }

    /// Parse settings JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, PersistenceError> {
        let mut settings: Settings = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }

    fn sanitize(&mut self) {
        if !self.viewport_size.is_finite() || self.viewport_size <= 0.0 {
            self.viewport_size = DEFAULT_VIEWPORT;
        }
        if !self.autosave_secs.is_finite() || self.autosave_secs < 1.0 {
            self.autosave_secs = 1.0;
        }
    }

    /// Load settings, falling back to defaults
    pub fn load(storage: &dyn Storage) -> Self {
        match storage.load(Self::STORAGE_KEY) {
            Ok(Some(json)) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings");
                    return settings;
                }
                Err(e) => log::warn!("Ignoring unreadable settings: {}", e),
            },
            Ok(None) => {}
            Err(e) => log::warn!("Could not read settings: {}", e),
        }
        log::info!("Using default settings");
        Self::default()
    }

    pub fn save(&self, storage: &mut dyn Storage) -> Result<(), PersistenceError> {
        let json = serde_json::to_string(self)?;
        storage.store(Self::STORAGE_KEY, &json)?;
        log::info!("Settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.viewport_size, 600.0);
        assert_eq!(s.autosave_secs, 10.0);
        assert_eq!(s.max_events_per_frame, 256);
        assert!(s.near_miss_effects);
    }

    #[test]
    fn test_partial_json() {
        let s = Settings::from_json(r#"{ "seed": 7, "viewport_size": -1 }"#).unwrap();
        assert_eq!(s.seed, Some(7));
        assert_eq!(s.viewport_size, DEFAULT_VIEWPORT);
        assert_eq!(s.autosave_secs, 10.0);
    }

    #[test]
    fn test_minimal_preset_drops_near_misses() {
        let s = Settings::from_preset(EffectsPreset::from_str("min").unwrap());
        assert!(!s.near_miss_effects);
        assert_eq!(s.max_events_per_frame, 32);
    }

    #[test]
    fn test_save_and_load() {
        let mut storage = MemoryStorage::new();
        assert_eq!(Settings::load(&storage), Settings::default());
        let mut s = Settings::default();
        s.seed = Some(99);
        s.save(&mut storage).unwrap();
        assert_eq!(Settings::load(&storage).seed, Some(99));
    }
}
