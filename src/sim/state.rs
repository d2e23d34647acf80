//! Game state and core simulation types
//!
//! Everything persisted across sessions lives in [`GameState`]. Live particles
//! are owned by the [`ParticleEngine`](super::tick::ParticleEngine) and are
//! never part of a snapshot.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::achievements::AchievementFlags;
use crate::consts::*;
use crate::economy::UpgradeLevels;

/// Particle species
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticleKind {
    Electron,
    Positron,
    Muon,
    Tauon,
}

impl ParticleKind {
    pub const ALL: [ParticleKind; 4] = [
        ParticleKind::Electron,
        ParticleKind::Positron,
        ParticleKind::Muon,
        ParticleKind::Tauon,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ParticleKind::Electron => "electron",
            ParticleKind::Positron => "positron",
            ParticleKind::Muon => "muon",
            ParticleKind::Tauon => "tauon",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "electron" => Some(ParticleKind::Electron),
            "positron" => Some(ParticleKind::Positron),
            "muon" => Some(ParticleKind::Muon),
            "tauon" => Some(ParticleKind::Tauon),
            _ => None,
        }
    }

    /// The base species is unlocked from the start and never re-locked
    pub fn is_base(&self) -> bool {
        *self == ParticleKind::Electron
    }
}

/// Travel direction along the track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Clockwise,
    CounterClockwise,
}

impl Direction {
    /// +1 for clockwise (increasing screen angle), -1 otherwise
    #[inline]
    pub fn sign(&self) -> f32 {
        match self {
            Direction::Clockwise => 1.0,
            Direction::CounterClockwise => -1.0,
        }
    }
}

/// Static and unlockable parameters of one particle species
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleTypeDef {
    pub unlocked: bool,
    /// Weight relative to other unlocked species
    pub spawn_weight: f32,
    /// Max live particles of this species
    pub max_count: u32,
    /// Energy price of the unlock upgrade (informational)
    pub unlock_cost: f64,
    /// 0xRRGGBB
    pub color: u32,
    pub direction: Direction,
    /// Species-specific decay resistance, multiplied by the global stability
    pub stability: Option<f32>,
}

impl ParticleTypeDef {
    pub fn default_for(kind: ParticleKind) -> Self {
        match kind {
            ParticleKind::Electron => Self {
                unlocked: true,
                spawn_weight: 1.0,
                max_count: 10,
                unlock_cost: 0.0,
                color: 0x4fc3f7,
                direction: Direction::Clockwise,
                stability: None,
            },
            ParticleKind::Positron => Self {
                unlocked: false,
                spawn_weight: 0.5,
                max_count: 5,
                unlock_cost: 100.0,
                color: 0xf06292,
                direction: Direction::CounterClockwise,
                stability: None,
            },
            ParticleKind::Muon => Self {
                unlocked: false,
                spawn_weight: 0.3,
                max_count: 3,
                unlock_cost: 500.0,
                color: 0xba68c8,
                direction: Direction::Clockwise,
                stability: Some(1.5),
            },
            ParticleKind::Tauon => Self {
                unlocked: false,
                spawn_weight: 0.2,
                max_count: 2,
                unlock_cost: 2000.0,
                color: 0xffd54f,
                direction: Direction::Clockwise,
                stability: Some(2.0),
            },
        }
    }

    /// Overlay the fields present in a persisted entry
    fn merge(&mut self, patch: ParticleTypePatch) {
        if let Some(unlocked) = patch.unlocked {
            self.unlocked = unlocked;
        }
        if let Some(weight) = patch.spawn_weight {
            self.spawn_weight = weight;
        }
        if let Some(max) = patch.max_count {
            self.max_count = max;
        }
        if let Some(cost) = patch.unlock_cost {
            self.unlock_cost = cost;
        }
        if let Some(color) = patch.color {
            self.color = color;
        }
        if let Some(direction) = patch.direction {
            self.direction = direction;
        }
        if patch.stability.is_some() {
            self.stability = patch.stability;
        }
    }
}

/// A persisted species entry where every field may be missing or unreadable
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ParticleTypePatch {
    #[serde(deserialize_with = "lenient")]
    unlocked: Option<bool>,
    #[serde(deserialize_with = "lenient")]
    spawn_weight: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    max_count: Option<u32>,
    #[serde(deserialize_with = "lenient")]
    unlock_cost: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    color: Option<u32>,
    #[serde(deserialize_with = "lenient")]
    direction: Option<Direction>,
    #[serde(deserialize_with = "lenient")]
    stability: Option<f32>,
}

/// Read any JSON value; one that does not fit `T` becomes `None`
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => Ok(parsed),
        Err(e) => {
            log::warn!("Ignoring unreadable particle type field {}: {}", value, e);
            Ok(None)
        }
    }
}

/// All four species, keyed by kind
///
/// Deserialization merges field-by-field onto the defaults so that species
/// or fields added after a snapshot was written keep their default values.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ParticleCatalog(BTreeMap<ParticleKind, ParticleTypeDef>);

impl Default for ParticleCatalog {
    fn default() -> Self {
        Self(
            ParticleKind::ALL
                .iter()
                .map(|&k| (k, ParticleTypeDef::default_for(k)))
                .collect(),
        )
    }
}

impl<'de> Deserialize<'de> for ParticleCatalog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
        let mut catalog = ParticleCatalog::default();
        for (name, entry) in entries {
            let Some(kind) = ParticleKind::from_str(&name) else {
                log::warn!("Ignoring unknown particle type '{}' in snapshot", name);
                continue;
            };
            match serde_json::from_value::<ParticleTypePatch>(entry) {
                Ok(patch) => catalog.get_mut(kind).merge(patch),
                Err(e) => log::warn!("Ignoring unreadable particle type '{}': {}", name, e),
            }
        }
        Ok(catalog)
    }
}

impl ParticleCatalog {
    pub fn get(&self, kind: ParticleKind) -> &ParticleTypeDef {
        // Every kind is inserted by Default and the merge never removes entries
        &self.0[&kind]
    }

    pub fn get_mut(&mut self, kind: ParticleKind) -> &mut ParticleTypeDef {
        self.0
            .entry(kind)
            .or_insert_with(|| ParticleTypeDef::default_for(kind))
    }

    pub fn is_unlocked(&self, kind: ParticleKind) -> bool {
        self.get(kind).unlocked
    }

    pub fn unlocked_count(&self) -> usize {
        self.0.values().filter(|d| d.unlocked).count()
    }

    /// Lock every species except the base one
    pub fn relock(&mut self) {
        for (kind, def) in self.0.iter_mut() {
            def.unlocked = kind.is_base();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (ParticleKind, &ParticleTypeDef)> {
        self.0.iter().map(|(k, d)| (*k, d))
    }
}

/// User-adjustable spawn and collision overrides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnSettings {
    /// Per-species spawn weight; absent or zero falls back to the catalog
    pub spawn_weights: BTreeMap<ParticleKind, f32>,
    /// Per-species live cap; absent or zero falls back to the catalog
    pub max_by_type: BTreeMap<ParticleKind, u32>,
    /// Global multiplier on every collision roll
    pub collision_multiplier: f32,
}

impl Default for SpawnSettings {
    fn default() -> Self {
        let catalog = ParticleCatalog::default();
        Self {
            spawn_weights: catalog.iter().map(|(k, d)| (k, d.spawn_weight)).collect(),
            max_by_type: catalog.iter().map(|(k, d)| (k, d.max_count)).collect(),
            collision_multiplier: 1.0,
        }
    }
}

/// Accelerator track shape
///
/// Only `Circle` is reachable through normal play; the other shapes are kept
/// as selectable legacy geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AcceleratorShape {
    #[default]
    Circle,
    Oval,
    #[serde(rename = "figure8")]
    FigureEight,
    Line,
}

/// Complete persistent game state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameState {
    /// Spendable energy; never negative or NaN
    pub resource: f64,
    pub collision_count: u64,
    /// Collisions per second over the last rate window
    #[serde(skip)]
    pub collision_rate: f64,

    // === Click ===
    pub click_power: f64,
    pub click_multiplier: f64,
    pub click_boost_power: f32,

    // === Structure ===
    pub accelerator_size: u32,
    pub accelerator_efficiency: u32,
    pub magnet_count: u32,
    pub magnet_power: u32,
    pub accelerator_shape: AcceleratorShape,

    // === Particles ===
    pub particle_size_level: u32,
    pub particle_speed_level: u32,
    pub particle_stability_multiplier: f32,
    pub max_live_particles: u32,
    pub spawn_interval_secs: f32,
    pub particle_types: ParticleCatalog,
    pub spawn_settings: SpawnSettings,

    // === Production ===
    pub base_collision_chance: f32,
    pub auto_collider_rate: u32,
    pub detector_level: u32,
    pub recycling_level: u32,
    pub assistant_level: u32,

    /// Authoritative purchase counters
    pub upgrade_levels: UpgradeLevels,
    pub achievements: AchievementFlags,

    /// Simulation time (ms) of the last spawn
    #[serde(skip)]
    pub last_spawn_ms: f64,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    /// Fresh state with every field at its documented default
    pub fn new() -> Self {
        Self {
            resource: 0.0,
            collision_count: 0,
            collision_rate: 0.0,
            click_power: 1.0,
            click_multiplier: 1.0,
            click_boost_power: 1.0,
            accelerator_size: 1,
            accelerator_efficiency: 1,
            magnet_count: BASE_MAGNET_COUNT,
            magnet_power: 1,
            accelerator_shape: AcceleratorShape::Circle,
            particle_size_level: 1,
            particle_speed_level: 1,
            particle_stability_multiplier: 1.0,
            max_live_particles: BASE_MAX_LIVE_PARTICLES,
            spawn_interval_secs: BASE_SPAWN_INTERVAL,
            particle_types: ParticleCatalog::default(),
            spawn_settings: SpawnSettings::default(),
            base_collision_chance: BASE_COLLISION_CHANCE,
            auto_collider_rate: 0,
            detector_level: 0,
            recycling_level: 0,
            assistant_level: 0,
            upgrade_levels: UpgradeLevels::initial(),
            achievements: AchievementFlags::default(),
            last_spawn_ms: 0.0,
        }
    }

    /// Add energy; non-finite or negative results are clamped to zero
    pub fn credit(&mut self, amount: f64) {
        if amount.is_finite() && amount > 0.0 {
            self.resource += amount;
        }
        self.sanitize_resource();
    }

    /// Remove energy if affordable. Returns false (and changes nothing) otherwise.
    pub fn debit(&mut self, amount: f64) -> bool {
        if !amount.is_finite() || amount < 0.0 || self.resource < amount {
            return false;
        }
        self.resource -= amount;
        self.sanitize_resource();
        true
    }

    /// Clamp a corrupted balance back to zero
    pub fn sanitize_resource(&mut self) {
        if self.resource.is_nan() || self.resource < 0.0 {
            log::error!("Energy became invalid ({}), resetting to 0", self.resource);
            self.resource = 0.0;
        }
    }

    /// Effective spawn weight for a species (override, else catalog)
    pub fn spawn_weight(&self, kind: ParticleKind) -> f32 {
        match self.spawn_settings.spawn_weights.get(&kind) {
            Some(&w) if w > 0.0 => w,
            _ => self.particle_types.get(kind).spawn_weight,
        }
    }

    /// Effective live cap for a species (override, else catalog)
    pub fn type_cap(&self, kind: ParticleKind) -> u32 {
        match self.spawn_settings.max_by_type.get(&kind) {
            Some(&max) if max > 0 => max,
            _ => self.particle_types.get(kind).max_count,
        }
    }

    /// Energy credited by one valid click
    pub fn click_energy(&self) -> f64 {
        self.click_power * self.click_multiplier
    }

    /// Restore every economy/simulation field to its default, keeping achievements
    pub fn reset_preserving_achievements(&mut self) {
        let achievements = std::mem::take(&mut self.achievements);
        *self = GameState::new();
        self.particle_types.relock();
        self.achievements = achievements;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::achievements::Achievement;

    #[test]
    fn test_default_catalog() {
        let state = GameState::new();
        assert!(state.particle_types.is_unlocked(ParticleKind::Electron));
        assert!(!state.particle_types.is_unlocked(ParticleKind::Positron));
        assert_eq!(state.particle_types.unlocked_count(), 1);
        assert_eq!(
            state.particle_types.get(ParticleKind::Positron).direction,
            Direction::CounterClockwise
        );
        assert_eq!(state.particle_types.get(ParticleKind::Tauon).stability, Some(2.0));
    }

    #[test]
    fn test_credit_and_debit() {
        let mut state = GameState::new();
        state.credit(10.0);
        assert_eq!(state.resource, 10.0);
        assert!(!state.debit(11.0));
        assert_eq!(state.resource, 10.0);
        assert!(state.debit(4.0));
        assert_eq!(state.resource, 6.0);

        state.credit(f64::NAN);
        assert_eq!(state.resource, 6.0);
        state.credit(-3.0);
        assert_eq!(state.resource, 6.0);
    }

    #[test]
    fn test_nan_resource_clamped() {
        let mut state = GameState::new();
        state.resource = f64::NAN;
        state.sanitize_resource();
        assert_eq!(state.resource, 0.0);
    }

    #[test]
    fn test_overrides_fall_back_to_catalog() {
        let mut state = GameState::new();
        state.spawn_settings.spawn_weights.insert(ParticleKind::Muon, 0.0);
        state.spawn_settings.max_by_type.remove(&ParticleKind::Muon);
        assert_eq!(state.spawn_weight(ParticleKind::Muon), 0.3);
        assert_eq!(state.type_cap(ParticleKind::Muon), 3);

        state.spawn_settings.max_by_type.insert(ParticleKind::Muon, 7);
        assert_eq!(state.type_cap(ParticleKind::Muon), 7);
    }

    #[test]
    fn test_reset_keeps_achievements_and_relocks() {
        let mut state = GameState::new();
        state.resource = 500.0;
        state.collision_count = 42;
        state.particle_types.get_mut(ParticleKind::Positron).unlocked = true;
        state.particle_types.get_mut(ParticleKind::Muon).unlocked = true;
        state.achievements.unlock(Achievement::FirstCollision);

        state.reset_preserving_achievements();

        assert_eq!(state.resource, 0.0);
        assert_eq!(state.collision_count, 0);
        assert_eq!(state.particle_types.unlocked_count(), 1);
        assert!(state.achievements.contains(Achievement::FirstCollision));
    }

    #[test]
    fn test_catalog_merges_partial_entries() {
        let json = r#"{ "positron": { "unlocked": true }, "graviton": { "unlocked": true } }"#;
        let catalog: ParticleCatalog = serde_json::from_str(json).unwrap();
        let positron = catalog.get(ParticleKind::Positron);
        assert!(positron.unlocked);
        // Fields missing from the snapshot keep their defaults
        assert_eq!(positron.spawn_weight, 0.5);
        assert_eq!(positron.max_count, 5);
        assert!(catalog.is_unlocked(ParticleKind::Electron));
        assert!(!catalog.is_unlocked(ParticleKind::Tauon));
    }

    #[test]
    fn test_catalog_drops_only_unreadable_fields() {
        let json = r#"{
            "positron": { "unlocked": true, "max_count": "x" },
            "muon": { "unlocked": true, "direction": 3 },
            "tauon": 7
        }"#;
        let catalog: ParticleCatalog = serde_json::from_str(json).unwrap();
        let positron = catalog.get(ParticleKind::Positron);
        assert!(positron.unlocked);
        assert_eq!(positron.max_count, 5);
        let muon = catalog.get(ParticleKind::Muon);
        assert!(muon.unlocked);
        assert_eq!(muon.direction, Direction::Clockwise);
        assert_eq!(
            catalog.get(ParticleKind::Tauon),
            &ParticleTypeDef::default_for(ParticleKind::Tauon)
        );
    }
}
