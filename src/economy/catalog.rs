//! Static upgrade catalog
//!
//! Every upgrade is an [`UpgradeKind`] variant with a row in [`UPGRADES`].
//! The purchase counter in [`UpgradeLevels`] is the only source of truth;
//! every upgraded field on [`GameState`] is derived from it.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::consts::*;
use crate::sim::particle::{Particle, base_speed_for, radius_for};
use crate::sim::state::{GameState, ParticleKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpgradeCategory {
    Click,
    Structure,
    Particle,
    Production,
}

impl UpgradeCategory {
    pub fn label(&self) -> &'static str {
        match self {
            UpgradeCategory::Click => "Click Upgrades",
            UpgradeCategory::Structure => "Accelerator Structure",
            UpgradeCategory::Particle => "Particle Upgrades",
            UpgradeCategory::Production => "Production Upgrades",
        }
    }
}

/// Every purchasable upgrade. Discriminants index [`UPGRADES`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum UpgradeKind {
    ClickPower = 0,
    ClickMultiplier,
    ClickParticleBoost,
    AcceleratorSize,
    MagnetCount,
    MagnetPower,
    AcceleratorEfficiency,
    ParticleSize,
    ParticleSpeed,
    ParticleSpawnRate,
    MaxParticles,
    UnlockPositron,
    UnlockMuon,
    UnlockTauon,
    ParticleStability,
    CollisionChance,
    AutoCollider,
    ParticleDetectors,
    EnergyRecycling,
    ResearchAssistants,
}

/// Static parameters of one upgrade
#[derive(Debug, Clone, Copy)]
pub struct UpgradeDef {
    pub kind: UpgradeKind,
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: UpgradeCategory,
    pub base_cost: f64,
    pub cost_multiplier: f64,
    pub max_level: u32,
    /// Level a fresh game starts at
    pub initial_level: u32,
}

#[allow(clippy::too_many_arguments)]
const fn def(
    kind: UpgradeKind,
    id: &'static str,
    name: &'static str,
    description: &'static str,
    category: UpgradeCategory,
    base_cost: f64,
    cost_multiplier: f64,
    max_level: u32,
    initial_level: u32,
) -> UpgradeDef {
    UpgradeDef {
        kind,
        id,
        name,
        description,
        category,
        base_cost,
        cost_multiplier,
        max_level,
        initial_level,
    }
}

use UpgradeCategory as Cat;
use UpgradeKind as K;

pub const UPGRADES: [UpgradeDef; 20] = [
    def(K::ClickPower, "clickPower", "Click Power", "More energy per click", Cat::Click, 5.0, 1.4, 10, 1),
    def(K::ClickMultiplier, "clickMultiplier", "Click Multiplier", "Doubles energy per click", Cat::Click, 10.0, 2.0, 5, 1),
    def(K::ClickParticleBoost, "clickParticleBoost", "Click Particle Boost", "Clicks kick a particle harder", Cat::Click, 15.0, 1.8, 5, 1),
    def(K::AcceleratorSize, "acceleratorSize", "Accelerator Size", "A larger ring where particles reach higher speeds", Cat::Structure, 10.0, 1.5, MAX_ACCELERATOR_SIZE, 1),
    def(K::MagnetCount, "magnetCount", "Additional Magnets", "More magnets around the ring", Cat::Structure, 15.0, 1.6, MAX_MAGNET_COUNT - BASE_MAGNET_COUNT, 0),
    def(K::MagnetPower, "magnetPower", "Magnet Strength", "Stronger and wider magnet boosts", Cat::Structure, 20.0, 1.7, MAX_MAGNET_POWER, 1),
    def(K::AcceleratorEfficiency, "acceleratorEfficiency", "Efficiency", "More energy from each collision", Cat::Structure, 5.0, 2.0, 10, 1),
    def(K::ParticleSize, "particleSize", "Particle Size", "Larger particles collide more and release more energy", Cat::Particle, 10.0, 1.6, MAX_PARTICLE_SIZE, 1),
    def(K::ParticleSpeed, "particleSpeed", "Particle Speed", "Faster particles meet more often", Cat::Particle, 10.0, 1.7, MAX_PARTICLE_SPEED, 1),
    def(K::ParticleSpawnRate, "particleSpawnRate", "Spawn Rate", "Particles enter the ring more often", Cat::Particle, 10.0, 1.6, 10, 1),
    def(K::MaxParticles, "maxParticles", "Max Particles", "More particles in the ring at once", Cat::Particle, 20.0, 1.8, 5, 0),
    def(K::UnlockPositron, "unlockPositron", "Unlock Positrons", "Counter-rotating particles", Cat::Particle, 100.0, 1.0, 1, 0),
    def(K::UnlockMuon, "unlockMuon", "Unlock Muons", "Heavier, more stable particles", Cat::Particle, 500.0, 1.0, 1, 0),
    def(K::UnlockTauon, "unlockTauon", "Unlock Tauons", "The heaviest, most stable particles", Cat::Particle, 2000.0, 1.0, 1, 0),
    def(K::ParticleStability, "particleStability", "Particle Stability", "Particles live longer before decaying", Cat::Particle, 50.0, 2.0, MAX_STABILITY, 1),
    def(K::CollisionChance, "collisionChance", "Collision Chance", "Meeting particles collide more often", Cat::Production, 10.0, 1.5, 5, 1),
    def(K::AutoCollider, "autoCollider", "Auto Collider", "Collisions on their own", Cat::Production, 50.0, 2.5, 10, 0),
    def(K::ParticleDetectors, "particleDetectors", "Particle Detectors", "More energy from every collision", Cat::Production, 100.0, 2.2, MAX_DETECTORS, 0),
    def(K::EnergyRecycling, "energyRecycling", "Energy Recycling", "Recover energy from decayed particles", Cat::Production, 200.0, 2.3, MAX_RECYCLING, 0),
    def(K::ResearchAssistants, "researchAssistants", "Research Assistants", "Passive energy from the live population", Cat::Production, 300.0, 2.4, MAX_ASSISTANTS, 0),
];

// === Level -> value derivations ===

pub fn click_multiplier_for(level: u32) -> f64 {
    2f64.powi(level.saturating_sub(1) as i32)
}

pub fn click_boost_power_for(level: u32) -> f32 {
    1.0 + 0.5 * level.saturating_sub(1) as f32
}

pub fn magnet_count_for(level: u32) -> u32 {
    BASE_MAGNET_COUNT + level
}

pub fn spawn_interval_for(level: u32) -> f32 {
    (BASE_SPAWN_INTERVAL * SPAWN_INTERVAL_DECAY.powi(level.saturating_sub(1) as i32))
        .max(MIN_SPAWN_INTERVAL)
}

pub fn max_live_for(level: u32) -> u32 {
    BASE_MAX_LIVE_PARTICLES + MAX_LIVE_PER_LEVEL * level
}

pub fn collision_chance_for(level: u32) -> f32 {
    BASE_COLLISION_CHANCE + COLLISION_CHANCE_PER_LEVEL * level.saturating_sub(1) as f32
}

impl UpgradeKind {
    pub const ALL: [UpgradeKind; 20] = [
        K::ClickPower,
        K::ClickMultiplier,
        K::ClickParticleBoost,
        K::AcceleratorSize,
        K::MagnetCount,
        K::MagnetPower,
        K::AcceleratorEfficiency,
        K::ParticleSize,
        K::ParticleSpeed,
        K::ParticleSpawnRate,
        K::MaxParticles,
        K::UnlockPositron,
        K::UnlockMuon,
        K::UnlockTauon,
        K::ParticleStability,
        K::CollisionChance,
        K::AutoCollider,
        K::ParticleDetectors,
        K::EnergyRecycling,
        K::ResearchAssistants,
    ];

    pub fn def(self) -> &'static UpgradeDef {
        &UPGRADES[self as usize]
    }

    pub fn id(self) -> &'static str {
        self.def().id
    }

    pub fn from_id(id: &str) -> Option<Self> {
        UPGRADES.iter().find(|d| d.id == id).map(|d| d.kind)
    }

    /// Species a one-shot unlock upgrade grants
    pub fn unlocks(self) -> Option<ParticleKind> {
        match self {
            K::UnlockPositron => Some(ParticleKind::Positron),
            K::UnlockMuon => Some(ParticleKind::Muon),
            K::UnlockTauon => Some(ParticleKind::Tauon),
            _ => None,
        }
    }

    /// Whether the upgrade is currently offered
    pub fn is_visible(self, state: &GameState) -> bool {
        let unlocked = |kind| state.particle_types.is_unlocked(kind);
        match self {
            K::UnlockPositron => !unlocked(ParticleKind::Positron),
            K::UnlockMuon => unlocked(ParticleKind::Positron) && !unlocked(ParticleKind::Muon),
            K::UnlockTauon => unlocked(ParticleKind::Muon) && !unlocked(ParticleKind::Tauon),
            K::ParticleStability | K::ParticleDetectors => unlocked(ParticleKind::Positron),
            K::EnergyRecycling => state.detector_level >= 1,
            K::ResearchAssistants => state.recycling_level >= 1,
            _ => true,
        }
    }

    /// Write the fields this upgrade controls from its current level
    pub fn sync(self, state: &mut GameState) {
        let level = state.upgrade_levels.level(self);
        match self {
            K::ClickPower => state.click_power = level as f64,
            K::ClickMultiplier => state.click_multiplier = click_multiplier_for(level),
            K::ClickParticleBoost => state.click_boost_power = click_boost_power_for(level),
            K::AcceleratorSize => state.accelerator_size = level,
            K::MagnetCount => state.magnet_count = magnet_count_for(level),
            K::MagnetPower => state.magnet_power = level,
            K::AcceleratorEfficiency => state.accelerator_efficiency = level,
            K::ParticleSize => state.particle_size_level = level,
            K::ParticleSpeed => state.particle_speed_level = level,
            K::ParticleSpawnRate => state.spawn_interval_secs = spawn_interval_for(level),
            K::MaxParticles => state.max_live_particles = max_live_for(level),
            K::UnlockPositron | K::UnlockMuon | K::UnlockTauon => {
                if let Some(kind) = self.unlocks() {
                    state.particle_types.get_mut(kind).unlocked = level >= 1;
                }
            }
            K::ParticleStability => state.particle_stability_multiplier = level as f32,
            K::CollisionChance => state.base_collision_chance = collision_chance_for(level),
            K::AutoCollider => state.auto_collider_rate = level,
            K::ParticleDetectors => state.detector_level = level,
            K::EnergyRecycling => state.recycling_level = level,
            K::ResearchAssistants => state.assistant_level = level,
        }
    }

    /// Apply a just-purchased level: re-derive state, then update live particles
    pub fn apply(self, state: &mut GameState, particles: &mut [Particle]) {
        self.sync(state);
        match self {
            K::AcceleratorSize => {
                for p in particles.iter_mut() {
                    p.set_base_speed(p.base_speed * (1.0 + SIZE_SPEED_BONUS));
                }
            }
            K::ParticleSize => {
                let radius = radius_for(state.particle_size_level);
                for p in particles.iter_mut() {
                    p.radius = radius;
                }
            }
            K::ParticleSpeed => {
                let spawn_speed =
                    base_speed_for(state.particle_speed_level, state.accelerator_size);
                for p in particles.iter_mut() {
                    p.set_base_speed(spawn_speed * p.magnet_boost + p.speed_gain);
                }
            }
            K::UnlockPositron | K::UnlockMuon | K::UnlockTauon => {
                if let Some(kind) = self.unlocks() {
                    log::info!("Unlocked {}", kind.as_str());
                }
            }
            _ => {}
        }
    }

    /// Best-effort level recovered from field values, for snapshots that
    /// predate the explicit counter
    pub fn legacy_level(self, state: &GameState) -> u32 {
        let level = match self {
            K::ClickPower => state.click_power.round() as i64,
            K::ClickMultiplier => state.click_multiplier.max(1.0).log2().round() as i64 + 1,
            K::ClickParticleBoost => ((state.click_boost_power - 1.0) / 0.5).round() as i64 + 1,
            K::AcceleratorSize => state.accelerator_size as i64,
            K::MagnetCount => state.magnet_count as i64 - BASE_MAGNET_COUNT as i64,
            K::MagnetPower => state.magnet_power as i64,
            K::AcceleratorEfficiency => state.accelerator_efficiency as i64,
            K::ParticleSize => state.particle_size_level as i64,
            K::ParticleSpeed => state.particle_speed_level as i64,
            K::ParticleSpawnRate => {
                let ratio = (state.spawn_interval_secs / BASE_SPAWN_INTERVAL).max(f32::EPSILON);
                (ratio.ln() / SPAWN_INTERVAL_DECAY.ln()).round() as i64 + 1
            }
            K::MaxParticles => {
                (state.max_live_particles as i64 - BASE_MAX_LIVE_PARTICLES as i64)
                    / MAX_LIVE_PER_LEVEL as i64
            }
            K::UnlockPositron | K::UnlockMuon | K::UnlockTauon => match self.unlocks() {
                Some(kind) if state.particle_types.is_unlocked(kind) => 1,
                _ => 0,
            },
            K::ParticleStability => state.particle_stability_multiplier.round() as i64,
            K::CollisionChance => {
                ((state.base_collision_chance - BASE_COLLISION_CHANCE) / COLLISION_CHANCE_PER_LEVEL)
                    .round() as i64
                    + 1
            }
            K::AutoCollider => state.auto_collider_rate as i64,
            K::ParticleDetectors => state.detector_level as i64,
            K::EnergyRecycling => state.recycling_level as i64,
            K::ResearchAssistants => state.assistant_level as i64,
        };
        level.clamp(0, self.def().max_level as i64) as u32
    }
}

/// Purchase counters keyed by upgrade
///
/// Serialized as `{ "clickPower": 3, ... }`. Unknown ids are dropped on load
/// and non-integral counts are rounded.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct UpgradeLevels(BTreeMap<UpgradeKind, u32>);

impl UpgradeLevels {
    /// Every upgrade at its starting level
    pub fn initial() -> Self {
        Self(UPGRADES.iter().map(|d| (d.kind, d.initial_level)).collect())
    }

    /// Stored counter, if any
    pub fn get(&self, kind: UpgradeKind) -> Option<u32> {
        self.0.get(&kind).copied()
    }

    /// Stored counter, or the starting level when missing
    pub fn level(&self, kind: UpgradeKind) -> u32 {
        self.get(kind).unwrap_or(kind.def().initial_level)
    }

    pub fn set(&mut self, kind: UpgradeKind, level: u32) {
        self.0.insert(kind, level);
    }

    pub fn iter(&self) -> impl Iterator<Item = (UpgradeKind, u32)> + '_ {
        self.0.iter().map(|(k, l)| (*k, *l))
    }
}

impl<'de> Deserialize<'de> for UpgradeLevels {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
        let mut levels = UpgradeLevels::default();
        for (id, value) in raw {
            let Some(kind) = UpgradeKind::from_id(&id) else {
                log::warn!("Ignoring unknown upgrade '{}' in snapshot", id);
                continue;
            };
            match value.as_f64() {
                Some(level) if level.is_finite() && level >= 0.0 => {
                    levels.set(kind, level.round() as u32)
                }
                _ => log::warn!("Ignoring invalid level {} for '{}'", value, id),
            }
        }
        Ok(levels)
    }
}
