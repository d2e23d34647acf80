//! Collider Idle - an incremental particle accelerator
//!
//! Core modules:
//! - `sim`: Deterministic simulation (particles, track geometry, collisions, decay)
//! - `economy`: Upgrade catalog, cost curves and the purchase protocol
//! - `achievements`: Monotonic milestone flags
//! - `orchestrator`: Fixed-timestep driver, click/purchase/reset intents, render surface
//! - `persistence`: Snapshot save/load with field-by-field merge
//! - `settings`: Host preferences

pub mod achievements;
pub mod economy;
pub mod orchestrator;
pub mod persistence;
pub mod settings;
pub mod sim;

pub use orchestrator::{Accelerator, Phase, RenderFrame};
pub use settings::{EffectsPreset, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (seconds); one tick advances particles by one speed unit
    pub const SIM_DT: f64 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame delta the scheduler will account for (seconds)
    pub const MAX_FRAME_DT: f64 = 0.25;

    /// Logical edge length of the square play field
    pub const DEFAULT_VIEWPORT: f32 = 600.0;

    /// Level caps
    pub const MAX_ACCELERATOR_SIZE: u32 = 5;
    pub const MAX_PARTICLE_SIZE: u32 = 5;
    pub const MAX_PARTICLE_SPEED: u32 = 5;
    pub const MAX_MAGNET_COUNT: u32 = 16;
    pub const MAX_MAGNET_POWER: u32 = 5;
    pub const MAX_STABILITY: u32 = 5;
    pub const MAX_DETECTORS: u32 = 5;
    pub const MAX_RECYCLING: u32 = 5;
    pub const MAX_ASSISTANTS: u32 = 5;

    /// Energy credited per collision before multipliers
    pub const ENERGY_PER_COLLISION: f64 = 1.0;

    /// Magnets installed before any upgrade
    pub const BASE_MAGNET_COUNT: u32 = 4;
    /// Live particle cap before any upgrade
    pub const BASE_MAX_LIVE_PARTICLES: u32 = 10;
    /// Extra live particles per max-particles level
    pub const MAX_LIVE_PER_LEVEL: u32 = 5;

    /// Seconds between spawns at spawn-rate level 1
    pub const BASE_SPAWN_INTERVAL: f32 = 3.0;
    /// Fastest spawn interval reachable through upgrades
    pub const MIN_SPAWN_INTERVAL: f32 = 0.5;
    /// Spawn interval factor per spawn-rate level
    pub const SPAWN_INTERVAL_DECAY: f32 = 0.8;

    /// Collision chance at collision-chance level 1
    pub const BASE_COLLISION_CHANCE: f32 = 0.05;
    /// Collision chance added per level
    pub const COLLISION_CHANCE_PER_LEVEL: f32 = 0.02;
    /// Flat collision probability for any eligible encounter
    pub const BASE_COLLISION_PROBABILITY: f32 = 0.01;
    /// Ceiling of the relative-speed term in the collision roll
    pub const MAX_SPEED_MODIFIER: f32 = 0.4;

    /// Per-tick decay constant for a stability-1 particle aged one minute
    pub const BASE_DECAY_CONSTANT: f64 = 0.00001;
    /// Speed gained per unit of distance, per accelerator size level
    pub const ACCELERATION_PER_SIZE: f64 = 0.0001;
    /// Base speed factor applied to live particles on each accelerator size purchase
    pub const SIZE_SPEED_BONUS: f64 = 0.1;

    /// Click boost: peak multiplier and fade-out window
    pub const CLICK_BOOST_PEAK: f64 = 2.5;
    pub const BOOST_DURATION_MS: f64 = 3000.0;

    /// Ceiling on particle speed (units per tick)
    pub const PARTICLE_SPEED_CEILING: f64 = 1.0e12;

    /// Debounce windows
    pub const MAGNET_DEBOUNCE_MS: f64 = 500.0;
    pub const COLLISION_DEBOUNCE_MS: f64 = 500.0;

    /// Window over which the collision rate is recomputed
    pub const RATE_WINDOW_MS: f64 = 1000.0;

    /// LocalStorage key for the game snapshot
    pub const SAVE_KEY: &str = "collider_idle_save";
}

/// Convert polar (r, theta) around `center` to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(center: Vec2, r: f32, theta: f32) -> Vec2 {
    center + Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Convert cartesian (x, y) to polar (r, theta) around `center`
#[inline]
pub fn cartesian_to_polar(center: Vec2, pos: Vec2) -> (f32, f32) {
    let d = pos - center;
    (d.length(), d.y.atan2(d.x))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_polar_roundtrip_around_center() {
        let center = Vec2::new(300.0, 300.0);
        let p = polar_to_cartesian(center, 120.0, PI / 3.0);
        let (r, theta) = cartesian_to_polar(center, p);
        assert!((r - 120.0).abs() < 1e-3);
        assert!((theta - PI / 3.0).abs() < 1e-5);
    }
}
