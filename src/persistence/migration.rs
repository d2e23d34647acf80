//! Post-load normalization
//!
//! Counters missing from a snapshot are inferred from the values they
//! control. Afterwards every controlled field is re-derived from its counter
//! so the two can never disagree.

use crate::economy::UpgradeKind;
use crate::sim::state::{GameState, ParticleKind};

pub fn migrate(state: &mut GameState) {
    for kind in UpgradeKind::ALL {
        let max = kind.def().max_level;
        match state.upgrade_levels.get(kind) {
            Some(level) if level > max => {
                log::warn!("Clamping {} level {} to {}", kind.id(), level, max);
                state.upgrade_levels.set(kind, max);
            }
            Some(_) => {}
            None => {
                let level = kind.legacy_level(state);
                log::debug!("Inferred {} level {} from saved values", kind.id(), level);
                state.upgrade_levels.set(kind, level);
            }
        }
    }

    for kind in UpgradeKind::ALL {
        kind.sync(state);
    }
    state.particle_types.get_mut(ParticleKind::Electron).unlocked = true;
    state.sanitize_resource();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::economy::UpgradeLevels;

    #[test]
    fn test_infers_levels_from_values() {
        let mut state = GameState::new();
        state.upgrade_levels = UpgradeLevels::default();
        state.click_power = 4.0;
        state.magnet_count = 9;
        state.spawn_interval_secs = 2.4;
        migrate(&mut state);
        assert_eq!(state.upgrade_levels.level(UpgradeKind::ClickPower), 4);
        assert_eq!(state.upgrade_levels.level(UpgradeKind::MagnetCount), 5);
        assert_eq!(state.upgrade_levels.level(UpgradeKind::ParticleSpawnRate), 2);
    }

    #[test]
    fn test_counter_wins_over_values() {
        let mut state = GameState::new();
        state.upgrade_levels.set(UpgradeKind::CollisionChance, 3);
        state.base_collision_chance = 0.9;
        migrate(&mut state);
        assert!((state.base_collision_chance - 0.09).abs() < 1e-6);
    }

    #[test]
    fn test_levels_clamped_and_resource_sanitized() {
        let mut state = GameState::new();
        state.upgrade_levels.set(UpgradeKind::AcceleratorSize, 99);
        state.resource = -5.0;
        migrate(&mut state);
        assert_eq!(state.accelerator_size, 5);
        assert_eq!(state.resource, 0.0);
    }
}
