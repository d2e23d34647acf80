//! Snapshot encoding and tolerant decoding
//!
//! Snapshots carry no version. Loading starts from the default state and
//! overlays the stored fields one at a time: a field that is missing keeps
//! its default, a field that no longer parses is dropped with a warning,
//! and an unknown field is ignored. Nested tables (particle types, upgrade
//! levels, achievements) merge entry by entry.
//!
//! Never persisted: live particles, pending visual events, the collision
//! rate, the spawn timestamp and the orchestrator's rate/auto-collider
//! bookkeeping.

use serde_json::{Map, Value};

use super::PersistenceError;
use super::migration;
use crate::sim::state::GameState;

pub fn encode(state: &GameState) -> Result<String, PersistenceError> {
    Ok(serde_json::to_string(state)?)
}

pub fn decode(json: &str) -> Result<GameState, PersistenceError> {
    let Value::Object(stored) = serde_json::from_str::<Value>(json)? else {
        return Err(PersistenceError::Malformed(
            "top level is not an object".to_string(),
        ));
    };

    let Value::Object(mut merged) = serde_json::to_value(GameState::new())? else {
        return Err(PersistenceError::Malformed(
            "default state is not an object".to_string(),
        ));
    };
    // Missing counters are recovered by migration rather than defaulted
    merged.insert("upgrade_levels".to_string(), Value::Object(Map::new()));

    for (key, value) in stored {
        if !merged.contains_key(&key) {
            log::debug!("Ignoring unknown snapshot field '{}'", key);
            continue;
        }
        let previous = merged.insert(key.clone(), value);
        if serde_json::from_value::<GameState>(Value::Object(merged.clone())).is_err() {
            log::warn!("Snapshot field '{}' is invalid, keeping the default", key);
            if let Some(previous) = previous {
                merged.insert(key, previous);
            }
        }
    }

    let mut state: GameState = serde_json::from_value(Value::Object(merged))?;
    migration::migrate(&mut state);
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::achievements::Achievement;
    use crate::economy::UpgradeKind;
    use crate::sim::state::ParticleKind;

    #[test]
    fn test_roundtrip_preserves_persisted_fields() {
        let mut state = GameState::new();
        state.resource = 1234.5;
        state.collision_count = 77;
        state.upgrade_levels.set(UpgradeKind::ParticleSpawnRate, 4);
        UpgradeKind::ParticleSpawnRate.sync(&mut state);
        state.upgrade_levels.set(UpgradeKind::UnlockPositron, 1);
        UpgradeKind::UnlockPositron.sync(&mut state);
        state.achievements.unlock(Achievement::FirstCollision);
        state.spawn_settings.collision_multiplier = 1.5;

        let loaded = decode(&encode(&state).unwrap()).unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn test_transient_fields_reset() {
        let mut state = GameState::new();
        state.collision_rate = 3.0;
        state.last_spawn_ms = 9000.0;
        let loaded = decode(&encode(&state).unwrap()).unwrap();
        assert_eq!(loaded.collision_rate, 0.0);
        assert_eq!(loaded.last_spawn_ms, 0.0);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let loaded = decode(r#"{ "resource": 50 }"#).unwrap();
        assert_eq!(loaded.resource, 50.0);
        assert_eq!(loaded.max_live_particles, 10);
        assert_eq!(loaded.upgrade_levels.level(UpgradeKind::ClickPower), 1);
    }

    #[test]
    fn test_invalid_field_is_dropped_not_fatal() {
        let loaded = decode(r#"{ "resource": 50, "collision_count": "many", "warp": 1 }"#).unwrap();
        assert_eq!(loaded.resource, 50.0);
        assert_eq!(loaded.collision_count, 0);
    }

    #[test]
    fn test_particle_types_merge_field_by_field() {
        let loaded =
            decode(r#"{ "particle_types": { "positron": { "unlocked": true } } }"#).unwrap();
        let positron = loaded.particle_types.get(ParticleKind::Positron);
        assert!(positron.unlocked);
        assert_eq!(positron.max_count, 5);
        // Counter inferred from the unlock flag
        assert_eq!(loaded.upgrade_levels.level(UpgradeKind::UnlockPositron), 1);
        assert!(loaded.particle_types.is_unlocked(ParticleKind::Electron));
    }

    #[test]
    fn test_bad_species_field_keeps_other_unlocks() {
        let json = r#"{ "particle_types": {
            "positron": { "unlocked": true },
            "muon": { "unlocked": true, "max_count": "x" }
        } }"#;
        let loaded = decode(json).unwrap();
        assert!(loaded.particle_types.is_unlocked(ParticleKind::Positron));
        assert!(loaded.particle_types.is_unlocked(ParticleKind::Muon));
        assert_eq!(loaded.particle_types.get(ParticleKind::Muon).max_count, 3);
    }

    #[test]
    fn test_non_object_rejected() {
        assert!(matches!(decode("[1, 2]"), Err(PersistenceError::Malformed(_))));
        assert!(matches!(decode("{"), Err(PersistenceError::Json(_))));
    }
}
