//! Milestone achievements
//!
//! Flags are monotonic: once unlocked they survive reset and are never
//! cleared.

use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};

use crate::economy::UpgradeKind;
use crate::sim::state::GameState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Achievement {
    FirstCollision,
    HundredCollisions,
    ThousandCollisions,
    TenParticles,
    MaxSize,
}

impl Achievement {
    pub const ALL: [Achievement; 5] = [
        Achievement::FirstCollision,
        Achievement::HundredCollisions,
        Achievement::ThousandCollisions,
        Achievement::TenParticles,
        Achievement::MaxSize,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Achievement::FirstCollision => "firstCollision",
            Achievement::HundredCollisions => "hundredCollisions",
            Achievement::ThousandCollisions => "thousandCollisions",
            Achievement::TenParticles => "tenParticles",
            Achievement::MaxSize => "maxSize",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Achievement::FirstCollision => "First Collision",
            Achievement::HundredCollisions => "Particle Smasher",
            Achievement::ThousandCollisions => "Collision Master",
            Achievement::TenParticles => "Crowded Ring",
            Achievement::MaxSize => "Big Science",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.id() == id)
    }
}

/// Set of unlocked achievements
///
/// Serialized as a list of ids. Older snapshots stored an object of
/// `id -> bool`; both shapes load.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AchievementFlags(BTreeSet<Achievement>);

impl AchievementFlags {
    /// Returns true if the achievement was newly unlocked
    pub fn unlock(&mut self, achievement: Achievement) -> bool {
        self.0.insert(achievement)
    }

    pub fn contains(&self, achievement: Achievement) -> bool {
        self.0.contains(&achievement)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Achievement> + '_ {
        self.0.iter().copied()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FlagsRepr {
    List(Vec<String>),
    Map(std::collections::BTreeMap<String, bool>),
}

impl<'de> Deserialize<'de> for AchievementFlags {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let ids: Vec<String> = match FlagsRepr::deserialize(deserializer)? {
            FlagsRepr::List(ids) => ids,
            FlagsRepr::Map(map) => map.into_iter().filter(|(_, on)| *on).map(|(id, _)| id).collect(),
        };
        let mut flags = AchievementFlags::default();
        for id in ids {
            match Achievement::from_id(&id) {
                Some(a) => {
                    flags.unlock(a);
                }
                None => log::warn!("Ignoring unknown achievement '{}'", id),
            }
        }
        Ok(flags)
    }
}

fn award(state: &mut GameState, achievement: Achievement) -> bool {
    let new = state.achievements.unlock(achievement);
    if new {
        log::info!("Achievement unlocked: {}", achievement.title());
    }
    new
}

/// Check counter-driven achievements. Returns the newly unlocked ones.
pub fn evaluate(state: &mut GameState, live_particles: usize) -> Vec<Achievement> {
    let mut unlocked = Vec::new();
    let checks = [
        (Achievement::FirstCollision, state.collision_count >= 1),
        (Achievement::HundredCollisions, state.collision_count >= 100),
        (Achievement::ThousandCollisions, state.collision_count >= 1000),
        (Achievement::TenParticles, live_particles >= 10),
    ];
    for (achievement, reached) in checks {
        if reached && award(state, achievement) {
            unlocked.push(achievement);
        }
    }
    unlocked
}

/// Capstone achievements tied to a purchase
pub fn evaluate_purchase(state: &mut GameState, kind: UpgradeKind) -> Option<Achievement> {
    let capped = state.upgrade_levels.level(kind) >= kind.def().max_level;
    match kind {
        UpgradeKind::AcceleratorSize if capped => {
            award(state, Achievement::MaxSize).then_some(Achievement::MaxSize)
        }
        _ => None,
    }
}
