//! Pairwise particle collision rules
//!
//! Two particles are candidates when their discs overlap and neither has
//! rolled a collision in the last 500ms. A candidate pair then rolls once:
//! success annihilates both and credits energy, failure is a near miss that
//! starts the debounce for both.

use glam::Vec2;

use super::particle::Particle;
use crate::consts::*;

/// Discs overlap
#[inline]
pub fn in_contact(a: &Particle, b: &Particle) -> bool {
    a.pos.distance(b.pos) < a.radius + b.radius
}

/// Overlapping and both outside the debounce window
#[inline]
pub fn eligible(a: &Particle, b: &Particle, now_ms: f64) -> bool {
    in_contact(a, b) && a.collision_ready(now_ms) && b.collision_ready(now_ms)
}

/// Closing speed used by the collision roll: counter-rotating pairs add
/// their full speeds on top of the speed difference
#[inline]
pub fn relative_speed(a: &Particle, b: &Particle) -> f64 {
    let diff = (a.current_speed - b.current_speed).abs();
    if a.direction != b.direction {
        diff + a.current_speed + b.current_speed
    } else {
        diff
    }
}

/// Probability that an eligible pair collides on this roll
pub fn collision_probability(
    a: &Particle,
    b: &Particle,
    base_collision_chance: f32,
    global_multiplier: f32,
) -> f32 {
    let size_modifier = ((a.radius + b.radius) / 4.0) * 0.2;
    let speed_modifier = (relative_speed(a, b) / 5.0).min(MAX_SPEED_MODIFIER as f64) as f32;
    (BASE_COLLISION_PROBABILITY + size_modifier + speed_modifier + base_collision_chance)
        * global_multiplier
}

/// Energy released by a collision
///
/// `reference_speed` is the speed-level term of the spawn speed, without the
/// accelerator size bonus, so faster pairs pay out proportionally more.
pub fn collision_energy(
    a: &Particle,
    b: &Particle,
    efficiency: u32,
    reference_speed: f64,
    detector_level: u32,
) -> f64 {
    let combined_speed = a.current_speed + b.current_speed;
    let speed_factor = combined_speed / reference_speed.max(f64::EPSILON);
    let size_factor = (a.radius * b.radius) as f64;
    let detector_bonus = 1.0 + detector_level as f64 * 0.2;
    ENERGY_PER_COLLISION * efficiency as f64 * speed_factor * size_factor * detector_bonus
}

/// Midpoint of a pair, where effects are emitted
#[inline]
pub fn midpoint(a: &Particle, b: &Particle) -> Vec2 {
    (a.pos + b.pos) * 0.5
}

/// Outcome of one roll for an eligible pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CollisionRoll {
    Collided { energy: f64, point: Vec2 },
    NearMiss { point: Vec2 },
}
