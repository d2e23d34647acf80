//! Live particle entity
//!
//! A particle moves along the track at `current_speed` units per tick.
//! `current_speed` is always derived from `base_speed` and the click boost;
//! `base_speed` is re-derived every tick from the upgrade levels, the
//! accumulated travel bonus and the held magnet multiplier. Travel feeds
//! back into speed without bound for long-lived particles, so speeds are f64
//! and capped at [`PARTICLE_SPEED_CEILING`].

use glam::Vec2;
use serde::Serialize;

use super::state::{Direction, ParticleKind};
use crate::consts::*;

/// Speed-level term of the spawn speed, without the size bonus.
/// Collision energy is measured against this.
#[inline]
pub fn reference_speed_for(speed_level: u32) -> f64 {
    0.5 + speed_level as f64 * 0.5
}

/// Unboosted speed for a freshly spawned particle
#[inline]
pub fn base_speed_for(speed_level: u32, accelerator_size: u32) -> f64 {
    let size_bonus = (accelerator_size as f64 - 1.0) * SIZE_SPEED_BONUS;
    reference_speed_for(speed_level) * (1.0 + size_bonus)
}

/// Collision radius for a particle-size level
#[inline]
pub fn radius_for(size_level: u32) -> f32 {
    2.0 + size_level as f32 * 0.5
}

/// Probability that a particle decays during one tick
#[inline]
pub fn decay_probability(stability: f32, age_ms: f64) -> f64 {
    BASE_DECAY_CONSTANT * (1.0 / stability.max(f32::EPSILON) as f64) * (age_ms / 60_000.0)
}

#[derive(Debug, Clone, Serialize)]
pub struct Particle {
    pub id: u32,
    pub kind: ParticleKind,
    pub pos: Vec2,
    /// Heading angle (radians)
    pub heading: f32,
    pub base_speed: f64,
    pub current_speed: f64,
    pub radius: f32,
    pub direction: Direction,
    /// Decay resistance (> 0)
    pub stability: f32,
    pub distance_traveled: f64,
    /// Speed accumulated from travel, re-derived each tick
    pub speed_gain: f64,
    pub laps: u32,
    pub age_ms: f64,
    pub created_ms: f64,

    // Click boost
    pub boosted: bool,
    pub boost_start_ms: f64,
    /// Multiplier at the start of the fade
    pub boost_peak: f64,

    // Magnet state
    /// Multiplier from the last magnet pass, held until the next one
    pub magnet_boost: f64,
    pub near_magnet: bool,
    pub last_magnet_boost_ms: Option<f64>,

    /// Last collision roll involving this particle
    pub last_collision_ms: Option<f64>,
}

impl Particle {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: u32,
        kind: ParticleKind,
        pos: Vec2,
        heading: f32,
        speed: f64,
        radius: f32,
        direction: Direction,
        stability: f32,
        now_ms: f64,
    ) -> Self {
        Self {
            id,
            kind,
            pos,
            heading,
            base_speed: speed,
            current_speed: speed,
            radius,
            direction,
            stability: stability.max(f32::EPSILON),
            distance_traveled: 0.0,
            speed_gain: 0.0,
            laps: 0,
            age_ms: 0.0,
            created_ms: now_ms,
            boosted: false,
            boost_start_ms: 0.0,
            boost_peak: 1.0,
            magnet_boost: 1.0,
            near_magnet: false,
            last_magnet_boost_ms: None,
            last_collision_ms: None,
        }
    }

    /// Apply a click boost with a fresh timestamp
    pub fn apply_click_boost(&mut self, boost_power: f32, now_ms: f64) {
        self.boosted = true;
        self.boost_start_ms = now_ms;
        self.boost_peak = CLICK_BOOST_PEAK * boost_power as f64;
        self.current_speed = (self.base_speed * self.boost_peak).min(PARTICLE_SPEED_CEILING);
    }

    /// Fade the click boost linearly from its peak back to 1x
    pub fn update_boost(&mut self, now_ms: f64) {
        if !self.boosted {
            return;
        }
        let elapsed = now_ms - self.boost_start_ms;
        if elapsed >= BOOST_DURATION_MS {
            self.boosted = false;
            self.current_speed = self.base_speed;
        } else {
            let ratio = 1.0 - elapsed / BOOST_DURATION_MS;
            let multiplier = 1.0 + (self.boost_peak - 1.0) * ratio;
            self.current_speed = (self.base_speed * multiplier).min(PARTICLE_SPEED_CEILING);
        }
    }

    /// Move one tick along the heading. Returns the distance covered.
    pub fn advance(&mut self) -> f64 {
        self.pos += Vec2::from_angle(self.heading) * self.current_speed as f32;
        self.distance_traveled += self.current_speed;
        self.current_speed
    }

    /// Re-derive speed from the travel bonus and the unboosted spawn speed.
    /// The held magnet multiplier scales the spawn speed only.
    pub fn rederive_speed(&mut self, spawn_speed: f64, acceleration: f64, perimeter: f32) {
        self.speed_gain = acceleration * self.distance_traveled
            + self.laps as f64 * 0.1
            + self.distance_traveled / perimeter.max(1.0) as f64 * 0.05;
        self.set_base_speed(spawn_speed * self.magnet_boost + self.speed_gain);
    }

    /// Set the unboosted speed; the current speed follows unless boosted
    pub fn set_base_speed(&mut self, speed: f64) {
        self.base_speed = speed.min(PARTICLE_SPEED_CEILING);
        if !self.boosted {
            self.current_speed = self.base_speed;
        }
    }

    /// Both the collision and near-miss debounce have expired
    #[inline]
    pub fn collision_ready(&self, now_ms: f64) -> bool {
        self.last_collision_ms
            .is_none_or(|t| now_ms - t > COLLISION_DEBOUNCE_MS)
    }

    #[inline]
    pub fn magnet_ready(&self, now_ms: f64) -> bool {
        self.last_magnet_boost_ms
            .is_none_or(|t| now_ms - t > MAGNET_DEBOUNCE_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn electron(now: f64) -> Particle {
        Particle::new(
            1,
            ParticleKind::Electron,
            Vec2::ZERO,
            0.0,
            1.0,
            2.5,
            Direction::Clockwise,
            1.0,
            now,
        )
    }

    #[test]
    fn test_base_speed_formula() {
        assert!((base_speed_for(1, 1) - 1.0).abs() < 1e-6);
        // (0.5 + 1.5) * (1 + 0.2)
        assert!((base_speed_for(3, 3) - 2.4).abs() < 1e-6);
    }

    #[test]
    fn test_decay_probability_scenario() {
        let p = decay_probability(1.0, 60_000.0);
        assert!((p - BASE_DECAY_CONSTANT).abs() < 1e-15);
        assert_eq!(decay_probability(2.0, 0.0), 0.0);
        assert!(decay_probability(2.0, 60_000.0) < p);
    }

    #[test]
    fn test_click_boost_fades_linearly() {
        let mut p = electron(0.0);
        p.apply_click_boost(1.0, 1000.0);
        assert!((p.current_speed - 2.5).abs() < 1e-6);

        p.update_boost(2500.0); // halfway
        assert!((p.current_speed - 1.75).abs() < 1e-5);

        p.update_boost(4000.0);
        assert!(!p.boosted);
        assert_eq!(p.current_speed, p.base_speed);
    }

    #[test]
    fn test_click_boost_peak_scales_with_boost_power() {
        let mut p = electron(0.0);
        p.apply_click_boost(2.0, 0.0);
        assert!((p.current_speed - 5.0).abs() < 1e-9);

        // Fade keeps the upgraded peak: 1 + 4 * 0.5
        p.update_boost(1500.0);
        assert!((p.current_speed - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_advance_accumulates_distance() {
        let mut p = electron(0.0);
        p.current_speed = 2.0;
        p.advance();
        p.advance();
        assert!((p.pos.x - 4.0).abs() < 1e-5);
        assert!((p.distance_traveled - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_rederive_respects_boost() {
        let mut p = electron(0.0);
        p.distance_traveled = 1000.0;
        p.rederive_speed(1.0, 0.0001, 1000.0);
        // 0.1 + 0 laps + 0.05
        assert!((p.base_speed - 1.15).abs() < 1e-5);
        assert_eq!(p.current_speed, p.base_speed);

        p.apply_click_boost(1.0, 0.0);
        let boosted = p.current_speed;
        p.rederive_speed(1.0, 0.0001, 1000.0);
        assert_eq!(p.current_speed, boosted);
    }

    #[test]
    fn test_magnet_boost_does_not_scale_travel_gain() {
        let mut p = electron(0.0);
        p.distance_traveled = 1000.0;
        p.magnet_boost = 2.5;
        p.rederive_speed(1.0, 0.0001, 1000.0);
        // 1 * 2.5 + 0.15
        assert!((p.base_speed - 2.65).abs() < 1e-9);
    }

    #[test]
    fn test_speed_is_capped() {
        let mut p = electron(0.0);
        p.distance_traveled = 1.0e300;
        p.rederive_speed(1.0, 0.0005, 1000.0);
        assert_eq!(p.base_speed, PARTICLE_SPEED_CEILING);
        assert_eq!(p.current_speed, PARTICLE_SPEED_CEILING);

        p.apply_click_boost(3.0, 0.0);
        assert_eq!(p.current_speed, PARTICLE_SPEED_CEILING);
        p.advance();
        assert!(p.pos.is_finite());
    }

    #[test]
    fn test_debounce_windows() {
        let mut p = electron(0.0);
        assert!(p.collision_ready(0.0));
        p.last_collision_ms = Some(100.0);
        assert!(!p.collision_ready(600.0));
        assert!(p.collision_ready(600.1));
    }
}
