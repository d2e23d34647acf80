//! Accelerator track geometry
//!
//! Each shape implements [`TrackGeometry`]: where particles enter, how a
//! drifting particle is projected back onto the path, how laps are counted
//! and where magnets sit. All shapes are centered in the play field and scale
//! with the accelerator size level.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use glam::Vec2;
use serde::Serialize;

use super::particle::Particle;
use super::state::{AcceleratorShape, Direction};
use crate::{cartesian_to_polar, polar_to_cartesian};

/// Oval semi-axes relative to the ring radius
const OVAL_X_FACTOR: f32 = 1.2;
const OVAL_Y_FACTOR: f32 = 0.8;

/// Drift allowed before a particle is snapped back onto the path
const CIRCLE_TOLERANCE: f32 = 1.0;
const OVAL_TOLERANCE: f32 = 2.0;
const FIGURE_EIGHT_TOLERANCE: f32 = 5.0;
const LINE_TOLERANCE: f32 = 2.0;

/// A position on the track plus the heading of travel there
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackPoint {
    pub pos: Vec2,
    pub heading: f32,
}

/// Play-field dimensions the track is laid out in
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrackLayout {
    pub center: Vec2,
    /// Half the play-field edge length
    pub half_extent: f32,
}

impl TrackLayout {
    pub fn new(viewport: f32) -> Self {
        Self {
            center: Vec2::splat(viewport / 2.0),
            half_extent: viewport / 2.0,
        }
    }

    /// Ring radius for an accelerator size level
    #[inline]
    pub fn ring_radius(&self, size: u32) -> f32 {
        self.half_extent * (0.3 + size as f32 * 0.1)
    }

    /// Width of the ring band (click target and drawing)
    #[inline]
    pub fn ring_width(&self, size: u32) -> f32 {
        5.0 + size as f32 * 2.0
    }

    #[inline]
    pub fn figure_eight_radius(&self, size: u32) -> f32 {
        self.half_extent * (0.24 + size as f32 * 0.08)
    }

    /// Build the geometry for a shape at a size level
    pub fn geometry(&self, shape: AcceleratorShape, size: u32) -> Box<dyn TrackGeometry> {
        let radius = self.ring_radius(size);
        let band = self.ring_width(size);
        match shape {
            AcceleratorShape::Circle => Box::new(CircleTrack {
                center: self.center,
                radius,
                band,
            }),
            AcceleratorShape::Oval => Box::new(OvalTrack {
                center: self.center,
                x_radius: radius * OVAL_X_FACTOR,
                y_radius: radius * OVAL_Y_FACTOR,
                band,
            }),
            AcceleratorShape::FigureEight => Box::new(FigureEightTrack {
                center: self.center,
                radius: self.figure_eight_radius(size),
                band,
            }),
            AcceleratorShape::Line => Box::new(LineTrack {
                center: self.center,
                half_length: radius,
                band,
            }),
        }
    }
}

/// Shape-specific track behavior
pub trait TrackGeometry {
    fn shape(&self) -> AcceleratorShape;

    /// Entry point at path parameter `t` (radians) and the heading for `direction`
    fn spawn_point(&self, t: f32, direction: Direction) -> TrackPoint;

    /// Nearest path point to `pos` and the heading there for `direction`
    fn project(&self, pos: Vec2, direction: Direction) -> TrackPoint;

    /// Drift tolerated before `constrain` snaps a particle back
    fn tolerance(&self) -> f32;

    /// Length of one lap
    fn perimeter(&self) -> f32;

    /// Width of the clickable band around the path
    fn band_width(&self) -> f32;

    /// Count a lap for a particle that just moved from `prev`.
    /// May turn the particle around (line ends).
    fn detect_lap(&self, prev: Vec2, particle: &mut Particle) -> bool;

    /// Snap a drifting particle back onto the path, heading tangent to it
    fn constrain(&self, particle: &mut Particle) {
        let target = self.project(particle.pos, particle.direction);
        if particle.pos.distance(target.pos) > self.tolerance() {
            particle.pos = target.pos;
            particle.heading = target.heading;
        }
    }

    /// Magnets sit evenly spaced along the path parameter
    fn magnet_positions(&self, count: u32) -> Vec<Vec2> {
        (0..count)
            .map(|i| {
                let t = i as f32 / count as f32 * TAU;
                self.spawn_point(t, Direction::Clockwise).pos
            })
            .collect()
    }

    /// Whether a click lands inside the active band (path ± band/2)
    fn contains_click(&self, pos: Vec2) -> bool {
        let nearest = self.project(pos, Direction::Clockwise);
        pos.distance(nearest.pos) <= self.band_width() / 2.0
    }
}

/// Angular wrap-around test shared by the closed curves
fn crossed_seam(center: Vec2, prev: Vec2, now: Vec2, direction: Direction) -> bool {
    let (_, prev_angle) = cartesian_to_polar(center, prev);
    let (_, new_angle) = cartesian_to_polar(center, now);
    match direction {
        Direction::Clockwise => prev_angle > 0.0 && new_angle < 0.0,
        Direction::CounterClockwise => prev_angle < 0.0 && new_angle > 0.0,
    }
}

fn flip(heading: f32, direction: Direction) -> f32 {
    match direction {
        Direction::Clockwise => heading,
        Direction::CounterClockwise => heading + PI,
    }
}

pub struct CircleTrack {
    pub center: Vec2,
    pub radius: f32,
    pub band: f32,
}

impl TrackGeometry for CircleTrack {
    fn shape(&self) -> AcceleratorShape {
        AcceleratorShape::Circle
    }

    fn spawn_point(&self, t: f32, direction: Direction) -> TrackPoint {
        TrackPoint {
            pos: polar_to_cartesian(self.center, self.radius, t),
            heading: t + FRAC_PI_2 * direction.sign(),
        }
    }

    fn project(&self, pos: Vec2, direction: Direction) -> TrackPoint {
        let (_, angle) = cartesian_to_polar(self.center, pos);
        self.spawn_point(angle, direction)
    }

    fn tolerance(&self) -> f32 {
        CIRCLE_TOLERANCE
    }

    fn perimeter(&self) -> f32 {
        TAU * self.radius
    }

    fn band_width(&self) -> f32 {
        self.band
    }

    fn detect_lap(&self, prev: Vec2, particle: &mut Particle) -> bool {
        crossed_seam(self.center, prev, particle.pos, particle.direction)
    }

    fn contains_click(&self, pos: Vec2) -> bool {
        let (dist, _) = cartesian_to_polar(self.center, pos);
        (dist - self.radius).abs() <= self.band / 2.0
    }
}

pub struct OvalTrack {
    pub center: Vec2,
    pub x_radius: f32,
    pub y_radius: f32,
    pub band: f32,
}

impl OvalTrack {
    fn point_at(&self, angle: f32) -> Vec2 {
        self.center + Vec2::new(angle.cos() * self.x_radius, angle.sin() * self.y_radius)
    }

    fn tangent_at(&self, angle: f32) -> f32 {
        (self.y_radius * angle.cos()).atan2(-self.x_radius * angle.sin())
    }
}

impl TrackGeometry for OvalTrack {
    fn shape(&self) -> AcceleratorShape {
        AcceleratorShape::Oval
    }

    fn spawn_point(&self, t: f32, direction: Direction) -> TrackPoint {
        TrackPoint {
            pos: self.point_at(t),
            heading: flip(self.tangent_at(t), direction),
        }
    }

    fn project(&self, pos: Vec2, direction: Direction) -> TrackPoint {
        // Radial projection: exact for circles, close enough for mild ellipses
        let (_, angle) = cartesian_to_polar(self.center, pos);
        self.spawn_point(angle, direction)
    }

    fn tolerance(&self) -> f32 {
        OVAL_TOLERANCE
    }

    fn perimeter(&self) -> f32 {
        // Ramanujan's approximation
        let (a, b) = (self.x_radius, self.y_radius);
        PI * (3.0 * (a + b) - ((3.0 * a + b) * (a + 3.0 * b)).sqrt())
    }

    fn band_width(&self) -> f32 {
        self.band
    }

    fn detect_lap(&self, prev: Vec2, particle: &mut Particle) -> bool {
        crossed_seam(self.center, prev, particle.pos, particle.direction)
    }
}

/// Lemniscate-like path `(sin 2t · R, sin t · 1.5R)`
pub struct FigureEightTrack {
    pub center: Vec2,
    pub radius: f32,
    pub band: f32,
}

impl FigureEightTrack {
    fn point_at(&self, t: f32) -> Vec2 {
        self.center + Vec2::new((t * 2.0).sin() * self.radius, t.sin() * self.radius * 1.5)
    }

    fn tangent_at(&self, t: f32) -> f32 {
        let dx = 2.0 * (t * 2.0).cos() * self.radius;
        let dy = t.cos() * self.radius * 1.5;
        dy.atan2(dx)
    }
}

impl TrackGeometry for FigureEightTrack {
    fn shape(&self) -> AcceleratorShape {
        AcceleratorShape::FigureEight
    }

    fn spawn_point(&self, t: f32, direction: Direction) -> TrackPoint {
        TrackPoint {
            pos: self.point_at(t),
            heading: flip(self.tangent_at(t), direction),
        }
    }

    fn project(&self, pos: Vec2, direction: Direction) -> TrackPoint {
        // Uses the polar angle as the path parameter, which only approximates
        // the closest point on the curve.
        let (_, angle) = cartesian_to_polar(self.center, pos);
        self.spawn_point(angle.rem_euclid(TAU), direction)
    }

    fn tolerance(&self) -> f32 {
        FIGURE_EIGHT_TOLERANCE
    }

    fn perimeter(&self) -> f32 {
        const SAMPLES: usize = 64;
        let mut length = 0.0;
        let mut prev = self.point_at(0.0);
        for i in 1..=SAMPLES {
            let p = self.point_at(i as f32 / SAMPLES as f32 * TAU);
            length += prev.distance(p);
            prev = p;
        }
        length
    }

    fn band_width(&self) -> f32 {
        self.band
    }

    /// Lap counting on the figure-eight has no defined seam; never counts.
    fn detect_lap(&self, _prev: Vec2, _particle: &mut Particle) -> bool {
        false
    }
}

/// Horizontal segment through the center; particles bounce between the ends
pub struct LineTrack {
    pub center: Vec2,
    pub half_length: f32,
    pub band: f32,
}

impl TrackGeometry for LineTrack {
    fn shape(&self) -> AcceleratorShape {
        AcceleratorShape::Line
    }

    fn spawn_point(&self, t: f32, direction: Direction) -> TrackPoint {
        TrackPoint {
            pos: Vec2::new(self.center.x + t.cos() * self.half_length, self.center.y),
            heading: flip(0.0, direction),
        }
    }

    fn project(&self, pos: Vec2, direction: Direction) -> TrackPoint {
        let x = pos
            .x
            .clamp(self.center.x - self.half_length, self.center.x + self.half_length);
        TrackPoint {
            pos: Vec2::new(x, self.center.y),
            heading: flip(0.0, direction),
        }
    }

    fn tolerance(&self) -> f32 {
        LINE_TOLERANCE
    }

    fn perimeter(&self) -> f32 {
        4.0 * self.half_length
    }

    fn band_width(&self) -> f32 {
        self.band
    }

    fn detect_lap(&self, _prev: Vec2, particle: &mut Particle) -> bool {
        if particle.pos.distance(self.center) > self.half_length {
            particle.heading = (particle.heading + PI).rem_euclid(TAU);
            return true;
        }
        false
    }

    fn constrain(&self, particle: &mut Particle) {
        if (particle.pos.y - self.center.y).abs() > LINE_TOLERANCE {
            particle.pos.y = self.center.y;
        }
        let left = self.center.x - self.half_length;
        let right = self.center.x + self.half_length;
        if particle.pos.x < left {
            particle.pos.x = left;
            particle.heading = 0.0;
        } else if particle.pos.x > right {
            particle.pos.x = right;
            particle.heading = PI;
        }
    }

    fn magnet_positions(&self, count: u32) -> Vec<Vec2> {
        (0..count)
            .map(|i| {
                let x = if count > 1 {
                    -1.0 + 2.0 * i as f32 / (count - 1) as f32
                } else {
                    0.0
                };
                Vec2::new(self.center.x + x * self.half_length, self.center.y)
            })
            .collect()
    }
}
