//! Deterministic particle simulation
//!
//! All physics lives here. Given the same seed and the same sequence of
//! simulation times, a run is reproducible:
//! - Time is passed in, never read from a clock
//! - Seeded RNG only
//! - Stable iteration order (back to front over the live collection)
//! - No rendering or platform dependencies

pub mod collision;
pub mod events;
pub mod particle;
pub mod state;
pub mod tick;
pub mod track;

pub use collision::CollisionRoll;
pub use events::{EventQueue, VisualEvent};
pub use particle::{Particle, base_speed_for, decay_probability, radius_for};
pub use state::{
    AcceleratorShape, Direction, GameState, ParticleCatalog, ParticleKind, ParticleTypeDef,
    SpawnSettings,
};
pub use tick::{ParticleEngine, TickReport};
pub use track::{TrackGeometry, TrackLayout, TrackPoint};
