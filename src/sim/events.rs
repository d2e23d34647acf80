//! Fire-and-forget visual events
//!
//! The simulation pushes events as things happen; the renderer drains them
//! once per frame. Each event is delivered at most once.

use glam::Vec2;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum VisualEvent {
    /// Two particles annihilated; size the burst by `energy`
    Collision { pos: Vec2, energy: f64 },
    /// An eligible pair rolled and passed through each other
    NearMiss { pos: Vec2 },
    /// A particle entered a magnet field and was boosted
    MagnetBoost { pos: Vec2, magnet: Vec2 },
    /// A decayed particle was recycled into energy
    Recycling { pos: Vec2, energy: f64 },
    /// A click landed on the ring
    Click { pos: Vec2, energy: f64 },
}

/// Bounded per-frame event buffer
#[derive(Debug, Clone)]
pub struct EventQueue {
    events: Vec<VisualEvent>,
    capacity: usize,
    /// Events discarded because the buffer was full
    dropped: u64,
    near_misses: bool,
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new(256, true)
    }
}

impl EventQueue {
    pub fn new(capacity: usize, near_misses: bool) -> Self {
        Self {
            events: Vec::with_capacity(capacity.min(1024)),
            capacity,
            dropped: 0,
            near_misses,
        }
    }

    pub fn push(&mut self, event: VisualEvent) {
        if !self.near_misses && matches!(event, VisualEvent::NearMiss { .. }) {
            return;
        }
        if self.events.len() >= self.capacity {
            self.dropped += 1;
            return;
        }
        self.events.push(event);
    }

    /// Take every pending event, leaving the queue empty
    pub fn drain(&mut self) -> Vec<VisualEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn pending(&self) -> &[VisualEvent] {
        &self.events
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
