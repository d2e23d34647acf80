//! Tick orchestrator
//!
//! [`Accelerator`] owns the game state, the particle engine and the save
//! manager. The host calls [`Accelerator::frame`] once per animation frame
//! with its timestamp; the frame clock turns that into zero or more fixed
//! simulation steps. Clicks, purchases and resets are synchronous intents
//! handled between frames.

use glam::Vec2;
use serde::Serialize;

use crate::achievements;
use crate::consts::*;
use crate::economy::{self, PurchaseError, PurchaseIntent, PurchaseReceipt, UpgradeOffer};
use crate::persistence::{SaveManager, Storage};
use crate::settings::Settings;
use crate::sim::{
    AcceleratorShape, EventQueue, GameState, Particle, ParticleEngine, ParticleKind, TickReport,
    TrackLayout, VisualEvent,
};

/// Seed used when settings do not provide one
const FALLBACK_SEED: u64 = 0x5eed_c011_1de5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    /// Constructed, no state established yet
    Idle,
    /// Stepping every frame; never leaves this phase
    Running,
}

/// Converts host frame timestamps into fixed simulation steps
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last_time_ms: Option<f64>,
    accumulator: f64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of fixed steps owed for a frame at `time_ms`
    pub fn advance(&mut self, time_ms: f64) -> u32 {
        let dt = match self.last_time_ms {
            Some(last) => ((time_ms - last) / 1000.0).clamp(0.0, MAX_FRAME_DT),
            None => SIM_DT,
        };
        self.last_time_ms = Some(time_ms);
        self.accumulator += dt;

        let mut steps = 0;
        while self.accumulator >= SIM_DT && steps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            steps += 1;
        }
        if steps == MAX_SUBSTEPS {
            // Drop the backlog rather than spiral
            self.accumulator = 0.0;
        }
        steps
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Numbers shown in the stats panel
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub energy: f64,
    pub collisions: u64,
    pub collision_rate: f64,
    pub live_particles: usize,
    pub max_particles: u32,
    pub spawn_rate_per_sec: f64,
    pub collision_chance_pct: f64,
    pub unlocked_types: usize,
    pub energy_per_click: f64,
    pub cheapest_upgrade: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticleView {
    pub id: u32,
    pub kind: ParticleKind,
    pub pos: Vec2,
    pub radius: f32,
    pub color: u32,
    pub boosted: bool,
}

/// Everything the renderer and UI need for one frame
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderFrame {
    pub time_ms: f64,
    pub shape: AcceleratorShape,
    pub center: Vec2,
    pub ring_radius: f32,
    pub ring_width: f32,
    pub magnets: Vec<Vec2>,
    pub particles: Vec<ParticleView>,
    /// Drained: each event appears in exactly one frame
    pub events: Vec<VisualEvent>,
    pub stats: Stats,
}

pub struct Accelerator {
    phase: Phase,
    state: GameState,
    engine: ParticleEngine,
    clock: FrameClock,
    sim_time_ms: f64,
    saves: SaveManager,
    settings: Settings,

    // Rolling collision rate
    rate_window_start_ms: f64,
    rate_window_count: u64,
    /// Fractional auto-collider collisions not yet counted
    auto_carry: f64,

    last_report: TickReport,
}

impl Accelerator {
    pub fn new(settings: Settings, storage: Box<dyn Storage>) -> Self {
        let seed = settings.seed.unwrap_or(FALLBACK_SEED);
        let events = EventQueue::new(settings.max_events_per_frame, settings.near_miss_effects);
        let engine = ParticleEngine::new(seed, TrackLayout::new(settings.viewport_size), events);
        let saves = SaveManager::new(storage, SAVE_KEY, settings.autosave_secs);
        Self {
            phase: Phase::Idle,
            state: GameState::new(),
            engine,
            clock: FrameClock::new(),
            sim_time_ms: 0.0,
            saves,
            settings,
            rate_window_start_ms: 0.0,
            rate_window_count: 0,
            auto_carry: 0.0,
            last_report: TickReport::default(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn particles(&self) -> &[Particle] {
        self.engine.particles()
    }

    pub fn engine(&self) -> &ParticleEngine {
        &self.engine
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn storage(&self) -> &dyn Storage {
        self.saves.storage()
    }

    pub fn sim_time_ms(&self) -> f64 {
        self.sim_time_ms
    }

    pub fn last_report(&self) -> &TickReport {
        &self.last_report
    }

    /// Load the saved game (or defaults) and start running.
    /// Returns true if a snapshot was loaded.
    pub fn start(&mut self) -> bool {
        if self.phase == Phase::Running {
            log::warn!("Accelerator already running");
            return false;
        }
        let loaded = self.saves.load();
        let found = loaded.is_some();
        self.start_with(loaded.unwrap_or_default());
        found
    }

    /// Start running from an explicit state
    pub fn start_with(&mut self, state: GameState) {
        if self.phase == Phase::Running {
            log::warn!("Accelerator already running");
            return;
        }
        self.state = state;
        self.engine.clear();
        self.engine.seed_initial(&mut self.state, self.sim_time_ms);
        self.restart_rate_window();
        self.clock.reset();
        self.phase = Phase::Running;
        log::info!(
            "Accelerator running (seed {}, {:.0} energy)",
            self.engine.seed(),
            self.state.resource
        );
    }

    fn restart_rate_window(&mut self) {
        self.rate_window_start_ms = self.sim_time_ms;
        self.rate_window_count = self.state.collision_count;
        self.state.collision_rate = 0.0;
        self.auto_carry = 0.0;
    }

    /// Advance to host time `time_ms`. Returns the number of steps run.
    pub fn frame(&mut self, time_ms: f64) -> u32 {
        if self.phase != Phase::Running {
            return 0;
        }
        let steps = self.clock.advance(time_ms);
        for _ in 0..steps {
            self.step();
        }
        steps
    }

    /// One fixed simulation step
    pub fn step(&mut self) -> &TickReport {
        self.sim_time_ms += SIM_DT * 1000.0;
        let now = self.sim_time_ms;

        let elapsed = now - self.rate_window_start_ms;
        if elapsed >= RATE_WINDOW_MS {
            let collisions = self.state.collision_count.saturating_sub(self.rate_window_count);
            self.state.collision_rate = collisions as f64 / (elapsed / 1000.0);
            self.rate_window_start_ms = now;
            self.rate_window_count = self.state.collision_count;
        }

        if self.state.auto_collider_rate > 0 {
            let produced = self.state.auto_collider_rate as f64 * SIM_DT;
            self.state.credit(produced * ENERGY_PER_COLLISION);
            self.auto_carry += produced;
            let whole = self.auto_carry.floor();
            self.auto_carry -= whole;
            self.state.collision_count += whole as u64;
        }

        self.last_report = self.engine.tick(&mut self.state, now, SIM_DT);
        achievements::evaluate(&mut self.state, self.engine.len());
        self.saves.autosave(&self.state, now);
        &self.last_report
    }

    /// A click at logical position `pos`. Returns the energy credited when
    /// the click lands on the ring band.
    pub fn click(&mut self, pos: Vec2) -> Option<f64> {
        if self.phase != Phase::Running {
            return None;
        }
        if !self.engine.track(&self.state).contains_click(pos) {
            return None;
        }
        let energy = self.state.click_energy();
        self.state.credit(energy);
        self.engine
            .boost_random(self.state.click_boost_power, self.sim_time_ms);
        self.engine.events.push(VisualEvent::Click { pos, energy });
        Some(energy)
    }

    /// Buy one upgrade level. Rejections change nothing.
    pub fn purchase(&mut self, intent: &PurchaseIntent) -> Result<PurchaseReceipt, PurchaseError> {
        let result = economy::purchase(&mut self.state, self.engine.particles_mut(), intent);
        match &result {
            Ok(_) => self.save_now(),
            Err(e) => log::debug!("Purchase rejected: {}", e),
        }
        result
    }

    /// Restore defaults (keeping achievements), reseed the ring and save
    pub fn reset(&mut self) {
        self.state.reset_preserving_achievements();
        self.engine.clear();
        self.engine.seed_initial(&mut self.state, self.sim_time_ms);
        self.restart_rate_window();
        self.save_now();
        log::info!("Game reset");
    }

    pub fn save_now(&mut self) {
        // Failures degrade to unpersisted play; SaveManager logs them
        let _ = self.saves.save(&self.state, self.sim_time_ms);
    }

    pub fn offers(&self) -> Vec<UpgradeOffer> {
        economy::offers(&self.state)
    }

    pub fn stats(&self) -> Stats {
        let state = &self.state;
        Stats {
            energy: state.resource,
            collisions: state.collision_count,
            collision_rate: state.collision_rate,
            live_particles: self.engine.len(),
            max_particles: state.max_live_particles,
            spawn_rate_per_sec: 1.0 / state.spawn_interval_secs as f64,
            collision_chance_pct: state.base_collision_chance as f64 * 100.0,
            unlocked_types: state.particle_types.unlocked_count(),
            energy_per_click: state.click_energy(),
            cheapest_upgrade: economy::cheapest_next_cost(state),
        }
    }

    /// Read surface for the renderer. Drains pending visual events.
    pub fn render_frame(&mut self) -> RenderFrame {
        let layout = *self.engine.layout();
        let size = self.state.accelerator_size;
        let particles = self
            .engine
            .particles()
            .iter()
            .map(|p| ParticleView {
                id: p.id,
                kind: p.kind,
                pos: p.pos,
                radius: p.radius,
                color: self.state.particle_types.get(p.kind).color,
                boosted: p.boosted,
            })
            .collect();
        RenderFrame {
            time_ms: self.sim_time_ms,
            shape: self.state.accelerator_shape,
            center: layout.center,
            ring_radius: layout.ring_radius(size),
            ring_width: layout.ring_width(size),
            magnets: self.engine.magnet_positions(&self.state),
            particles,
            stats: self.stats(),
            events: self.engine.events.drain(),
        }
    }
}
