//! Host-facing game facade
//!
//! Ties the current run to the save store: pays out Rebirth Stones at game
//! over, applies upgrades and keeps the save flushed.

use glam::Vec2;

use crate::money::{Money, format_short};
use crate::persistence::{SaveBackend, SaveStore};
use crate::platform;
use crate::progress::{self, SpendError, UpgradeInfo};
use crate::settings::DebugOverrides;
use crate::sim::{GameEvent, HudSnapshot, RunConfig, RunStart, RunState, TapOutcome, TickInput, tick};

/// Wall clock in Unix milliseconds
pub type Clock = fn() -> f64;

pub struct Game<B: SaveBackend> {
    store: SaveStore<B>,
    run: RunState,
    config: RunConfig,
    debug: DebugOverrides,
    clock: Clock,
    /// Runs started so far; each run's seed is offset by it
    runs_started: u64,
    /// Stones for the current run have been added to the save
    paid_out: bool,
}

impl<B: SaveBackend> Game<B> {
    /// Open the save and start a fresh run
    pub fn new(backend: B, config: RunConfig, debug: DebugOverrides) -> Self {
        Self::with_clock(backend, config, debug, platform::now_ms)
    }

    pub fn with_clock(backend: B, config: RunConfig, debug: DebugOverrides, clock: Clock) -> Self {
        let store = SaveStore::open(backend, clock());
        let debug = debug.sanitized();
        let run = RunState::new(
            config.clone(),
            RunStart::Fresh,
            store.record().attack_level,
            debug,
        );
        Self {
            store,
            run,
            config,
            debug,
            clock,
            runs_started: 1,
            paid_out: false,
        }
    }

    /// Start a new run, optionally skipping ahead from the best wave reached
    pub fn start_run(&mut self, quick_skip: bool) {
        let start = if quick_skip {
            RunStart::quick_skip_from(self.store.record().max_stage)
        } else {
            RunStart::Fresh
        };
        self.start_run_at(start);
    }

    pub fn start_run_at(&mut self, start: RunStart) {
        let mut config = self.config.clone();
        config.seed = config.seed.wrapping_add(self.runs_started);
        self.runs_started += 1;

        self.run = RunState::new(config, start, self.store.record().attack_level, self.debug);
        self.paid_out = false;
    }

    /// Advance one frame. Returns the events produced since the last call.
    pub fn update(&mut self, delta_ms: f32) -> Vec<GameEvent> {
        tick(&mut self.run, &TickInput::default(), delta_ms);

        let now = (self.clock)();
        if !self.paid_out {
            if let Some(summary) = &self.run.summary {
                progress::gain_rebirth_stones(&mut self.store, summary.wave, now);
                self.paid_out = true;
            }
        }
        self.store.flush(now);

        self.run.drain_events()
    }

    /// Tap at arena coordinates
    pub fn tap(&mut self, x: f32, y: f32) -> TapOutcome {
        crate::sim::tap(&mut self.run, Vec2::new(x, y))
    }

    pub fn set_character_position(&mut self, x: f32, y: f32) {
        if x.is_finite() && y.is_finite() {
            self.run.character = Vec2::new(x, y);
        }
    }

    /// HUD values including the saved Rebirth Stones and attack level
    pub fn hud(&self) -> HudSnapshot {
        let mut hud = self.run.hud();
        hud.rebirth_stones = format_short(&self.store.record().rebirth_stones);
        hud.attack_level = self.store.record().attack_level;
        hud
    }

    /// Buy one attack level; the current run uses it immediately
    pub fn upgrade_attack(&mut self) -> Result<u32, SpendError> {
        let level = progress::upgrade_attack_level(&mut self.store, (self.clock)())?;
        self.run.attack_level = level;
        Ok(level)
    }

    pub fn attack_upgrade_info(&self) -> UpgradeInfo {
        progress::attack_level_info(&self.store)
    }

    pub fn rebirth_stones(&self) -> Money {
        self.store.record().rebirth_stones
    }

    pub fn max_stage(&self) -> u32 {
        self.store.record().max_stage
    }

    pub fn debug(&self) -> DebugOverrides {
        self.debug
    }

    /// Replace debug overrides and persist them
    pub fn set_debug(&mut self, debug: DebugOverrides) {
        self.debug = debug.sanitized();
        self.run.debug = self.debug;
        self.debug.save();
    }

    pub fn run(&self) -> &RunState {
        &self.run
    }

    pub fn run_mut(&mut self) -> &mut RunState {
        &mut self.run
    }

    pub fn store(&self) -> &SaveStore<B> {
        &self.store
    }
}
