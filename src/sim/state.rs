//! Run state and core simulation types
//!
//! One `RunState` owns every component of a run. Nothing outside `sim::tick`
//! mutates more than one component at a time.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::attack::{AttackConfig, AutoAttack, DamageModifiers, Projectile, auto_attack_interval};
use super::awakening::{Awakening, AwakeningKind, TensionConfig};
use super::combo::{Combo, DEFAULT_MAX_COMBO};
use super::reward::TaskRewards;
use super::spawner::{SpawnContext, Spawner, SpawnerConfig};
use super::stress::{Emotion, Stress, StressConfig, dialogue_for};
use super::task::TaskCategory;
use super::wave::{Wave, WaveConfig};
use crate::character_home;
use crate::consts::*;
use crate::money::{Money, format_short, formulas};
use crate::settings::DebugOverrides;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    Running,
    GameOver,
}

/// Where a run begins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStart {
    /// Wave 1
    Fresh,
    /// Start at a later wave; resources are still zeroed
    QuickSkip { wave: u32 },
}

impl RunStart {
    /// Quick skip resumes a few waves below the best wave reached
    pub fn quick_skip_from(max_stage: u32) -> Self {
        RunStart::QuickSkip {
            wave: max_stage.saturating_sub(QUICK_SKIP_OFFSET).max(1),
        }
    }

    pub fn wave(&self) -> u32 {
        match self {
            RunStart::Fresh => 1,
            RunStart::QuickSkip { wave } => (*wave).max(1),
        }
    }
}

/// Complete tuning for one run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Seed for spawn categories and placement
    pub seed: u64,
    pub stress: StressConfig,
    pub tension: TensionConfig,
    pub wave: WaveConfig,
    pub spawner: SpawnerConfig,
    pub attack: AttackConfig,
    pub max_combo: u32,
    pub arena_width: f32,
    pub arena_height: f32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            stress: StressConfig::default(),
            tension: TensionConfig::default(),
            wave: WaveConfig::default(),
            spawner: SpawnerConfig::default(),
            attack: AttackConfig::default(),
            max_combo: DEFAULT_MAX_COMBO,
            arena_width: ARENA_WIDTH,
            arena_height: ARENA_HEIGHT,
        }
    }
}

impl RunConfig {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }
}

/// Result of a finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Wave the run ended on
    pub wave: u32,
    pub rebirth_stones: Money,
    pub total_damage: Money,
    pub debug_points: u64,
    pub tasks_defeated: u64,
    pub elapsed_ms: f64,
}

/// Events for the presentation layer (drained by the host each frame)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    TaskSpawned {
        id: u32,
        category: TaskCategory,
        pos: Vec2,
    },
    TaskDefeated {
        id: u32,
        category: TaskCategory,
    },
    WaveAdvanced {
        wave: u32,
    },
    AwakeningStarted {
        kind: AwakeningKind,
    },
    AwakeningEnded {
        kind: AwakeningKind,
    },
    ProjectileFired {
        id: u32,
        pos: Vec2,
        dir: Vec2,
        tap: bool,
    },
    Damage {
        task_id: u32,
        amount: Money,
        tap: bool,
    },
    GameOver {
        summary: RunSummary,
    },
}

/// Read-only view of a run for the HUD
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HudSnapshot {
    pub phase: RunPhase,
    /// HP ratio of the task nearest the character
    pub nearest_task_hp: Option<f32>,
    pub stress_percent: f32,
    pub emotion: Emotion,
    pub dialogue: String,
    pub combo: u32,
    pub combo_multiplier: f64,
    pub tension_percent: f32,
    pub awakening: Option<AwakeningKind>,
    pub awakening_remaining_secs: f32,
    pub wave: u32,
    pub wave_remaining: u32,
    pub feature_level: u32,
    pub feature_remaining_secs: f32,
    pub code_quality_level: u32,
    pub emergency_response_level: u32,
    pub debug_points: u64,
    pub total_damage: String,
    /// Filled in by the host from the save record
    pub rebirth_stones: String,
    pub attack_level: u32,
    pub tasks: usize,
}

/// Complete state of one run
#[derive(Debug, Clone)]
pub struct RunState {
    pub config: RunConfig,
    pub phase: RunPhase,
    /// Where the character stands; tasks walk toward it
    pub character: Vec2,
    /// Permanent attack level from the save
    pub attack_level: u32,
    pub debug: DebugOverrides,
    pub stress: Stress,
    pub combo: Combo,
    pub awakening: Awakening,
    pub wave: Wave,
    pub rewards: TaskRewards,
    pub spawner: Spawner,
    pub auto_attack: AutoAttack,
    /// Live projectiles in firing order
    pub projectiles: Vec<Projectile>,
    /// Countdown to the next proximity stress pulse
    pub stress_pulse_ms: f32,
    pub total_damage: Money,
    pub tasks_defeated: u64,
    pub elapsed_ms: f64,
    pub summary: Option<RunSummary>,
    events: Vec<GameEvent>,
    next_projectile_id: u32,
}

impl RunState {
    /// Start a run. The first task spawns immediately.
    pub fn new(config: RunConfig, start: RunStart, attack_level: u32, debug: DebugOverrides) -> Self {
        let mut wave = Wave::new(config.wave);
        wave.set_wave(start.wave());

        let mut state = Self {
            phase: RunPhase::Running,
            character: character_home(),
            attack_level,
            debug: debug.sanitized(),
            stress: Stress::new(config.stress),
            combo: Combo::new(config.max_combo),
            awakening: Awakening::new(config.tension),
            wave,
            rewards: TaskRewards::new(),
            spawner: Spawner::new(config.spawner, config.seed),
            auto_attack: AutoAttack::default(),
            projectiles: Vec::new(),
            stress_pulse_ms: STRESS_PULSE_MS,
            total_damage: Money::ZERO,
            tasks_defeated: 0,
            elapsed_ms: 0.0,
            summary: None,
            events: Vec::new(),
            next_projectile_id: 1,
            config,
        };

        state.auto_attack = AutoAttack::new(state.auto_interval());
        let context = state.spawn_context();
        state.spawner.set_context(context);
        if let Some(id) = state.spawner.start() {
            state.push_spawned(id);
        }
        log::info!(
            "Run started at wave {} (attack level {})",
            state.wave.current(),
            attack_level
        );
        state
    }

    pub fn is_running(&self) -> bool {
        self.phase == RunPhase::Running
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == RunPhase::GameOver
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Record a spawn event for a task that is in the live set
    pub fn push_spawned(&mut self, id: u32) {
        if let Some(task) = self.spawner.get(id) {
            let event = GameEvent::TaskSpawned {
                id,
                category: task.category,
                pos: task.pos,
            };
            self.events.push(event);
        }
    }

    /// Pending events, oldest first
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn next_projectile_id(&mut self) -> u32 {
        let id = self.next_projectile_id;
        self.next_projectile_id += 1;
        id
    }

    pub fn emotion(&self) -> Emotion {
        self.stress.emotion(self.combo.count())
    }

    /// Current wave and debug scaling for the spawner
    pub fn spawn_context(&self) -> SpawnContext {
        SpawnContext {
            center: self.character,
            wave: self.wave.current(),
            hp_multiplier: self.wave.hp_multiplier(),
            interval_scale: self.wave.spawn_interval_multiplier() * self.debug.spawn_interval_scale,
        }
    }

    pub fn damage_modifiers(&self) -> DamageModifiers {
        DamageModifiers {
            attack_level: self.attack_level,
            combo_multiplier: self.combo.multiplier(),
            emotion_multiplier: self.emotion().attack_multiplier(),
            feature_multiplier: self.rewards.feature_attack_multiplier(),
            focus: self.awakening.is_focus(),
            debug_multiplier: self.debug.attack_multiplier,
        }
    }

    pub fn hit_damage(&self, tap: bool) -> Money {
        super::attack::hit_damage(&self.config.attack, &self.damage_modifiers(), tap)
    }

    pub fn auto_interval(&self) -> f32 {
        auto_attack_interval(
            &self.config.attack,
            self.rewards.code_quality_multiplier(),
            self.awakening.is_focus(),
            self.debug.auto_interval_scale,
        )
    }

    /// Summary for the run so far, payout from the current wave
    pub fn build_summary(&self) -> RunSummary {
        let wave = self.wave.current();
        RunSummary {
            wave,
            rebirth_stones: formulas::rebirth_stones(wave),
            total_damage: self.total_damage,
            debug_points: self.rewards.debug_points(),
            tasks_defeated: self.tasks_defeated,
            elapsed_ms: self.elapsed_ms,
        }
    }

    pub fn hud(&self) -> HudSnapshot {
        let combo = self.combo.count();
        HudSnapshot {
            phase: self.phase,
            nearest_task_hp: self.spawner.nearest_to(self.character).map(|t| t.hp_ratio()),
            stress_percent: self.stress.level() * 100.0,
            emotion: self.emotion(),
            dialogue: dialogue_for(self.stress.level(), combo).to_string(),
            combo,
            combo_multiplier: self.combo.multiplier(),
            tension_percent: self.awakening.level() * 100.0,
            awakening: self.awakening.kind(),
            awakening_remaining_secs: self.awakening.remaining_secs(),
            wave: self.wave.current(),
            wave_remaining: self.wave.remaining(),
            feature_level: self.rewards.feature_level(),
            feature_remaining_secs: self.rewards.feature_remaining_ms() / 1000.0,
            code_quality_level: self.rewards.code_quality_level(),
            emergency_response_level: self.rewards.emergency_response_level(),
            debug_points: self.rewards.debug_points(),
            total_damage: format_short(&self.total_damage),
            rebirth_stones: "0".to_string(),
            attack_level: self.attack_level,
            tasks: self.spawner.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_run_spawns_first_task() {
        let state = RunState::new(RunConfig::with_seed(7), RunStart::Fresh, 0, DebugOverrides::default());
        assert!(state.is_running());
        assert_eq!(state.spawner.len(), 1);
        assert!(matches!(state.events()[0], GameEvent::TaskSpawned { id: 1, .. }));
        assert_eq!(state.wave.current(), 1);
        assert_eq!(state.combo.count(), 0);
    }

    #[test]
    fn test_quick_skip_start() {
        assert_eq!(RunStart::quick_skip_from(12), RunStart::QuickSkip { wave: 7 });
        assert_eq!(RunStart::quick_skip_from(3), RunStart::QuickSkip { wave: 1 });

        let state = RunState::new(
            RunConfig::with_seed(7),
            RunStart::quick_skip_from(12),
            0,
            DebugOverrides::default(),
        );
        assert_eq!(state.wave.current(), 7);
        assert_eq!(state.combo.count(), 0);
        assert_eq!(state.stress.value(), 0.0);
        assert_eq!(state.rewards.debug_points(), 0);
    }

    #[test]
    fn test_drain_events() {
        let mut state = RunState::new(RunConfig::default(), RunStart::Fresh, 0, DebugOverrides::default());
        assert_eq!(state.drain_events().len(), 1);
        assert!(state.events().is_empty());
    }

    #[test]
    fn test_summary_payout() {
        let mut state = RunState::new(RunConfig::default(), RunStart::Fresh, 0, DebugOverrides::default());
        state.wave.set_wave(10);
        assert_eq!(state.build_summary().rebirth_stones.to_f64(), 31.0);
    }

    #[test]
    fn test_hud_snapshot() {
        let state = RunState::new(RunConfig::default(), RunStart::Fresh, 3, DebugOverrides::default());
        let hud = state.hud();
        assert_eq!(hud.wave, 1);
        assert_eq!(hud.wave_remaining, 10);
        assert_eq!(hud.nearest_task_hp, Some(1.0));
        assert_eq!(hud.emotion, Emotion::Normal);
        assert_eq!(hud.attack_level, 3);
        assert_eq!(hud.total_damage, "0");
        let json = serde_json::to_string(&hud).unwrap();
        assert!(json.contains("\"wave\":1"));
    }
}
