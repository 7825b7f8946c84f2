//! Task population: spawn timer, placement, movement and backfill
//!
//! Tasks are kept in a `Vec` in spawn order (ids ascending), which is the
//! iteration order everywhere else in the simulation.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::task::{Task, TaskCategory};
use crate::consts::TASK_BASE_HP;
use crate::money::{Money, formulas};
use crate::{character_home, polar_around};

/// How task HP grows with the wave
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HpScaling {
    /// `clear_bonus^(wave−1)` from the wave tracker
    #[default]
    WaveMultiplier,
    /// `wave^1.2`, the stage curve from `money::formulas`
    StageExponent,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnerConfig {
    pub interval_ms: f32,
    pub max_tasks: usize,
    /// Spawn distance from the character
    pub radius: f32,
    pub base_hp: f64,
    pub hp_scaling: HpScaling,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            interval_ms: 3000.0,
            max_tasks: 10,
            radius: 300.0,
            base_hp: TASK_BASE_HP,
            hp_scaling: HpScaling::WaveMultiplier,
        }
    }
}

/// Run context the spawner needs for placement and HP; refreshed each frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnContext {
    pub center: Vec2,
    pub wave: u32,
    /// Wave HP multiplier (used by `HpScaling::WaveMultiplier`)
    pub hp_multiplier: Money,
    /// Combined wave and debug scale on the spawn interval
    pub interval_scale: f32,
}

impl Default for SpawnContext {
    fn default() -> Self {
        Self {
            center: character_home(),
            wave: 1,
            hp_multiplier: Money::ONE,
            interval_scale: 1.0,
        }
    }
}

/// A task removed from the live set
#[derive(Debug, Clone)]
pub struct Removed {
    pub task: Task,
    /// Id of the task spawned because the set became empty
    pub backfill: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct Spawner {
    config: SpawnerConfig,
    context: SpawnContext,
    tasks: Vec<Task>,
    countdown_ms: f32,
    running: bool,
    next_id: u32,
    rng: Pcg32,
}

impl Spawner {
    pub fn new(config: SpawnerConfig, seed: u64) -> Self {
        Self {
            config,
            context: SpawnContext::default(),
            tasks: Vec::new(),
            countdown_ms: config.interval_ms,
            running: false,
            next_id: 1,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &SpawnerConfig {
        &self.config
    }

    pub fn set_context(&mut self, context: SpawnContext) {
        self.context = context;
    }

    pub fn context(&self) -> &SpawnContext {
        &self.context
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    pub fn countdown_ms(&self) -> f32 {
        self.countdown_ms
    }

    /// Spawn interval after wave and debug scaling
    pub fn effective_interval_ms(&self) -> f32 {
        (self.config.interval_ms * self.context.interval_scale).max(1.0)
    }

    /// HP for a new task of `category` in the current context
    pub fn task_hp(&self, category: TaskCategory) -> Money {
        let base = Money::from_f64(self.config.base_hp);
        let scaled = match self.config.hp_scaling {
            HpScaling::WaveMultiplier => base * self.context.hp_multiplier,
            HpScaling::StageExponent => formulas::enemy_max_hp(base, self.context.wave),
        };
        scaled * category.profile().hp_multiplier
    }

    /// Begin spawning: one task right away, then on the timer.
    /// Returns the id of the first task.
    pub fn start(&mut self) -> Option<u32> {
        self.running = true;
        self.countdown_ms = self.effective_interval_ms();
        self.spawn()
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Drop every task (game over)
    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    /// Run the spawn countdown. Returns the id of a task spawned this frame.
    pub fn tick(&mut self, dt_ms: f32) -> Option<u32> {
        if !self.running {
            return None;
        }
        self.countdown_ms -= dt_ms.max(0.0);
        if self.countdown_ms > 0.0 {
            return None;
        }
        self.countdown_ms = self.effective_interval_ms();
        self.spawn()
    }

    /// Spawn one task at a random angle around the character, if below the cap
    pub fn spawn(&mut self) -> Option<u32> {
        if self.tasks.len() >= self.config.max_tasks {
            return None;
        }
        let category = TaskCategory::from_roll(self.rng.random::<f32>());
        let angle = self.rng.random_range(0.0..std::f32::consts::TAU);
        let pos = polar_around(self.context.center, self.config.radius, angle);

        let id = self.next_id;
        self.next_id += 1;
        let hp = self.task_hp(category);
        log::debug!("Spawned {} #{} (hp {})", category.as_str(), id, hp);
        self.tasks.push(Task::new(id, category, pos, hp));
        Some(id)
    }

    /// Move every task toward the character's current position
    pub fn advance(&mut self, target: Vec2, dt_ms: f32) {
        for task in &mut self.tasks {
            task.advance(target, dt_ms);
        }
    }

    /// Remove a task. If that empties the set while running, a replacement
    /// spawns immediately.
    pub fn remove(&mut self, id: u32) -> Option<Removed> {
        let index = self.tasks.iter().position(|t| t.id == id)?;
        let task = self.tasks.remove(index);
        let backfill = if self.running && self.tasks.is_empty() {
            self.spawn()
        } else {
            None
        };
        Some(Removed { task, backfill })
    }

    /// Nearest live task to `point` (ties go to the lower id)
    pub fn nearest_to(&self, point: Vec2) -> Option<&Task> {
        self.tasks
            .iter()
            .filter(|t| !t.is_defeated())
            .min_by(|a, b| {
                a.distance_to(point)
                    .partial_cmp(&b.distance_to(point))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    }

    /// Ids of up to `n` live tasks nearest to `point`, nearest first
    pub fn nearest_ids(&self, point: Vec2, n: usize) -> Vec<u32> {
        let mut live: Vec<&Task> = self.tasks.iter().filter(|t| !t.is_defeated()).collect();
        live.sort_by(|a, b| {
            a.distance_to(point)
                .partial_cmp(&b.distance_to(point))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        live.into_iter().take(n).map(|t| t.id).collect()
    }

    /// First task (in spawn order) touching `target`
    pub fn first_touching(&self, target: Vec2, threshold: f32) -> Option<u32> {
        self.tasks
            .iter()
            .find(|t| t.is_touching(target, threshold))
            .map(|t| t.id)
    }
}
