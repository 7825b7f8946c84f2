//! Deterministic run simulation
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Countdown timers advanced by the frame's `dt_ms` only
//! - Seeded RNG only
//! - Stable iteration order (spawn order, ascending ids)
//! - No rendering or platform dependencies

pub mod attack;
pub mod awakening;
pub mod collision;
pub mod combo;
pub mod reward;
pub mod spawner;
pub mod state;
pub mod stress;
pub mod task;
pub mod tick;
pub mod wave;

pub use attack::{AttackConfig, AutoAttack, DamageModifiers, Motion, Projectile};
pub use awakening::{Awakening, AwakeningKind, AwakeningState, TensionConfig};
pub use collision::{first_hit, outside_arena, within_radius};
pub use combo::Combo;
pub use reward::TaskRewards;
pub use spawner::{HpScaling, SpawnContext, Spawner, SpawnerConfig};
pub use state::{GameEvent, HudSnapshot, RunConfig, RunPhase, RunStart, RunState, RunSummary};
pub use stress::{Emotion, Stress, StressConfig};
pub use task::{DamageOutcome, Task, TaskCategory};
pub use tick::{TapOutcome, TickInput, tap, tick};
pub use wave::{Wave, WaveConfig};
