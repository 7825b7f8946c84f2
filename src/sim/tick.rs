//! Per-frame simulation step
//!
//! Frame order:
//! 1. spawn timer and task movement
//! 2. proximity stress (on a fixed pulse)
//! 3. Burst check
//! 4. auto-attack
//! 5. projectile movement
//! 6. collision resolution along each projectile's path, defeat fan-out,
//!    then off-arena cleanup
//! 7. reward and awakening timers
//! 8. game-over check
//!
//! Collisions resolve before the game-over check, so a kill in the same frame
//! a task reaches the character saves the run.

use glam::Vec2;

use super::attack::Projectile;
use super::awakening::{AwakeningKind, CREATIVE_TARGETS};
use super::collision::{first_hit, outside_arena};
use super::state::{GameEvent, RunPhase, RunState};
use crate::consts::*;
use crate::money::Money;

/// Input for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pointer tap this frame (world coordinates)
    pub tap: Option<Vec2>,
    /// New character position (None keeps the current one)
    pub character: Option<Vec2>,
}

/// What a tap did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    /// Number of projectiles fired
    Fired(usize),
    /// Nothing to aim at (tap on the character itself)
    NoTarget,
    /// Run is over
    Ignored,
}

/// Advance the run by `dt_ms` milliseconds
pub fn tick(state: &mut RunState, input: &TickInput, dt_ms: f32) {
    if state.phase == RunPhase::GameOver {
        return;
    }
    let dt = if dt_ms.is_finite() { dt_ms.max(0.0) } else { 0.0 };

    if let Some(pos) = input.character {
        state.character = pos;
    }
    if let Some(point) = input.tap {
        tap(state, point);
    }
    state.elapsed_ms += dt as f64;

    // Spawning and movement
    let context = state.spawn_context();
    state.spawner.set_context(context);
    if let Some(id) = state.spawner.tick(dt) {
        state.push_spawned(id);
    }
    state.spawner.advance(state.character, dt);

    apply_proximity_stress(state, dt);
    check_burst(state);
    auto_attack(state, dt);
    move_projectiles(state, dt);
    resolve_collisions(state);

    // Timers
    state.rewards.update(dt);
    if let Some(kind) = state.awakening.update(dt) {
        state.push_event(GameEvent::AwakeningEnded { kind });
    }

    if let Some(id) = state.spawner.first_touching(state.character, TOUCH_DISTANCE) {
        end_run(state, id);
    }
}

/// Fire at a tapped point. In Creative mode, up to five homing shots go to
/// the tasks nearest the tap.
pub fn tap(state: &mut RunState, point: Vec2) -> TapOutcome {
    if state.phase != RunPhase::Running {
        return TapOutcome::Ignored;
    }
    let damage = state.hit_damage(true);

    if state.awakening.is_creative() {
        let targets: Vec<_> = state
            .spawner
            .nearest_ids(point, CREATIVE_TARGETS)
            .into_iter()
            .filter_map(|id| state.spawner.get(id).cloned())
            .collect();
        if !targets.is_empty() {
            for task in &targets {
                let id = state.next_projectile_id();
                let projectile = Projectile::homing(id, state.character, task, damage, true);
                fire(state, projectile);
            }
            return TapOutcome::Fired(targets.len());
        }
    }

    let id = state.next_projectile_id();
    match Projectile::straight(id, state.character, point, damage, true) {
        Some(projectile) => {
            fire(state, projectile);
            TapOutcome::Fired(1)
        }
        None => TapOutcome::NoTarget,
    }
}

fn fire(state: &mut RunState, projectile: Projectile) {
    state.push_event(GameEvent::ProjectileFired {
        id: projectile.id,
        pos: projectile.pos,
        dir: projectile.direction(),
        tap: projectile.tap,
    });
    state.projectiles.push(projectile);
}

/// Tasks near the character raise stress once per pulse
fn apply_proximity_stress(state: &mut RunState, dt: f32) {
    state.stress_pulse_ms -= dt;
    if state.stress_pulse_ms > 0.0 {
        return;
    }
    state.stress_pulse_ms = STRESS_PULSE_MS;

    let resistance = state.rewards.stress_resistance();
    let character = state.character;
    for task in state.spawner.tasks() {
        let distance = task.distance_to(character);
        if distance <= STRESS_RADIUS {
            state.stress.increase(distance, task.category, resistance);
        }
    }
}

/// Maxed stress triggers Burst: every task is cleared as a defeat
fn check_burst(state: &mut RunState) {
    if state.awakening.check_burst(state.stress.level()) {
        state.push_event(GameEvent::AwakeningStarted {
            kind: AwakeningKind::Burst,
        });
        burst_clear(state);
    }
}

fn burst_clear(state: &mut RunState) {
    let ids: Vec<u32> = state.spawner.tasks().iter().map(|t| t.id).collect();
    log::info!("Burst clears {} tasks", ids.len());
    for id in ids {
        let Some(task) = state.spawner.get_mut(id) else {
            continue;
        };
        let remaining = task.hp();
        let outcome = task.take_damage(remaining);
        state.total_damage = state.total_damage + outcome.dealt;
        defeat_task(state, id);
    }
    state.stress.reset();
}

fn auto_attack(state: &mut RunState, dt: f32) {
    let interval = state.auto_interval();
    if !state.auto_attack.tick(dt, interval) {
        return;
    }
    let Some(target) = state.spawner.nearest_to(state.character).cloned() else {
        return;
    };
    let damage = state.hit_damage(false);
    let id = state.next_projectile_id();
    let projectile = Projectile::homing(id, state.character, &target, damage, false);
    fire(state, projectile);
}

fn move_projectiles(state: &mut RunState, dt: f32) {
    let speed = state.config.attack.projectile_speed;
    let tasks = state.spawner.tasks();
    for projectile in &mut state.projectiles {
        projectile.advance(tasks, speed, dt);
    }
}

/// Projectiles in firing order; each hits at most one task. Misses that
/// left the arena are dropped afterwards, so a hit on the way out counts.
fn resolve_collisions(state: &mut RunState) {
    let radius = state.config.attack.hit_radius;
    let mut i = 0;
    while i < state.projectiles.len() {
        let (from, to) = (state.projectiles[i].prev_pos, state.projectiles[i].pos);
        let Some(task_id) = first_hit(from, to, state.spawner.tasks(), radius) else {
            i += 1;
            continue;
        };
        let projectile = state.projectiles.remove(i);
        apply_hit(state, task_id, projectile.damage, projectile.tap);
        if state.phase != RunPhase::Running {
            return;
        }
    }

    let (width, height) = (state.config.arena_width, state.config.arena_height);
    state
        .projectiles
        .retain(|p| !outside_arena(p.pos, width, height, PROJECTILE_MARGIN));
}

/// Damage a task and run the defeat fan-out if it dies
pub fn apply_hit(state: &mut RunState, task_id: u32, damage: Money, tap: bool) {
    let Some(task) = state.spawner.get_mut(task_id) else {
        return;
    };
    let outcome = task.take_damage(damage);
    state.total_damage = state.total_damage + outcome.dealt;
    state.push_event(GameEvent::Damage {
        task_id,
        amount: outcome.dealt,
        tap,
    });
    if outcome.defeated {
        defeat_task(state, task_id);
    }
}

/// Defeat fan-out: combo, stress, rewards, tension, wave, awakening checks,
/// then removal (with backfill)
fn defeat_task(state: &mut RunState, id: u32) {
    let Some(category) = state.spawner.get(id).map(|t| t.category) else {
        return;
    };

    state.combo.add(1);
    let combo = state.combo.count();
    state.stress.decrease(combo);
    state.rewards.on_task_defeated(category);
    state.awakening.on_task_defeated(state.stress.level(), combo);
    state.tasks_defeated += 1;
    state.push_event(GameEvent::TaskDefeated { id, category });
    log::debug!("Defeated {} #{} (combo {})", category.as_str(), id, combo);

    if state.wave.on_task_defeated() {
        let wave = state.wave.current();
        state.push_event(GameEvent::WaveAdvanced { wave });
    }

    // At most one awakening starts per defeat
    state.awakening.record_defeat(category);
    let started = if state.awakening.check_focus(combo) {
        Some(AwakeningKind::Focus)
    } else if state.awakening.check_burst(state.stress.level()) {
        Some(AwakeningKind::Burst)
    } else if state.awakening.check_creative() {
        Some(AwakeningKind::Creative)
    } else {
        None
    };
    if let Some(kind) = started {
        state.push_event(GameEvent::AwakeningStarted { kind });
    }

    let context = state.spawn_context();
    state.spawner.set_context(context);
    if let Some(removed) = state.spawner.remove(id) {
        if let Some(backfill) = removed.backfill {
            state.push_spawned(backfill);
        }
    }

    if started == Some(AwakeningKind::Burst) {
        burst_clear(state);
    }
}

/// Finish the run: clear the field and record the summary
fn end_run(state: &mut RunState, culprit: u32) {
    state.phase = RunPhase::GameOver;
    state.spawner.stop();
    state.spawner.clear();
    state.projectiles.clear();
    if let Some(kind) = state.awakening.kind() {
        state.awakening.deactivate();
        state.push_event(GameEvent::AwakeningEnded { kind });
    }

    let summary = state.build_summary();
    log::info!(
        "Game over at wave {} (task #{} reached the character): {} stones, {} defeated",
        summary.wave,
        culprit,
        summary.rebirth_stones,
        summary.tasks_defeated
    );
    state.summary = Some(summary.clone());
    state.push_event(GameEvent::GameOver { summary });
}
