//! Damage resolution, the auto-attack timer and projectiles

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::awakening::{FOCUS_ATTACK_MULTIPLIER, FOCUS_INTERVAL_MULTIPLIER};
use super::task::Task;
use crate::consts::{BASE_DAMAGE, PROJECTILE_HIT_RADIUS, PROJECTILE_SPEED};
use crate::money::{Money, formulas};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackConfig {
    pub base_damage: f64,
    pub auto_interval_ms: f32,
    /// Extra multiplier on automatic hits (they already skip the tap bonus)
    pub auto_attack_ratio: f64,
    pub projectile_speed: f32,
    pub hit_radius: f32,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            base_damage: BASE_DAMAGE,
            auto_interval_ms: 1000.0,
            auto_attack_ratio: 1.0,
            projectile_speed: PROJECTILE_SPEED,
            hit_radius: PROJECTILE_HIT_RADIUS,
        }
    }
}

/// Everything outside the attack system that scales a hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageModifiers {
    pub attack_level: u32,
    pub combo_multiplier: f64,
    pub emotion_multiplier: f64,
    pub feature_multiplier: f64,
    pub focus: bool,
    pub debug_multiplier: f64,
}

impl Default for DamageModifiers {
    fn default() -> Self {
        Self {
            attack_level: 1,
            combo_multiplier: 1.0,
            emotion_multiplier: 1.0,
            feature_multiplier: 1.0,
            focus: false,
            debug_multiplier: 1.0,
        }
    }
}

/// Damage of one hit
pub fn hit_damage(config: &AttackConfig, modifiers: &DamageModifiers, tap: bool) -> Money {
    let mut damage = formulas::damage(
        Money::from_f64(config.base_damage),
        modifiers.attack_level,
        modifiers.combo_multiplier,
        tap,
    );
    damage = damage * modifiers.emotion_multiplier * modifiers.feature_multiplier;
    if modifiers.focus {
        damage = damage * FOCUS_ATTACK_MULTIPLIER;
    }
    if !tap {
        damage = damage * config.auto_attack_ratio;
    }
    damage * modifiers.debug_multiplier
}

/// Auto-attack interval after code quality, Focus and debug scaling
pub fn auto_attack_interval(
    config: &AttackConfig,
    code_quality_multiplier: f32,
    focus: bool,
    debug_scale: f32,
) -> f32 {
    let focus_scale = if focus { FOCUS_INTERVAL_MULTIPLIER } else { 1.0 };
    (config.auto_interval_ms * code_quality_multiplier * focus_scale * debug_scale).max(1.0)
}

/// Repeating auto-attack countdown
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AutoAttack {
    countdown_ms: f32,
}

impl AutoAttack {
    pub fn new(interval_ms: f32) -> Self {
        Self {
            countdown_ms: interval_ms,
        }
    }

    pub fn countdown_ms(&self) -> f32 {
        self.countdown_ms
    }

    /// Advance the timer. Returns true when an attack is due; the countdown
    /// restarts at `interval_ms` (which may have changed since last time).
    pub fn tick(&mut self, dt_ms: f32, interval_ms: f32) -> bool {
        self.countdown_ms -= dt_ms.max(0.0);
        if self.countdown_ms > 0.0 {
            return false;
        }
        self.countdown_ms = interval_ms;
        true
    }
}

/// How a projectile steers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Motion {
    Straight { dir: Vec2 },
    /// Re-aims at the task every frame, flies straight once it is gone
    Homing { target: u32, dir: Vec2 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub pos: Vec2,
    /// Position before the last `advance`; hits are tested along the segment
    pub prev_pos: Vec2,
    pub motion: Motion,
    pub damage: Money,
    /// Fired by a tap (vs. auto-attack)
    pub tap: bool,
}

impl Projectile {
    /// Straight shot from `from` toward `toward`. `None` if they coincide.
    pub fn straight(id: u32, from: Vec2, toward: Vec2, damage: Money, tap: bool) -> Option<Self> {
        let dir = (toward - from).try_normalize()?;
        Some(Self {
            id,
            pos: from,
            prev_pos: from,
            motion: Motion::Straight { dir },
            damage,
            tap,
        })
    }

    /// Homing shot at `task`
    pub fn homing(id: u32, from: Vec2, task: &Task, damage: Money, tap: bool) -> Self {
        let dir = (task.pos - from).try_normalize().unwrap_or(Vec2::X);
        Self {
            id,
            pos: from,
            prev_pos: from,
            motion: Motion::Homing {
                target: task.id,
                dir,
            },
            damage,
            tap,
        }
    }

    pub fn direction(&self) -> Vec2 {
        match self.motion {
            Motion::Straight { dir } | Motion::Homing { dir, .. } => dir,
        }
    }

    /// Move for `dt_ms` at `speed` units/second
    pub fn advance(&mut self, tasks: &[Task], speed: f32, dt_ms: f32) {
        if let Motion::Homing { target, dir } = &mut self.motion {
            match tasks.iter().find(|t| t.id == *target && !t.is_defeated()) {
                Some(task) => {
                    if let Some(aim) = (task.pos - self.pos).try_normalize() {
                        *dir = aim;
                    }
                }
                None => self.motion = Motion::Straight { dir: *dir },
            }
        }
        self.prev_pos = self.pos;
        self.pos += self.direction() * speed * dt_ms.max(0.0) / 1000.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::task::TaskCategory;

    #[test]
    fn test_tap_and_auto_damage() {
        let config = AttackConfig::default();
        let modifiers = DamageModifiers::default();
        assert_eq!(hit_damage(&config, &modifiers, true).to_f64(), 20.0);
        assert_eq!(hit_damage(&config, &modifiers, false).to_f64(), 10.0);

        let half = AttackConfig {
            auto_attack_ratio: 0.5,
            ..config
        };
        assert_eq!(hit_damage(&half, &modifiers, false).to_f64(), 5.0);
        assert_eq!(hit_damage(&half, &modifiers, true).to_f64(), 20.0);
    }

    #[test]
    fn test_all_modifiers_stack() {
        let config = AttackConfig::default();
        let modifiers = DamageModifiers {
            attack_level: 5,
            combo_multiplier: 2.0,
            emotion_multiplier: 0.5,
            feature_multiplier: 1.8,
            focus: true,
            debug_multiplier: 2.0,
        };
        // 10 × 5 × 2 × 2(tap) × 0.5 × 1.8 × 1.5 × 2
        let expected = 10.0 * 5.0 * 2.0 * 2.0 * 0.5 * 1.8 * 1.5 * 2.0;
        let got = hit_damage(&config, &modifiers, true).to_f64();
        assert!((got - expected).abs() < 1e-9, "{got}");
    }

    #[test]
    fn test_auto_attack_interval() {
        let config = AttackConfig::default();
        assert_eq!(auto_attack_interval(&config, 1.0, false, 1.0), 1000.0);
        assert_eq!(auto_attack_interval(&config, 0.5, true, 1.0), 250.0);
        assert_eq!(auto_attack_interval(&config, 1.0, false, 0.1), 100.0);
    }

    #[test]
    fn test_auto_attack_timer() {
        let mut timer = AutoAttack::new(1000.0);
        assert!(!timer.tick(999.0, 1000.0));
        assert!(timer.tick(1.0, 1000.0));
        assert_eq!(timer.countdown_ms(), 1000.0);
        assert!(!timer.tick(500.0, 500.0));
        assert!(timer.tick(500.0, 500.0));
        assert_eq!(timer.countdown_ms(), 500.0);
    }

    #[test]
    fn test_straight_projectile() {
        let mut p = Projectile::straight(1, Vec2::ZERO, Vec2::new(10.0, 0.0), Money::ONE, true)
            .unwrap();
        p.advance(&[], 600.0, 500.0);
        assert!((p.pos - Vec2::new(300.0, 0.0)).length() < 1e-3);
        assert_eq!(p.prev_pos, Vec2::ZERO);
        p.advance(&[], 600.0, 500.0);
        assert!((p.prev_pos - Vec2::new(300.0, 0.0)).length() < 1e-3);
        assert!(Projectile::straight(2, Vec2::ONE, Vec2::ONE, Money::ONE, true).is_none());
    }

    #[test]
    fn test_homing_tracks_and_falls_back() {
        let mut task = Task::new(7, TaskCategory::Bug, Vec2::new(100.0, 0.0), Money::ONE);
        let mut p = Projectile::homing(1, Vec2::ZERO, &task, Money::ONE, false);

        // Target moves; projectile re-aims
        task.pos = Vec2::new(0.0, 100.0);
        p.advance(std::slice::from_ref(&task), 600.0, 10.0);
        assert!((p.direction() - Vec2::Y).length() < 1e-5);

        // Target gone: keep flying the last direction
        p.advance(&[], 600.0, 10.0);
        assert_eq!(p.motion, Motion::Straight { dir: p.direction() });
        assert!((p.direction() - Vec2::Y).length() < 1e-5);
    }
}
