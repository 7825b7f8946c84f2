//! Task categories and the Task entity
//!
//! Tasks are the enemies: they walk toward the character and are defeated by
//! projectiles. Per-category tuning lives in one closed lookup table.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::money::Money;

/// Task category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskCategory {
    Bug,
    Feature,
    Review,
    Urgent,
}

/// Per-category tuning record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryProfile {
    /// Multiplier on the wave's base HP
    pub hp_multiplier: f64,
    /// Walking speed (units/second)
    pub speed: f32,
    /// Multiplier on proximity stress
    pub stress_weight: f32,
    /// Relative spawn probability (weights sum to 1)
    pub spawn_weight: f32,
    pub label: &'static str,
}

impl TaskCategory {
    pub const ALL: [TaskCategory; 4] = [
        TaskCategory::Bug,
        TaskCategory::Feature,
        TaskCategory::Review,
        TaskCategory::Urgent,
    ];

    pub const fn profile(self) -> CategoryProfile {
        match self {
            TaskCategory::Bug => CategoryProfile {
                hp_multiplier: 0.8,
                speed: 30.0,
                stress_weight: 0.8,
                spawn_weight: 0.4,
                label: "Bug",
            },
            TaskCategory::Feature => CategoryProfile {
                hp_multiplier: 1.2,
                speed: 20.0,
                stress_weight: 1.2,
                spawn_weight: 0.3,
                label: "Feature",
            },
            TaskCategory::Review => CategoryProfile {
                hp_multiplier: 1.5,
                speed: 20.0,
                stress_weight: 1.0,
                spawn_weight: 0.2,
                label: "Review",
            },
            TaskCategory::Urgent => CategoryProfile {
                hp_multiplier: 2.0,
                speed: 50.0,
                stress_weight: 1.5,
                spawn_weight: 0.1,
                label: "Urgent",
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskCategory::Bug => "bug",
            TaskCategory::Feature => "feature",
            TaskCategory::Review => "review",
            TaskCategory::Urgent => "urgent",
        }
    }

    /// Weighted pick from a uniform roll in `[0, 1)`
    pub fn from_roll(roll: f32) -> Self {
        let mut acc = 0.0;
        for category in Self::ALL {
            acc += category.profile().spawn_weight;
            if roll < acc {
                return category;
            }
        }
        // Rolls at or past the summed weight land in the last bucket
        TaskCategory::Urgent
    }
}

/// Result of applying damage to a task
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageOutcome {
    /// HP actually removed (never more than the HP before the hit)
    pub dealt: Money,
    pub defeated: bool,
}

/// An enemy walking toward the character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: u32,
    pub category: TaskCategory,
    pub pos: Vec2,
    pub speed: f32,
    max_hp: Money,
    hp: Money,
}

impl Task {
    pub fn new(id: u32, category: TaskCategory, pos: Vec2, max_hp: Money) -> Self {
        let max_hp = max_hp.max(Money::ZERO);
        Self {
            id,
            category,
            pos,
            speed: category.profile().speed,
            max_hp,
            hp: max_hp,
        }
    }

    pub fn hp(&self) -> Money {
        self.hp
    }

    pub fn max_hp(&self) -> Money {
        self.max_hp
    }

    /// Remaining HP fraction in `[0, 1]`
    pub fn hp_ratio(&self) -> f32 {
        if self.max_hp.is_zero() {
            return 0.0;
        }
        ((self.hp / self.max_hp).to_f64() as f32).clamp(0.0, 1.0)
    }

    pub fn is_defeated(&self) -> bool {
        self.hp.is_zero_or_less()
    }

    pub fn distance_to(&self, target: Vec2) -> f32 {
        self.pos.distance(target)
    }

    /// Strictly closer than `threshold`
    pub fn is_touching(&self, target: Vec2, threshold: f32) -> bool {
        self.distance_to(target) < threshold
    }

    /// Walk straight toward `target` for `dt_ms`, stopping on it
    pub fn advance(&mut self, target: Vec2, dt_ms: f32) {
        let step = self.speed * dt_ms.max(0.0) / 1000.0;
        let to_target = target - self.pos;
        let distance = to_target.length();
        if distance <= step || distance == 0.0 {
            self.pos = target;
        } else {
            self.pos += to_target / distance * step;
        }
    }

    /// Apply damage. HP floors at zero and never increases.
    pub fn take_damage(&mut self, damage: Money) -> DamageOutcome {
        if damage.is_zero_or_less() || self.is_defeated() {
            return DamageOutcome {
                dealt: Money::ZERO,
                defeated: self.is_defeated(),
            };
        }

        let before = self.hp;
        if damage >= before {
            self.hp = Money::ZERO;
            return DamageOutcome {
                dealt: before,
                defeated: true,
            };
        }

        let after = before - damage;
        if after.is_zero_or_less() {
            // Rounding swallowed the remainder
            self.hp = Money::ZERO;
            return DamageOutcome {
                dealt: before,
                defeated: true,
            };
        }
        self.hp = after.min(before);
        DamageOutcome {
            dealt: damage,
            defeated: false,
        }
    }
}
