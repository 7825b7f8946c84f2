//! Per-category reward tracks
//!
//! Each defeated category feeds its own track:
//! - bug: Debug Points (a plain counter)
//! - feature: Feature Understanding, a timed attack buff
//! - review: Code Quality, faster auto-attacks (max level 5)
//! - urgent: Emergency Response, stress resistance (max level 3)

use serde::{Deserialize, Serialize};

use super::task::TaskCategory;

pub const FEATURE_BUFF_MS: f32 = 10_000.0;
/// Consecutive feature defeats for the strong buff
pub const FEATURE_STREAK: u32 = 3;
pub const MAX_CODE_QUALITY: u32 = 5;
pub const MAX_EMERGENCY_RESPONSE: u32 = 3;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskRewards {
    debug_points: u64,
    feature_level: u32,
    feature_remaining_ms: f32,
    feature_streak: u32,
    code_quality: u32,
    emergency_response: u32,
}

impl TaskRewards {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_task_defeated(&mut self, category: TaskCategory) {
        match category {
            TaskCategory::Bug => {
                self.debug_points += 1;
                self.feature_streak = 0;
            }
            TaskCategory::Feature => {
                self.feature_streak += 1;
                if self.feature_streak >= FEATURE_STREAK {
                    self.feature_level = 2;
                    self.feature_streak = 0;
                } else {
                    self.feature_level = 1;
                }
                self.feature_remaining_ms = FEATURE_BUFF_MS;
            }
            TaskCategory::Review => {
                self.code_quality = (self.code_quality + 1).min(MAX_CODE_QUALITY);
                self.feature_streak = 0;
            }
            TaskCategory::Urgent => {
                self.emergency_response = (self.emergency_response + 1).min(MAX_EMERGENCY_RESPONSE);
                self.feature_streak = 0;
            }
        }
    }

    /// Expire the feature buff
    pub fn update(&mut self, dt_ms: f32) {
        if self.feature_remaining_ms <= 0.0 {
            return;
        }
        self.feature_remaining_ms -= dt_ms.max(0.0);
        if self.feature_remaining_ms <= 0.0 {
            self.feature_remaining_ms = 0.0;
            self.feature_level = 0;
        }
    }

    pub fn debug_points(&self) -> u64 {
        self.debug_points
    }

    pub fn feature_level(&self) -> u32 {
        self.feature_level
    }

    pub fn feature_remaining_ms(&self) -> f32 {
        self.feature_remaining_ms
    }

    /// 1.0, 1.2 (level 1) or 1.8 (level 2)
    pub fn feature_attack_multiplier(&self) -> f64 {
        match self.feature_level {
            0 => 1.0,
            1 => 1.2,
            _ => 1.8,
        }
    }

    pub fn code_quality_level(&self) -> u32 {
        self.code_quality
    }

    /// Auto-attack interval multiplier, `1 − 0.1·level`
    pub fn code_quality_multiplier(&self) -> f32 {
        1.0 - 0.1 * self.code_quality as f32
    }

    pub fn emergency_response_level(&self) -> u32 {
        self.emergency_response
    }

    /// Stress increase multiplier, `1 − 0.1·level`
    pub fn stress_resistance(&self) -> f32 {
        1.0 - 0.1 * self.emergency_response as f32
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
