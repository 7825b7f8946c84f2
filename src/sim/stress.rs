//! Stress meter and the character's emotional state
//!
//! Nearby tasks raise stress, defeats lower it. Emotion is derived from the
//! stress level and combo and scales the character's attack.

use serde::{Deserialize, Serialize};

use super::task::TaskCategory;
use crate::clamp_finite;

/// Stress tuning.
///
/// Proximity stress is not continuous: the run applies it once per
/// [`STRESS_PULSE_MS`](crate::consts::STRESS_PULSE_MS) (250 ms) pulse, for
/// every task within [`STRESS_RADIUS`](crate::consts::STRESS_RADIUS) of the
/// character. `increase_base` is therefore a per-pulse amount.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StressConfig {
    pub max_stress: f32,
    /// Base amount removed per defeat (scaled by combo)
    pub decay_rate: f32,
    /// Base amount added per 250 ms proximity pulse, per nearby task
    pub increase_base: f32,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            max_stress: 100.0,
            decay_rate: 10.0,
            increase_base: 1.0,
        }
    }
}

/// Stress level at or below which the character is calm
pub const CALM_LEVEL: f32 = 0.3;
/// Stress level at or below which the character is merely anxious
pub const ANXIOUS_LEVEL: f32 = 0.7;
/// Combo needed (while calm) to be Focused
pub const FOCUSED_COMBO: u32 = 5;

/// Derived emotional state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Emotion {
    Normal,
    Anxious,
    Panic,
    Focused,
}

impl Emotion {
    /// Attack multiplier for this state
    pub fn attack_multiplier(&self) -> f64 {
        match self {
            Emotion::Normal => 1.0,
            Emotion::Anxious => 0.8,
            Emotion::Panic => 0.5,
            Emotion::Focused => 1.2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Normal => "normal",
            Emotion::Anxious => "anxious",
            Emotion::Panic => "panic",
            Emotion::Focused => "focused",
        }
    }
}

/// Derive emotion from stress level in `[0, 1]` and combo
pub fn emotion_for(level: f32, combo: u32) -> Emotion {
    if level <= CALM_LEVEL {
        if combo >= FOCUSED_COMBO {
            Emotion::Focused
        } else {
            Emotion::Normal
        }
    } else if level <= ANXIOUS_LEVEL {
        Emotion::Anxious
    } else {
        Emotion::Panic
    }
}

/// HUD line for the character. Stress outranks combo.
pub fn dialogue_for(level: f32, combo: u32) -> &'static str {
    if level >= 0.8 {
        "Too much at once... I can't keep up!"
    } else if level >= 0.5 {
        "Things are piling up. Stay calm."
    } else if combo >= 20 {
        "I'm in the zone! Nothing can stop me!"
    } else if combo >= 10 {
        "Good rhythm. Keep it going!"
    } else {
        "One task at a time."
    }
}

/// Stress meter in `[0, max_stress]`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stress {
    config: StressConfig,
    value: f32,
}

impl Default for Stress {
    fn default() -> Self {
        Self::new(StressConfig::default())
    }
}

impl Stress {
    pub fn new(config: StressConfig) -> Self {
        Self { config, value: 0.0 }
    }

    pub fn config(&self) -> &StressConfig {
        &self.config
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    /// Fraction of max in `[0, 1]`
    pub fn level(&self) -> f32 {
        if self.config.max_stress <= 0.0 {
            return 0.0;
        }
        clamp_finite(self.value / self.config.max_stress, 0.0, 1.0)
    }

    /// Raise stress for one task at `distance`. `resistance` scales the
    /// increase (1.0 = none).
    pub fn increase(&mut self, distance: f32, category: TaskCategory, resistance: f32) {
        let proximity = (100.0 / (distance.max(0.0) + 100.0)).max(0.1);
        let amount = self.config.increase_base
            * proximity
            * category.profile().stress_weight
            * resistance.max(0.0);
        self.set(self.value + clamp_finite(amount, 0.0, self.config.max_stress));
    }

    /// Lower stress after a defeat; higher combo relieves more
    pub fn decrease(&mut self, combo: u32) {
        let amount = self.config.decay_rate * (1.0 + 0.1 * combo as f32);
        self.set(self.value - amount);
    }

    pub fn reset(&mut self) {
        self.value = 0.0;
    }

    /// Debug setter (clamped)
    pub fn set(&mut self, value: f32) {
        self.value = clamp_finite(value, 0.0, self.config.max_stress.max(0.0));
    }

    pub fn emotion(&self, combo: u32) -> Emotion {
        emotion_for(self.level(), combo)
    }
}
