//! Consecutive-defeat counter and its damage multiplier

use serde::{Deserialize, Serialize};

use crate::money::formulas::combo_multiplier;

pub const DEFAULT_MAX_COMBO: u32 = 90;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Combo {
    count: u32,
    max: u32,
}

impl Default for Combo {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_COMBO)
    }
}

impl Combo {
    pub fn new(max: u32) -> Self {
        Self {
            count: 0,
            max: max.max(1),
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    /// Add (or subtract) and clamp into `[0, max]`
    pub fn add(&mut self, n: i64) {
        let next = (self.count as i64).saturating_add(n);
        self.count = next.clamp(0, self.max as i64) as u32;
    }

    pub fn reset(&mut self) {
        self.count = 0;
    }

    pub fn multiplier(&self) -> f64 {
        combo_multiplier(self.count)
    }

    /// Fill ratio in `[0, 1]`
    pub fn ratio(&self) -> f32 {
        self.count as f32 / self.max as f32
    }

    pub fn is_max(&self) -> bool {
        self.count >= self.max
    }

    /// Change the cap (at least 1); the current count is truncated to fit
    pub fn set_max(&mut self, max: u32) {
        self.max = max.max(1);
        self.count = self.count.min(self.max);
    }
}
