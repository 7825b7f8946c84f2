//! Wave progression and per-wave difficulty

use serde::{Deserialize, Serialize};

use crate::money::Money;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveConfig {
    /// Defeats needed to clear a wave
    pub tasks_per_wave: u32,
    /// Difficulty growth per cleared wave
    pub clear_bonus: f64,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            tasks_per_wave: 10,
            clear_bonus: 1.2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wave {
    config: WaveConfig,
    wave: u32,
    defeated_in_wave: u32,
}

impl Default for Wave {
    fn default() -> Self {
        Self::new(WaveConfig::default())
    }
}

impl Wave {
    pub fn new(config: WaveConfig) -> Self {
        Self {
            config: WaveConfig {
                tasks_per_wave: config.tasks_per_wave.max(1),
                ..config
            },
            wave: 1,
            defeated_in_wave: 0,
        }
    }

    pub fn current(&self) -> u32 {
        self.wave
    }

    pub fn defeated_in_wave(&self) -> u32 {
        self.defeated_in_wave
    }

    /// Count a defeat. Returns true when this defeat cleared the wave.
    pub fn on_task_defeated(&mut self) -> bool {
        self.defeated_in_wave += 1;
        if self.defeated_in_wave >= self.config.tasks_per_wave {
            self.wave = self.wave.saturating_add(1);
            self.defeated_in_wave = 0;
            log::info!("Wave {} reached", self.wave);
            return true;
        }
        false
    }

    pub fn remaining(&self) -> u32 {
        self.config.tasks_per_wave.saturating_sub(self.defeated_in_wave)
    }

    /// Fraction of the current wave cleared, in `[0, 1)`
    pub fn progress(&self) -> f32 {
        self.defeated_in_wave as f32 / self.config.tasks_per_wave as f32
    }

    /// `clear_bonus^(wave−1)`, exact past `f64` range (1.2^3890 already is)
    pub fn difficulty_multiplier(&self) -> Money {
        let steps = i32::try_from(self.wave - 1).unwrap_or(i32::MAX);
        Money::from_f64(self.config.clear_bonus).powi(steps)
    }

    pub fn hp_multiplier(&self) -> Money {
        self.difficulty_multiplier()
    }

    /// Spawns speed up 5% per wave, down to half the base interval
    pub fn spawn_interval_multiplier(&self) -> f32 {
        (1.0 - 0.05 * (self.wave - 1) as f32).max(0.5)
    }

    /// Jump to a wave (at least 1); the kill counter restarts
    pub fn set_wave(&mut self, wave: u32) {
        self.wave = wave.max(1);
        self.defeated_in_wave = 0;
    }

    pub fn reset(&mut self) {
        self.set_wave(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ten_defeats_advance() {
        let mut w = Wave::default();
        for i in 0..9 {
            assert!(!w.on_task_defeated(), "defeat {i}");
        }
        assert_eq!(w.remaining(), 1);
        assert!((w.progress() - 0.9).abs() < 1e-6);
        assert!(w.on_task_defeated());
        assert_eq!(w.current(), 2);
        assert_eq!(w.defeated_in_wave(), 0);
        assert_eq!(w.remaining(), 10);
    }

    #[test]
    fn test_multipliers() {
        let mut w = Wave::default();
        assert_eq!(w.difficulty_multiplier(), Money::ONE);
        assert_eq!(w.spawn_interval_multiplier(), 1.0);
        w.set_wave(3);
        assert_eq!(w.hp_multiplier(), Money::from_f64(1.44));
        assert!((w.spawn_interval_multiplier() - 0.9).abs() < 1e-6);
        w.set_wave(50);
        assert_eq!(w.spawn_interval_multiplier(), 0.5);
    }

    #[test]
    fn test_multiplier_past_f64_range() {
        let mut w = Wave::default();
        w.set_wave(4000);
        let multiplier = w.hp_multiplier();
        assert!(multiplier.to_f64().is_infinite());
        assert_eq!(multiplier.exponent(), 316);
        assert!(w.difficulty_multiplier() > Money::from_f64(f64::MAX));
    }

    #[test]
    fn test_set_wave_floor() {
        let mut w = Wave::default();
        w.on_task_defeated();
        w.set_wave(0);
        assert_eq!(w.current(), 1);
        assert_eq!(w.defeated_in_wave(), 0);
    }
}
