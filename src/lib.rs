//! Infinite Rebirth Breaker - idle task-slaying combat with prestige progression
//!
//! Core modules:
//! - `money`: Arbitrary-range decimal, balance formulas, short-scale formatting
//! - `sim`: Deterministic run simulation (tasks, stress, combo, awakenings, waves)
//! - `persistence`: Save record, field repair and throttled save store
//! - `progress`: Rebirth Stones and permanent upgrades
//! - `platform`: Browser/native clock and storage
//! - `game`: Host-facing facade tying a run to the save store

pub mod game;
pub mod money;
pub mod persistence;
pub mod platform;
pub mod progress;
pub mod settings;
pub mod sim;

pub use game::Game;
pub use money::{Money, format_short};
pub use settings::DebugOverrides;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Arena size in world units (the browser canvas)
    pub const ARENA_WIDTH: f32 = 800.0;
    pub const ARENA_HEIGHT: f32 = 600.0;

    /// Default character position (arena center)
    pub const CHARACTER_X: f32 = 400.0;
    pub const CHARACTER_Y: f32 = 300.0;

    /// A task closer than this to the character ends the run
    pub const TOUCH_DISTANCE: f32 = 50.0;
    /// Tasks within this distance raise stress
    pub const STRESS_RADIUS: f32 = 200.0;
    /// Stress from proximity is applied on this pulse (ms)
    pub const STRESS_PULSE_MS: f32 = 250.0;

    /// Projectile defaults
    pub const PROJECTILE_SPEED: f32 = 600.0;
    pub const PROJECTILE_HIT_RADIUS: f32 = 40.0;
    /// Projectiles further than this outside the arena are dropped
    pub const PROJECTILE_MARGIN: f32 = 50.0;

    /// Base task HP before wave and category scaling
    pub const TASK_BASE_HP: f64 = 30.0;
    /// Base damage of one hit before multipliers
    pub const BASE_DAMAGE: f64 = 10.0;

    /// Quick-skip starts this many waves below the best wave
    pub const QUICK_SKIP_OFFSET: u32 = 5;
    /// Minimum time between non-forced save writes (ms)
    pub const SAVE_THROTTLE_MS: f64 = 5000.0;
}

/// Default character position as a vector
#[inline]
pub fn character_home() -> Vec2 {
    Vec2::new(consts::CHARACTER_X, consts::CHARACTER_Y)
}

/// Clamp into `[lo, hi]`, mapping NaN to `lo`
#[inline]
pub fn clamp_finite(value: f32, lo: f32, hi: f32) -> f32 {
    if value.is_nan() {
        return lo;
    }
    value.clamp(lo, hi)
}

/// Convert polar (r, theta) around `center` to cartesian
#[inline]
pub fn polar_around(center: Vec2, r: f32, theta: f32) -> Vec2 {
    center + Vec2::new(r * theta.cos(), r * theta.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_finite() {
        assert_eq!(clamp_finite(f32::NAN, 0.0, 100.0), 0.0);
        assert_eq!(clamp_finite(f32::INFINITY, 0.0, 100.0), 100.0);
        assert_eq!(clamp_finite(f32::NEG_INFINITY, 0.0, 100.0), 0.0);
        assert_eq!(clamp_finite(42.0, 0.0, 100.0), 42.0);
    }

    #[test]
    fn test_polar_around() {
        let p = polar_around(character_home(), 300.0, 0.0);
        assert!((p - Vec2::new(700.0, 300.0)).length() < 1e-3);
    }
}
