//! Tension gauge and the Awakening state machine
//!
//! Three mutually exclusive modes:
//! - Focus: combo reaches the threshold, timed, faster and stronger attacks
//! - Burst: stress maxes out, one-shot screen clear
//! - Creative: a streak of same-category defeats, timed, multi-target taps

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::task::TaskCategory;
use crate::clamp_finite;

/// Tension and awakening tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TensionConfig {
    pub max_tension: f32,
    /// Tension gained per defeat before bonuses
    pub base_gain: f32,
    /// Gain multiplier while stress is low
    pub low_stress_bonus: f32,
    /// Extra gain per combo point
    pub combo_bonus_rate: f32,
    pub focus_combo: u32,
    pub focus_duration_ms: f32,
    pub burst_stress_level: f32,
    pub creative_streak: usize,
    pub creative_duration_ms: f32,
}

impl Default for TensionConfig {
    fn default() -> Self {
        Self {
            max_tension: 100.0,
            base_gain: 5.0,
            low_stress_bonus: 1.5,
            combo_bonus_rate: 0.1,
            focus_combo: 10,
            focus_duration_ms: 10_000.0,
            burst_stress_level: 1.0,
            creative_streak: 5,
            creative_duration_ms: 15_000.0,
        }
    }
}

/// Focus attack multiplier
pub const FOCUS_ATTACK_MULTIPLIER: f64 = 1.5;
/// Focus auto-attack interval multiplier
pub const FOCUS_INTERVAL_MULTIPLIER: f32 = 0.5;
/// Tasks hit by one Creative tap
pub const CREATIVE_TARGETS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AwakeningKind {
    Focus,
    Burst,
    Creative,
}

impl AwakeningKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AwakeningKind::Focus => "focus",
            AwakeningKind::Burst => "burst",
            AwakeningKind::Creative => "creative",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum AwakeningState {
    #[default]
    Idle,
    Focus { remaining_ms: f32 },
    /// Lasts until the next `update`
    Burst,
    Creative { remaining_ms: f32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Awakening {
    config: TensionConfig,
    tension: f32,
    state: AwakeningState,
    /// Most recent defeat categories, newest last
    streak: VecDeque<TaskCategory>,
}

impl Default for Awakening {
    fn default() -> Self {
        Self::new(TensionConfig::default())
    }
}

impl Awakening {
    pub fn new(config: TensionConfig) -> Self {
        Self {
            config,
            tension: 0.0,
            state: AwakeningState::Idle,
            streak: VecDeque::with_capacity(config.creative_streak),
        }
    }

    pub fn config(&self) -> &TensionConfig {
        &self.config
    }

    pub fn tension(&self) -> f32 {
        self.tension
    }

    /// Gauge fill in `[0, 1]`
    pub fn level(&self) -> f32 {
        if self.config.max_tension <= 0.0 {
            return 0.0;
        }
        clamp_finite(self.tension / self.config.max_tension, 0.0, 1.0)
    }

    pub fn state(&self) -> AwakeningState {
        self.state
    }

    pub fn kind(&self) -> Option<AwakeningKind> {
        match self.state {
            AwakeningState::Idle => None,
            AwakeningState::Focus { .. } => Some(AwakeningKind::Focus),
            AwakeningState::Burst => Some(AwakeningKind::Burst),
            AwakeningState::Creative { .. } => Some(AwakeningKind::Creative),
        }
    }

    pub fn is_active(&self) -> bool {
        self.state != AwakeningState::Idle
    }

    pub fn is_focus(&self) -> bool {
        matches!(self.state, AwakeningState::Focus { .. })
    }

    pub fn is_creative(&self) -> bool {
        matches!(self.state, AwakeningState::Creative { .. })
    }

    pub fn remaining_ms(&self) -> f32 {
        match self.state {
            AwakeningState::Focus { remaining_ms } | AwakeningState::Creative { remaining_ms } => {
                remaining_ms.max(0.0)
            }
            _ => 0.0,
        }
    }

    pub fn remaining_secs(&self) -> f32 {
        self.remaining_ms() / 1000.0
    }

    /// Debug setter (clamped)
    pub fn set_tension(&mut self, value: f32) {
        self.tension = clamp_finite(value, 0.0, self.config.max_tension.max(0.0));
    }

    /// Feed the gauge after a defeat
    pub fn on_task_defeated(&mut self, stress_level: f32, combo: u32) {
        let mut gain = self.config.base_gain;
        if stress_level <= super::stress::CALM_LEVEL {
            gain *= self.config.low_stress_bonus;
        }
        gain *= 1.0 + combo as f32 * self.config.combo_bonus_rate;
        self.set_tension(self.tension + gain);
    }

    /// Record a defeat for the Creative streak. Defeats during an active
    /// mode are not counted, so a streak cannot be banked for later.
    pub fn record_defeat(&mut self, category: TaskCategory) {
        if self.is_active() {
            return;
        }
        let cap = self.config.creative_streak.max(1);
        if self.streak.len() == cap {
            self.streak.pop_front();
        }
        self.streak.push_back(category);
    }

    pub fn check_focus(&mut self, combo: u32) -> bool {
        if self.is_active() || combo < self.config.focus_combo {
            return false;
        }
        self.state = AwakeningState::Focus {
            remaining_ms: self.config.focus_duration_ms,
        };
        log::info!("Focus awakening ({combo} combo)");
        true
    }

    pub fn check_burst(&mut self, stress_level: f32) -> bool {
        if self.is_active() || stress_level < self.config.burst_stress_level {
            return false;
        }
        self.state = AwakeningState::Burst;
        log::info!("Burst awakening");
        true
    }

    /// Fires when the last `creative_streak` defeats share a category
    pub fn check_creative(&mut self) -> bool {
        if self.is_active() {
            return false;
        }
        let needed = self.config.creative_streak.max(1);
        let Some(first) = self.streak.front().copied() else {
            return false;
        };
        if self.streak.len() < needed || self.streak.iter().any(|c| *c != first) {
            return false;
        }
        self.streak.clear();
        self.state = AwakeningState::Creative {
            remaining_ms: self.config.creative_duration_ms,
        };
        log::info!("Creative awakening ({} streak)", first.as_str());
        true
    }

    /// Count down the active mode. Returns the kind that just ended.
    pub fn update(&mut self, dt_ms: f32) -> Option<AwakeningKind> {
        let ended = self.kind();
        match &mut self.state {
            AwakeningState::Idle => return None,
            AwakeningState::Burst => {}
            AwakeningState::Focus { remaining_ms } | AwakeningState::Creative { remaining_ms } => {
                *remaining_ms -= dt_ms.max(0.0);
                if *remaining_ms > 0.0 {
                    return None;
                }
            }
        }
        self.state = AwakeningState::Idle;
        ended
    }

    pub fn deactivate(&mut self) {
        self.state = AwakeningState::Idle;
    }

    pub fn reset(&mut self) {
        self.tension = 0.0;
        self.state = AwakeningState::Idle;
        self.streak.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_tension_gain() {
        let mut a = Awakening::default();
        // Calm, no combo: 5 × 1.5
        a.on_task_defeated(0.0, 0);
        assert!((a.tension() - 7.5).abs() < 1e-5);
        // Stressed, combo 10: 5 × 2
        a.on_task_defeated(0.5, 10);
        assert!((a.tension() - 17.5).abs() < 1e-5);
        for _ in 0..100 {
            a.on_task_defeated(0.0, 90);
        }
        assert_eq!(a.tension(), 100.0);
        assert_eq!(a.level(), 1.0);
    }

    #[test]
    fn test_focus_lifecycle() {
        let mut a = Awakening::default();
        assert!(!a.check_focus(9));
        assert!(a.check_focus(10));
        assert_eq!(a.kind(), Some(AwakeningKind::Focus));
        assert_eq!(a.remaining_secs(), 10.0);
        assert_eq!(a.update(4000.0), None);
        assert!((a.remaining_secs() - 6.0).abs() < 1e-4);
        assert_eq!(a.update(6000.0), Some(AwakeningKind::Focus));
        assert!(!a.is_active());
    }

    #[test]
    fn test_burst_ends_on_next_update() {
        let mut a = Awakening::default();
        assert!(!a.check_burst(0.99));
        assert!(a.check_burst(1.0));
        assert_eq!(a.kind(), Some(AwakeningKind::Burst));
        assert_eq!(a.update(0.0), Some(AwakeningKind::Burst));
        assert_eq!(a.kind(), None);
    }

    #[test]
    fn test_creative_streak() {
        let mut a = Awakening::default();
        for _ in 0..4 {
            a.record_defeat(TaskCategory::Bug);
            assert!(!a.check_creative());
        }
        a.record_defeat(TaskCategory::Bug);
        assert!(a.check_creative());
        assert_eq!(a.remaining_secs(), 15.0);
    }

    #[test]
    fn test_creative_broken_streak() {
        let mut a = Awakening::default();
        for category in [
            TaskCategory::Bug,
            TaskCategory::Bug,
            TaskCategory::Review,
            TaskCategory::Bug,
            TaskCategory::Bug,
        ] {
            a.record_defeat(category);
        }
        assert!(!a.check_creative());
        // Window slides until the review drops out
        a.record_defeat(TaskCategory::Bug);
        assert!(!a.check_creative());
        a.record_defeat(TaskCategory::Bug);
        assert!(!a.check_creative());
        a.record_defeat(TaskCategory::Bug);
        assert!(a.check_creative());
    }

    #[test]
    fn test_streak_paused_while_active() {
        let mut a = Awakening::default();
        a.record_defeat(TaskCategory::Urgent);
        assert!(a.check_focus(10));
        for _ in 0..5 {
            a.record_defeat(TaskCategory::Urgent);
            assert!(!a.check_creative());
        }
        a.deactivate();
        assert!(!a.check_creative());

        // The defeat from before Focus still counts toward the streak
        for _ in 0..4 {
            a.record_defeat(TaskCategory::Urgent);
        }
        assert!(a.check_creative());
    }

    #[test]
    fn test_mutual_exclusion() {
        let mut a = Awakening::default();
        assert!(a.check_focus(20));
        assert!(!a.check_burst(1.0));
        assert!(!a.check_focus(20));
        assert_eq!(a.kind(), Some(AwakeningKind::Focus));
    }

    #[test]
    fn test_reset() {
        let mut a = Awakening::default();
        a.set_tension(40.0);
        a.check_focus(15);
        a.reset();
        assert_eq!(a.tension(), 0.0);
        assert!(!a.is_active());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Defeat(f32, u32, u8),
        Focus(u32),
        Burst(f32),
        Creative,
        Update(f32),
        Set(f32),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (any::<f32>(), 0u32..200, 0u8..4).prop_map(|(s, c, k)| Op::Defeat(s, c, k)),
            (0u32..40).prop_map(Op::Focus),
            (-1.0f32..2.0).prop_map(Op::Burst),
            Just(Op::Creative),
            (0.0f32..20_000.0).prop_map(Op::Update),
            any::<f32>().prop_map(Op::Set),
        ]
    }

    proptest! {
        #[test]
        fn at_most_one_mode_and_tension_in_range(ops in prop::collection::vec(op(), 0..80)) {
            let mut a = Awakening::default();
            for op in ops {
                let was_active = a.is_active();
                let before = a.kind();
                let fired = match op {
                    Op::Defeat(stress, combo, k) => {
                        a.on_task_defeated(stress, combo);
                        a.record_defeat(TaskCategory::ALL[k as usize]);
                        false
                    }
                    Op::Focus(c) => a.check_focus(c),
                    Op::Burst(s) => a.check_burst(s),
                    Op::Creative => a.check_creative(),
                    Op::Update(dt) => {
                        a.update(dt);
                        false
                    }
                    Op::Set(v) => {
                        a.set_tension(v);
                        false
                    }
                };
                if was_active && fired {
                    prop_assert!(false, "trigger fired while {:?} active", before);
                }
                prop_assert!(a.tension() >= 0.0 && a.tension() <= 100.0);
            }
        }
    }
}
