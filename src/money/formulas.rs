//! Game formulas over [`Money`]
//!
//! Every balance curve that touches currency or HP is defined here once.

use super::Money;

/// Exponent of the stage-based HP curve
pub const ENEMY_HP_EXPONENT: f64 = 1.2;
/// Exponent of the Rebirth Stone payout curve
pub const REBIRTH_STONE_EXPONENT: f64 = 1.5;
/// Combo multiplier gained per combo step
pub const COMBO_STEP: f64 = 0.1;
/// Upper bound of the combo multiplier
pub const MAX_COMBO_MULTIPLIER: f64 = 10.0;
/// Tap attacks hit twice as hard as automatic ones
pub const TAP_MULTIPLIER: f64 = 2.0;

/// `base × stage^1.2` (stage is treated as at least 1)
pub fn enemy_max_hp(base_hp: Money, stage: u32) -> Money {
    base_hp * Money::from(stage.max(1)).pow(ENEMY_HP_EXPONENT)
}

/// `base × max(1, attack_level) × combo × (tap ? 2 : 1)`
pub fn damage(base: Money, attack_level: u32, combo_multiplier: f64, tap: bool) -> Money {
    let tap_factor = if tap { TAP_MULTIPLIER } else { 1.0 };
    base * Money::from(attack_level.max(1)) * combo_multiplier * tap_factor
}

/// Stones paid out for reaching `stage`: `floor(stage^1.5)`
pub fn rebirth_stones(stage: u32) -> Money {
    Money::from(stage).pow(REBIRTH_STONE_EXPONENT).floor()
}

/// `min(1 + 0.1·count, 10)`
pub fn combo_multiplier(count: u32) -> f64 {
    (1.0 + COMBO_STEP * count as f64).min(MAX_COMBO_MULTIPLIER)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, tolerance: f64) -> bool {
        (a - b).abs() <= tolerance
    }

    #[test]
    fn test_enemy_hp_curve() {
        let base = Money::from(100u64);
        assert!(close(enemy_max_hp(base, 1).to_f64(), 100.0, 1e-9));
        assert!(close(enemy_max_hp(base, 2).to_f64(), 229.7, 0.1));
        assert!(close(enemy_max_hp(base, 10).to_f64(), 1585.0, 1.0));
    }

    #[test]
    fn test_enemy_hp_monotonic() {
        let base = Money::from(30u64);
        let mut previous = Money::ZERO;
        for stage in 1..200 {
            let hp = enemy_max_hp(base, stage);
            assert!(hp > previous, "stage {stage}");
            previous = hp;
        }
    }

    #[test]
    fn test_damage() {
        let base = Money::from(10u64);
        assert_eq!(damage(base, 1, 1.0, false).to_f64(), 10.0);
        assert_eq!(damage(base, 5, 1.0, false).to_f64(), 50.0);
        assert_eq!(damage(base, 1, 1.0, true).to_f64(), 20.0);
        assert_eq!(damage(base, 5, 1.0, true).to_f64(), 100.0);
        // Level 0 still hits like level 1
        assert_eq!(damage(base, 0, 1.0, false).to_f64(), 10.0);
        assert_eq!(damage(base, 1, 2.5, false).to_f64(), 25.0);
    }

    #[test]
    fn test_rebirth_stones() {
        assert_eq!(rebirth_stones(1).to_f64(), 1.0);
        assert_eq!(rebirth_stones(10).to_f64(), 31.0);
        assert_eq!(rebirth_stones(100).to_f64(), 1000.0);
        assert!(rebirth_stones(0).is_zero());
    }

    #[test]
    fn test_combo_multiplier() {
        assert_eq!(combo_multiplier(0), 1.0);
        assert!(close(combo_multiplier(5), 1.5, 1e-12));
        assert_eq!(combo_multiplier(90), 10.0);
        assert_eq!(combo_multiplier(500), 10.0);
    }
}
