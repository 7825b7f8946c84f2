//! Rebirth Stones and permanent upgrades
//!
//! Every mutation goes through the save store with a forced write.

use serde::Serialize;
use thiserror::Error;

use crate::money::{Money, formulas};
use crate::persistence::{SaveBackend, SaveOutcome, SaveStore};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpendError {
    #[error("not enough Rebirth Stones: need {needed}, have {available}")]
    Insufficient { needed: Money, available: Money },
}

/// Stones paid out for reaching `stage`
pub fn rebirth_stones_for(stage: u32) -> Money {
    formulas::rebirth_stones(stage)
}

/// Add the payout for `stage` and raise the max stage. Returns the stones
/// gained.
pub fn gain_rebirth_stones<B: SaveBackend>(
    store: &mut SaveStore<B>,
    stage: u32,
    now: f64,
) -> Money {
    let stones = rebirth_stones_for(stage);
    let mut record = store.record().clone();
    record.rebirth_stones = record.rebirth_stones + stones;
    record.max_stage = record.max_stage.max(stage);

    if store.commit(record, now, true) == SaveOutcome::Failed {
        log::warn!("Rebirth Stones kept in memory until the next successful save");
    }
    log::info!("Gained {stones} Rebirth Stones for stage {stage}");
    stones
}

/// Deduct `amount`. Nothing changes when the balance is short.
pub fn spend_rebirth_stones<B: SaveBackend>(
    store: &mut SaveStore<B>,
    amount: Money,
    now: f64,
) -> Result<(), SpendError> {
    let available = store.record().rebirth_stones;
    if available < amount {
        return Err(SpendError::Insufficient {
            needed: amount,
            available,
        });
    }

    let mut record = store.record().clone();
    record.rebirth_stones = available.saturating_sub(amount);
    store.commit(record, now, true);
    Ok(())
}

/// Cost to go from `level` to `level + 1`
pub fn attack_level_cost(level: u32) -> Money {
    Money::from(10 * (level as u64 + 1))
}

/// Displayed damage multiplier at `level`
pub fn attack_level_effect(level: u32) -> f64 {
    1.1 * level as f64
}

/// What the next attack upgrade costs and gives
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeInfo {
    pub current_level: u32,
    pub cost: Money,
    /// Effect at the next level
    pub effect: f64,
}

pub fn attack_level_info<B: SaveBackend>(store: &SaveStore<B>) -> UpgradeInfo {
    let current_level = store.record().attack_level;
    UpgradeInfo {
        current_level,
        cost: attack_level_cost(current_level),
        effect: attack_level_effect(current_level + 1),
    }
}

/// Buy one attack level. Stones and level change in a single write.
pub fn upgrade_attack_level<B: SaveBackend>(
    store: &mut SaveStore<B>,
    now: f64,
) -> Result<u32, SpendError> {
    let info = attack_level_info(store);
    let available = store.record().rebirth_stones;
    if available < info.cost {
        return Err(SpendError::Insufficient {
            needed: info.cost,
            available,
        });
    }

    let mut record = store.record().clone();
    record.rebirth_stones = available.saturating_sub(info.cost);
    record.attack_level = info.current_level + 1;
    let level = record.attack_level;
    store.commit(record, now, true);

    log::info!("Attack upgraded to level {level}");
    Ok(level)
}
