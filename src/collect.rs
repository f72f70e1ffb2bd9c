//! Collecting a finished mining cycle.

use chrono::{DateTime, Utc};
use log::debug;

use crate::error::EconomyError;
use crate::market::efficiency_multiplier;
use crate::model::{EconomyModel, Upgrades};

pub const BASE_REWARD: f64 = 100.0;
/// Reward contributed per unit of factory boost.
pub const REWARD_PER_BOOST: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collection {
    pub earned: u64,
}

/// Factory contribution to a collection: `Σ count * boost * 20`.
///
/// This is deliberately not derived from `market::total_boost`; the hashrate
/// display and the reward use separate formulas.
pub fn reward_boost(upgrades: &Upgrades) -> f64 {
    upgrades
        .factories()
        .map(|u| u.count as f64 * u.boost * REWARD_PER_BOOST)
        .sum()
}

/// Reward for collecting now: `floor((100 + reward_boost) * efficiency)`.
pub fn reward(upgrades: &Upgrades) -> u64 {
    ((BASE_REWARD + reward_boost(upgrades)) * efficiency_multiplier(upgrades)).floor() as u64
}

pub fn collect(model: &mut EconomyModel, now: DateTime<Utc>) -> Result<Collection, EconomyError> {
    let progress = model.mining_timer.progress_percent;
    if progress < 100.0 {
        return Err(EconomyError::NotReady { progress });
    }

    let earned = reward(&model.upgrades);
    model.balance += earned as f64;
    model.mining_timer.last_collect_instant = Some(now);
    model.mining_timer.progress_percent = 0.0;
    model.achievements.record_collected(earned);

    debug!("collected {} (balance {})", earned, model.balance);
    Ok(Collection { earned })
}
