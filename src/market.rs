//! Upgrade purchases and the derived hashrate/efficiency figures.

use log::debug;

use crate::error::EconomyError;
use crate::model::{EconomyModel, UpgradeKind, UpgradeState, Upgrades};

/// Each purchase raises the next cost of that kind by 50%.
pub const COST_GROWTH: f64 = 1.5;
/// Efficiency percent shown per Logistics upgrade.
pub const EFFICIENCY_PERCENT_PER_LOGISTICS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Purchase {
    pub kind: UpgradeKind,
    pub paid: f64,
    pub count: u32,
}

impl UpgradeState {
    pub fn cost_for_next(&self) -> f64 {
        let scaling = COST_GROWTH.powf(f64::from(self.count));
        (self.base_cost * scaling).floor()
    }

    pub fn total_boost(&self) -> f64 {
        self.boost * self.count as f64
    }
}

pub fn current_cost(model: &EconomyModel, kind: UpgradeKind) -> f64 {
    model.upgrades.get(kind).cost_for_next()
}

pub fn buy(model: &mut EconomyModel, kind: UpgradeKind) -> Result<Purchase, EconomyError> {
    let cost = current_cost(model, kind);
    let next_count = model.upgrades.get(kind).count.checked_add(1);
    let count = match next_count {
        Some(count) if model.balance >= cost => count,
        _ => {
            return Err(EconomyError::InsufficientFunds {
                cost,
                balance: model.balance,
            });
        }
    };

    model.balance -= cost;
    model.upgrades.get_mut(kind).count = count;

    let factories = factory_count(&model.upgrades);
    model.achievements.record_factories(factories);

    debug!("bought {:?} #{} for {}", kind, count, cost);
    Ok(Purchase {
        kind,
        paid: cost,
        count,
    })
}

/// Raw boost of all factories, as shown next to the hashrate.
pub fn total_boost(upgrades: &Upgrades) -> f64 {
    upgrades.factories().map(UpgradeState::total_boost).sum()
}

/// `1 + logisticsCount * logisticsBoost`.
pub fn efficiency_multiplier(upgrades: &Upgrades) -> f64 {
    let logistics = upgrades.get(UpgradeKind::Logistics);
    1.0 + logistics.count as f64 * logistics.boost
}

pub fn efficiency_percent(upgrades: &Upgrades) -> u32 {
    let logistics = upgrades.get(UpgradeKind::Logistics).count;
    100u32.saturating_add(logistics.saturating_mul(EFFICIENCY_PERCENT_PER_LOGISTICS))
}

/// `(baseRate + totalBoost) * efficiency`.
pub fn hashrate(model: &EconomyModel) -> f64 {
    (model.base_rate + total_boost(&model.upgrades)) * efficiency_multiplier(&model.upgrades)
}

/// Number of factory kinds owned at least once.
pub fn factory_count(upgrades: &Upgrades) -> u32 {
    upgrades.factories().filter(|u| u.count > 0).count() as u32
}
