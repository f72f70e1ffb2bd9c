//! Snapshot encoding and the restore path.
//!
//! Decoding is typed: absent fields take their fresh-state defaults, values of
//! the wrong type reject the whole snapshot. Counters and calendar slots take
//! any number and are clamped while decoding. After decoding, each field is
//! checked for range and repaired on its own, then the mining timer gets one
//! eager catch-up against the current time.

use chrono::{DateTime, Utc};
use log::warn;

use crate::daily::CALENDAR_SLOTS;
use crate::error::SnapshotError;
use crate::market::factory_count;
use crate::model::{BASE_RATE, EconomyModel, FRESH_BALANCE, UpgradeKind};
use crate::progress::{self, TickOutcome};

pub fn encode(model: &EconomyModel) -> Result<Vec<u8>, SnapshotError> {
    Ok(serde_json::to_vec(model)?)
}

pub fn decode(bytes: &[u8]) -> Result<EconomyModel, SnapshotError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Decodes a snapshot and brings it up to `now`.
pub fn restore(
    bytes: &[u8],
    now: DateTime<Utc>,
) -> Result<(EconomyModel, TickOutcome), SnapshotError> {
    let mut model = decode(bytes)?;
    sanitize(&mut model);
    let outcome = progress::catch_up(&mut model, now);
    Ok((model, outcome))
}

/// Repairs out-of-range values in a decoded model. Returns the number of
/// fields that had to be changed.
pub fn sanitize(model: &mut EconomyModel) -> usize {
    let mut repaired = 0;

    if !model.balance.is_finite() || model.balance < 0.0 {
        warn!("snapshot balance {} is invalid; resetting", model.balance);
        model.balance = FRESH_BALANCE;
        repaired += 1;
    }
    // Floor guarantee for old or damaged saves.
    if model.balance < FRESH_BALANCE {
        model.balance = FRESH_BALANCE;
    }

    if !(model.base_rate.is_finite() && model.base_rate > 0.0) {
        warn!("snapshot base rate {} is invalid; resetting", model.base_rate);
        model.base_rate = BASE_RATE;
        repaired += 1;
    }

    for kind in UpgradeKind::ALL {
        let defaults = kind.defaults();
        let upgrade = model.upgrades.get_mut(kind);
        if !(upgrade.base_cost.is_finite() && upgrade.base_cost > 0.0) {
            upgrade.base_cost = defaults.base_cost;
            repaired += 1;
        }
        if !(upgrade.boost.is_finite() && upgrade.boost > 0.0) {
            upgrade.boost = defaults.boost;
            repaired += 1;
        }
    }

    let timer = &mut model.mining_timer;
    if timer.last_collect_instant.is_none() && timer.progress_percent != 0.0 {
        timer.progress_percent = 0.0;
        repaired += 1;
    } else if !timer.progress_percent.is_finite() {
        timer.progress_percent = 0.0;
        repaired += 1;
    } else if !(0.0..=100.0).contains(&timer.progress_percent) {
        timer.progress_percent = timer.progress_percent.clamp(0.0, 100.0);
        repaired += 1;
    }

    let slots = &mut model.daily_bonus.claimed_day_indices;
    let before = slots.len();
    slots.retain(|slot| (1..=CALENDAR_SLOTS).contains(slot));
    if slots.len() != before {
        repaired += 1;
    }

    let factories = factory_count(&model.upgrades);
    model.achievements.record_factories(factories);

    repaired
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AchievementKind;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 8, 0, 0).unwrap()
    }

    #[test]
    fn empty_object_restores_fresh_defaults() {
        let (model, _) = restore(b"{}", t0()).unwrap();
        assert_eq!(model, EconomyModel::new());
    }

    #[test]
    fn unparseable_bytes_are_malformed() {
        assert!(matches!(
            decode(b"{not json"),
            Err(SnapshotError::Malformed(_))
        ));
    }

    #[test]
    fn wrong_types_are_malformed() {
        assert!(decode(br#"{"balance":"lots"}"#).is_err());
        assert!(decode(br#"{"upgrades":{"mini":{"count":"two"}}}"#).is_err());
        assert!(decode(br#"[1,2,3]"#).is_err());
    }

    #[test]
    fn low_balance_is_floored() {
        let (model, _) = restore(br#"{"balance":12.5}"#, t0()).unwrap();
        assert_eq!(model.balance(), 1000.0);

        let (model, _) = restore(br#"{"balance":4321}"#, t0()).unwrap();
        assert_eq!(model.balance(), 4321.0);
    }

    #[test]
    fn partial_upgrade_fills_defaults() {
        let json = br#"{"upgrades":{"medium":{"count":2}}}"#;
        let (model, _) = restore(json, t0()).unwrap();
        let medium = model.upgrade(UpgradeKind::Medium);
        assert_eq!(medium.count, 2);
        assert_eq!(medium.base_cost, 2000.0);
        assert_eq!(medium.boost, 2.0);
        assert_eq!(model.upgrade(UpgradeKind::Large).base_cost, 5000.0);
    }

    #[test]
    fn invalid_values_are_repaired() {
        let json = br#"{
            "baseRate": -1,
            "upgrades": {"mini": {"count": 1, "baseCost": 0, "boost": -2}},
            "miningTimer": {"lastCollectInstant": null, "progressPercent": 55},
            "dailyBonus": {"streak": 2, "claimedDayIndices": [0, 3, 8]}
        }"#;
        let mut model = decode(json).unwrap();
        let repaired = sanitize(&mut model);
        assert_eq!(repaired, 5);
        assert_eq!(model.base_rate(), 1.0);
        assert_eq!(model.upgrade(UpgradeKind::Mini).base_cost, 500.0);
        assert_eq!(model.upgrade(UpgradeKind::Mini).boost, 0.5);
        assert_eq!(model.mining_timer().progress_percent(), 0.0);
        assert_eq!(
            model.daily_bonus().claimed_slots().iter().copied().collect::<Vec<_>>(),
            vec![3]
        );
    }

    #[test]
    fn out_of_range_numbers_keep_the_rest_of_the_save() {
        let json = br#"{
            "balance": 5000,
            "upgrades": {"mini": {"count": -1}, "large": {"count": 1e12}},
            "dailyBonus": {"streak": 2.5, "claimedDayIndices": [300, 2, -4, 6]}
        }"#;
        let (model, _) = restore(json, t0()).unwrap();
        assert_eq!(model.balance(), 5000.0);
        assert_eq!(model.upgrade(UpgradeKind::Mini).count, 0);
        assert_eq!(model.upgrade(UpgradeKind::Large).count, u32::MAX);
        assert_eq!(model.daily_bonus().streak(), 2);
        assert_eq!(
            model.daily_bonus().claimed_slots().iter().copied().collect::<Vec<_>>(),
            vec![2, 6]
        );
    }

    #[test]
    fn restore_catches_up_offline_time() {
        let mut model = EconomyModel::new();
        progress::tick(&mut model, t0());
        let bytes = encode(&model).unwrap();

        let (restored, outcome) = restore(&bytes, t0() + Duration::minutes(45)).unwrap();
        assert!(!outcome.completed);
        assert!((restored.mining_timer().progress_percent() - 25.0).abs() < 1e-9);

        let (restored, outcome) = restore(&bytes, t0() + Duration::hours(10)).unwrap();
        assert!(outcome.completed);
        assert!(outcome.first_collect_unlocked);
        assert!(restored.mining_timer().is_ready());
        assert!(restored.achievements().is_achieved(AchievementKind::FirstCollect));
    }

    #[test]
    fn instants_survive_round_trip() {
        let mut model = EconomyModel::new();
        let anchor = t0() + Duration::milliseconds(1234);
        progress::tick(&mut model, anchor);
        let decoded = decode(&encode(&model).unwrap()).unwrap();
        assert_eq!(decoded.mining_timer().last_collect_instant(), Some(anchor));
    }

    #[test]
    fn factory_owner_rederived_from_counts() {
        let json = br#"{"upgrades":{"mini":{"count":1},"medium":{"count":1},"large":{"count":4}}}"#;
        let (model, _) = restore(json, t0()).unwrap();
        assert_eq!(model.achievements().factory_owner().factories, 3);
        assert!(model.achievements().is_achieved(AchievementKind::FactoryOwner));
    }

    #[test]
    fn achieved_flags_survive_restore() {
        let json = br#"{"achievements":{"marmaladeMaster":{"achieved":true,"total":12000}}}"#;
        let (model, _) = restore(json, t0()).unwrap();
        assert!(model.achievements().is_achieved(AchievementKind::MarmaladeMaster));
        assert_eq!(model.achievements().marmalade_master().total, 12_000);
    }
}
