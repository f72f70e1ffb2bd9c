//! Calendar-anchored daily bonus and login streak.

use chrono::{Datelike, NaiveDate};
use log::debug;

use crate::error::EconomyError;
use crate::model::EconomyModel;

pub const DAILY_BASE: u64 = 100;
pub const DAILY_PER_STREAK_DAY: u64 = 20;
pub const CALENDAR_SLOTS: u8 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyClaim {
    pub granted: u64,
    pub streak: u32,
    pub slot: u8,
}

/// Position of `date` in the repeating 7-slot calendar:
/// `((dayOfMonth - 1) mod 7) + 1`. This is not an ISO week; slots alias
/// across months of different lengths.
pub fn calendar_slot(date: NaiveDate) -> u8 {
    (date.day0() % u32::from(CALENDAR_SLOTS)) as u8 + 1
}

/// Bonus the next claim would grant, based on the current streak.
pub fn next_grant(model: &EconomyModel) -> u64 {
    DAILY_BASE + u64::from(model.daily_bonus.streak) * DAILY_PER_STREAK_DAY
}

pub fn is_claimable(model: &EconomyModel, today: NaiveDate) -> bool {
    model.daily_bonus.last_claimed_date_key != Some(today)
}

pub fn claim(model: &mut EconomyModel, today: NaiveDate) -> Result<DailyClaim, EconomyError> {
    claim_with(model, today, calendar_slot)
}

/// `claim` with a caller-supplied day-to-slot mapping. Slots outside `1..=7`
/// are not recorded.
pub fn claim_with(
    model: &mut EconomyModel,
    today: NaiveDate,
    slot_of: impl Fn(NaiveDate) -> u8,
) -> Result<DailyClaim, EconomyError> {
    if !is_claimable(model, today) {
        return Err(EconomyError::AlreadyClaimed { date: today });
    }

    let granted = next_grant(model);
    let bonus = &mut model.daily_bonus;
    let consecutive = match (bonus.last_claimed_date_key, today.pred_opt()) {
        (Some(last), Some(yesterday)) => last == yesterday,
        _ => false,
    };
    bonus.streak = if consecutive {
        bonus.streak.saturating_add(1)
    } else {
        1
    };
    bonus.last_claimed_date_key = Some(today);

    let slot = slot_of(today);
    if (1..=CALENDAR_SLOTS).contains(&slot) {
        bonus.claimed_day_indices.insert(slot);
    }
    let streak = bonus.streak;

    model.balance += granted as f64;
    model.achievements.record_streak(streak);

    debug!("daily bonus {} on {} (streak {})", granted, today, streak);
    Ok(DailyClaim {
        granted,
        streak,
        slot,
    })
}
