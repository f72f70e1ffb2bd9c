//! Read-only projections of the model for presentation layers.

use chrono::{DateTime, NaiveDate, Utc};

use crate::daily::{self, CALENDAR_SLOTS};
use crate::market;
use crate::model::{
    AchievementKind, DAILY_STREAK_TARGET, EconomyModel, FACTORY_OWNER_KINDS,
    MARMALADE_MASTER_TOTAL, UpgradeKind,
};
use crate::progress;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Countdown {
    Remaining {
        hours: i64,
        minutes: i64,
        seconds: i64,
    },
    Ready,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpgradeRow {
    pub kind: UpgradeKind,
    pub label: &'static str,
    pub count: u32,
    pub cost: f64,
    pub affordable: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AchievementRow {
    pub kind: AchievementKind,
    pub label: &'static str,
    pub description: &'static str,
    pub achieved: bool,
    pub detail: String,
}

/// Everything a host UI shows, computed in one pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub balance: u64,
    /// Effective hashrate rounded to one decimal.
    pub hashrate: f64,
    pub total_boost: f64,
    pub efficiency_percent: u32,
    pub progress_percent: u32,
    pub countdown: Countdown,
    pub collect_ready: bool,
    pub upgrades: Vec<UpgradeRow>,
    pub streak: u32,
    /// Index 0 is slot 1.
    pub claimed_slots: [bool; CALENDAR_SLOTS as usize],
    pub today_slot: u8,
    pub daily_claimable: bool,
    pub next_daily_grant: u64,
    pub achievements: Vec<AchievementRow>,
}

impl Dashboard {
    pub fn build(model: &EconomyModel, now: DateTime<Utc>, today: NaiveDate) -> Self {
        let timer = model.mining_timer();
        let mut claimed_slots = [false; CALENDAR_SLOTS as usize];
        for slot in model.daily_bonus().claimed_slots() {
            if let Some(flag) = claimed_slots.get_mut(usize::from(*slot).wrapping_sub(1)) {
                *flag = true;
            }
        }

        Self {
            balance: model.balance().floor() as u64,
            hashrate: round_tenths(market::hashrate(model)),
            total_boost: market::total_boost(model.upgrades()),
            efficiency_percent: market::efficiency_percent(model.upgrades()),
            progress_percent: timer.progress_percent().floor() as u32,
            countdown: countdown(model, now),
            collect_ready: timer.is_ready(),
            upgrades: upgrade_rows(model),
            streak: model.daily_bonus().streak(),
            claimed_slots,
            today_slot: daily::calendar_slot(today),
            daily_claimable: daily::is_claimable(model, today),
            next_daily_grant: daily::next_grant(model),
            achievements: achievement_rows(model),
        }
    }
}

pub fn countdown(model: &EconomyModel, now: DateTime<Utc>) -> Countdown {
    if model.mining_timer().is_ready() {
        return Countdown::Ready;
    }
    let left = progress::remaining(model, now).num_milliseconds();
    Countdown::Remaining {
        hours: left / 3_600_000,
        minutes: (left % 3_600_000) / 60_000,
        seconds: (left % 60_000) / 1000,
    }
}

pub fn upgrade_rows(model: &EconomyModel) -> Vec<UpgradeRow> {
    model
        .upgrades()
        .iter()
        .map(|(kind, upgrade)| {
            let cost = upgrade.cost_for_next();
            UpgradeRow {
                kind,
                label: kind.label(),
                count: upgrade.count,
                cost,
                affordable: model.balance() >= cost,
            }
        })
        .collect()
}

pub fn achievement_rows(model: &EconomyModel) -> Vec<AchievementRow> {
    let achievements = model.achievements();
    AchievementKind::ALL
        .into_iter()
        .map(|kind| {
            let detail = match kind {
                AchievementKind::FirstCollect => match achievements.first_collect().date {
                    Some(date) => date.format("%Y-%m-%d").to_string(),
                    None => "-".to_string(),
                },
                AchievementKind::DailyStreak7 => format!(
                    "{}/{} days",
                    achievements.daily_streak().streak,
                    DAILY_STREAK_TARGET
                ),
                AchievementKind::FactoryOwner => format!(
                    "{}/{} factories",
                    achievements.factory_owner().factories,
                    FACTORY_OWNER_KINDS
                ),
                AchievementKind::MarmaladeMaster => format!(
                    "{}/{}",
                    achievements.marmalade_master().total,
                    MARMALADE_MASTER_TOTAL
                ),
            };
            AchievementRow {
                kind,
                label: kind.label(),
                description: kind.description(),
                achieved: achievements.is_achieved(kind),
                detail,
            }
        })
        .collect()
}

fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn format_countdown(countdown: Countdown) -> String {
    match countdown {
        Countdown::Ready => "Ready!".to_string(),
        Countdown::Remaining {
            hours,
            minutes,
            seconds,
        } => format!("{:02}:{:02}:{:02}", hours, minutes, seconds),
    }
}

pub fn format_hashrate(hashrate: f64) -> String {
    format!("{:.1} H/s", hashrate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{collect, daily, progress};
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 8, 0, 0).unwrap()
    }

    #[test]
    fn fresh_dashboard() {
        let model = EconomyModel::new();
        let dash = Dashboard::build(&model, t0(), t0().date_naive());
        assert_eq!(dash.balance, 1000);
        assert_eq!(dash.hashrate, 1.0);
        assert_eq!(dash.efficiency_percent, 100);
        assert_eq!(dash.progress_percent, 0);
        assert_eq!(format_countdown(dash.countdown), "03:00:00");
        assert!(!dash.collect_ready);
        assert_eq!(dash.upgrades.len(), 4);
        assert_eq!(dash.upgrades[0].cost, 500.0);
        assert!(dash.upgrades[0].affordable);
        assert!(!dash.upgrades[2].affordable);
        assert_eq!(dash.today_slot, 3);
        assert!(dash.daily_claimable);
        assert_eq!(dash.next_daily_grant, 100);
        assert!(dash.achievements.iter().all(|a| !a.achieved));
    }

    #[test]
    fn countdown_floors_components() {
        let mut model = EconomyModel::new();
        progress::tick(&mut model, t0());
        let now = t0() + Duration::seconds(3725) + Duration::milliseconds(400);
        progress::tick(&mut model, now);
        // 10800s - 3725.4s = 7074.6s left
        assert_eq!(
            countdown(&model, now),
            Countdown::Remaining {
                hours: 1,
                minutes: 57,
                seconds: 54
            }
        );
        let dash = Dashboard::build(&model, now, now.date_naive());
        assert_eq!(dash.progress_percent, 34);
    }

    #[test]
    fn ready_and_claimed_state() {
        let mut model = EconomyModel::new();
        progress::tick(&mut model, t0());
        let now = t0() + Duration::hours(3);
        progress::tick(&mut model, now);
        daily::claim(&mut model, now.date_naive()).unwrap();

        let dash = Dashboard::build(&model, now, now.date_naive());
        assert_eq!(dash.countdown, Countdown::Ready);
        assert_eq!(format_countdown(dash.countdown), "Ready!");
        assert!(dash.collect_ready);
        assert!(!dash.daily_claimable);
        assert_eq!(dash.claimed_slots, [false, false, true, false, false, false, false]);
        assert_eq!(dash.next_daily_grant, 120);
        assert_eq!(dash.achievements[0].detail, "2024-05-10");

        collect::collect(&mut model, now).unwrap();
        let dash = Dashboard::build(&model, now, now.date_naive());
        assert_eq!(dash.balance, 1200);
        assert_eq!(dash.achievements[3].detail, "100/10000");
    }

    #[test]
    fn hashrate_is_rounded_for_display() {
        let mut model = EconomyModel::new();
        model.upgrades.get_mut(UpgradeKind::Mini).count = 1;
        model.upgrades.get_mut(UpgradeKind::Logistics).count = 3;
        // (1 + 0.5) * 1.3 = 1.95
        let dash = Dashboard::build(&model, t0(), t0().date_naive());
        assert_eq!(format_hashrate(dash.hashrate), "2.0 H/s");
        assert_eq!(dash.total_boost, 0.5);
        assert_eq!(dash.efficiency_percent, 130);
    }

    #[test]
    fn building_does_not_mutate() {
        let mut model = EconomyModel::new();
        progress::tick(&mut model, t0());
        let before = model.clone();
        let _ = Dashboard::build(&model, t0() + Duration::hours(4), t0().date_naive());
        assert_eq!(model, before);
    }
}
