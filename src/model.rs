//! The economy aggregate: balance, upgrade inventory, mining timer, daily
//! streak and achievement flags.
//!
//! Fields are crate-private. Only the engine operations in `progress`,
//! `collect`, `market` and `daily` mutate them; hosts read through accessors.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use log::warn;
use serde::{Deserialize, Deserializer, Serialize};

pub const FRESH_BALANCE: f64 = 1000.0;
pub const BASE_RATE: f64 = 1.0;

pub const MARMALADE_MASTER_TOTAL: u64 = 10_000;
pub const DAILY_STREAK_TARGET: u32 = 7;
pub const FACTORY_OWNER_KINDS: u32 = 3;

/// Counters accept any JSON number. Negative values become 0, fractions are
/// floored and anything past `u32::MAX` saturates.
fn lenient_u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let raw = f64::deserialize(deserializer)?;
    // `as` saturates and maps NaN to 0.
    let value = raw.floor() as u32;
    if f64::from(value) != raw {
        warn!("snapshot counter {} out of range; using {}", raw, value);
    }
    Ok(value)
}

fn lenient_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let raw = f64::deserialize(deserializer)?;
    let value = raw.floor() as u64;
    if value as f64 != raw {
        warn!("snapshot total {} out of range; using {}", raw, value);
    }
    Ok(value)
}

/// Keeps the calendar entries that fit a slot number; the range check itself
/// happens in `snapshot::sanitize`.
fn lenient_slots<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BTreeSet<u8>, D::Error> {
    let raw = Vec::<f64>::deserialize(deserializer)?;
    let slots: BTreeSet<u8> = raw
        .iter()
        .filter(|v| v.fract() == 0.0 && (0.0..=f64::from(u8::MAX)).contains(*v))
        .map(|v| *v as u8)
        .collect();
    if slots.len() != raw.len() {
        warn!("dropped unusable calendar entries from snapshot: {:?}", raw);
    }
    Ok(slots)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpgradeKind {
    Mini,
    Medium,
    Large,
    Logistics,
}

impl UpgradeKind {
    pub const ALL: [UpgradeKind; 4] = [
        UpgradeKind::Mini,
        UpgradeKind::Medium,
        UpgradeKind::Large,
        UpgradeKind::Logistics,
    ];

    /// Kinds that add boost. Logistics scales efficiency instead.
    pub const FACTORIES: [UpgradeKind; 3] =
        [UpgradeKind::Mini, UpgradeKind::Medium, UpgradeKind::Large];

    pub fn label(self) -> &'static str {
        match self {
            UpgradeKind::Mini => "Mini Factory",
            UpgradeKind::Medium => "Medium Factory",
            UpgradeKind::Large => "Large Factory",
            UpgradeKind::Logistics => "Logistics",
        }
    }

    pub fn defaults(self) -> UpgradeState {
        let (base_cost, boost) = match self {
            UpgradeKind::Mini => (500.0, 0.5),
            UpgradeKind::Medium => (2000.0, 2.0),
            UpgradeKind::Large => (5000.0, 5.0),
            UpgradeKind::Logistics => (1000.0, 0.1),
        };
        UpgradeState {
            count: 0,
            base_cost,
            boost,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeState {
    #[serde(default, deserialize_with = "lenient_u32")]
    pub count: u32,
    #[serde(default)]
    pub base_cost: f64,
    #[serde(default)]
    pub boost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Upgrades {
    pub(crate) mini: UpgradeState,
    pub(crate) medium: UpgradeState,
    pub(crate) large: UpgradeState,
    pub(crate) logistics: UpgradeState,
}

impl Default for Upgrades {
    fn default() -> Self {
        Self {
            mini: UpgradeKind::Mini.defaults(),
            medium: UpgradeKind::Medium.defaults(),
            large: UpgradeKind::Large.defaults(),
            logistics: UpgradeKind::Logistics.defaults(),
        }
    }
}

impl Upgrades {
    pub fn get(&self, kind: UpgradeKind) -> &UpgradeState {
        match kind {
            UpgradeKind::Mini => &self.mini,
            UpgradeKind::Medium => &self.medium,
            UpgradeKind::Large => &self.large,
            UpgradeKind::Logistics => &self.logistics,
        }
    }

    pub(crate) fn get_mut(&mut self, kind: UpgradeKind) -> &mut UpgradeState {
        match kind {
            UpgradeKind::Mini => &mut self.mini,
            UpgradeKind::Medium => &mut self.medium,
            UpgradeKind::Large => &mut self.large,
            UpgradeKind::Logistics => &mut self.logistics,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (UpgradeKind, &UpgradeState)> {
        UpgradeKind::ALL.into_iter().map(move |kind| (kind, self.get(kind)))
    }

    pub fn factories(&self) -> impl Iterator<Item = &UpgradeState> {
        UpgradeKind::FACTORIES.into_iter().map(move |kind| self.get(kind))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MiningTimer {
    #[serde(with = "chrono::serde::ts_milliseconds_option")]
    pub(crate) last_collect_instant: Option<DateTime<Utc>>,
    pub(crate) progress_percent: f64,
}

impl MiningTimer {
    /// Start of the running cycle; `None` until the first tick anchors it.
    pub fn last_collect_instant(&self) -> Option<DateTime<Utc>> {
        self.last_collect_instant
    }

    pub fn progress_percent(&self) -> f64 {
        self.progress_percent
    }

    pub fn is_ready(&self) -> bool {
        self.progress_percent >= 100.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DailyBonus {
    pub(crate) last_claimed_date_key: Option<NaiveDate>,
    #[serde(deserialize_with = "lenient_u32")]
    pub(crate) streak: u32,
    #[serde(deserialize_with = "lenient_slots")]
    pub(crate) claimed_day_indices: BTreeSet<u8>,
}

impl DailyBonus {
    pub fn last_claimed(&self) -> Option<NaiveDate> {
        self.last_claimed_date_key
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    /// Claimed positions in the repeating 7-slot calendar, each in `1..=7`.
    pub fn claimed_slots(&self) -> &BTreeSet<u8> {
        &self.claimed_day_indices
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AchievementKind {
    FirstCollect,
    DailyStreak7,
    FactoryOwner,
    MarmaladeMaster,
}

impl AchievementKind {
    pub const ALL: [AchievementKind; 4] = [
        AchievementKind::FirstCollect,
        AchievementKind::DailyStreak7,
        AchievementKind::FactoryOwner,
        AchievementKind::MarmaladeMaster,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AchievementKind::FirstCollect => "First Batch",
            AchievementKind::DailyStreak7 => "Week of Jam",
            AchievementKind::FactoryOwner => "Factory Owner",
            AchievementKind::MarmaladeMaster => "Marmalade Master",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            AchievementKind::FirstCollect => "Fill the first mining cycle",
            AchievementKind::DailyStreak7 => "Claim the daily bonus 7 days in a row",
            AchievementKind::FactoryOwner => "Own a Mini, Medium and Large factory",
            AchievementKind::MarmaladeMaster => "Collect 10000 MARM in total",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FirstCollect {
    pub achieved: bool,
    #[serde(with = "chrono::serde::ts_milliseconds_option")]
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyStreak {
    pub achieved: bool,
    #[serde(deserialize_with = "lenient_u32")]
    pub streak: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactoryOwner {
    pub achieved: bool,
    #[serde(deserialize_with = "lenient_u32")]
    pub factories: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarmaladeMaster {
    pub achieved: bool,
    #[serde(deserialize_with = "lenient_u64")]
    pub total: u64,
}

/// Achievement flags. Every setter below only ever raises `achieved`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Achievements {
    pub(crate) first_collect: FirstCollect,
    pub(crate) daily_streak7: DailyStreak,
    pub(crate) factory_owner: FactoryOwner,
    pub(crate) marmalade_master: MarmaladeMaster,
}

impl Achievements {
    pub fn is_achieved(&self, kind: AchievementKind) -> bool {
        match kind {
            AchievementKind::FirstCollect => self.first_collect.achieved,
            AchievementKind::DailyStreak7 => self.daily_streak7.achieved,
            AchievementKind::FactoryOwner => self.factory_owner.achieved,
            AchievementKind::MarmaladeMaster => self.marmalade_master.achieved,
        }
    }

    pub fn first_collect(&self) -> &FirstCollect {
        &self.first_collect
    }

    pub fn daily_streak(&self) -> &DailyStreak {
        &self.daily_streak7
    }

    pub fn factory_owner(&self) -> &FactoryOwner {
        &self.factory_owner
    }

    pub fn marmalade_master(&self) -> &MarmaladeMaster {
        &self.marmalade_master
    }

    /// Returns true when this call unlocked the achievement.
    pub(crate) fn unlock_first_collect(&mut self, at: DateTime<Utc>) -> bool {
        if self.first_collect.achieved {
            return false;
        }
        self.first_collect.achieved = true;
        self.first_collect.date = Some(at);
        true
    }

    pub(crate) fn record_streak(&mut self, streak: u32) {
        self.daily_streak7.streak = streak;
        if streak >= DAILY_STREAK_TARGET {
            self.daily_streak7.achieved = true;
        }
    }

    pub(crate) fn record_factories(&mut self, factories: u32) {
        self.factory_owner.factories = factories;
        if factories >= FACTORY_OWNER_KINDS {
            self.factory_owner.achieved = true;
        }
    }

    pub(crate) fn record_collected(&mut self, earned: u64) {
        self.marmalade_master.total = self.marmalade_master.total.saturating_add(earned);
        if self.marmalade_master.total >= MARMALADE_MASTER_TOTAL {
            self.marmalade_master.achieved = true;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EconomyModel {
    pub(crate) balance: f64,
    pub(crate) base_rate: f64,
    pub(crate) upgrades: Upgrades,
    pub(crate) mining_timer: MiningTimer,
    pub(crate) daily_bonus: DailyBonus,
    pub(crate) achievements: Achievements,
}

impl Default for EconomyModel {
    fn default() -> Self {
        Self {
            balance: FRESH_BALANCE,
            base_rate: BASE_RATE,
            upgrades: Upgrades::default(),
            mining_timer: MiningTimer::default(),
            daily_bonus: DailyBonus::default(),
            achievements: Achievements::default(),
        }
    }
}

impl EconomyModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn base_rate(&self) -> f64 {
        self.base_rate
    }

    pub fn upgrades(&self) -> &Upgrades {
        &self.upgrades
    }

    pub fn upgrade(&self, kind: UpgradeKind) -> &UpgradeState {
        self.upgrades.get(kind)
    }

    pub fn mining_timer(&self) -> &MiningTimer {
        &self.mining_timer
    }

    pub fn daily_bonus(&self) -> &DailyBonus {
        &self.daily_bonus
    }

    pub fn achievements(&self) -> &Achievements {
        &self.achievements
    }
}
