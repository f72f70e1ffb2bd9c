//! Mining progress derived from wall-clock time since the last collection.
//!
//! Progress is recomputed from the cycle anchor on every call rather than
//! accumulated, so a tick after any offline gap lands on the same value as a
//! tick that never paused.

use chrono::{DateTime, Duration, Utc};

use crate::model::EconomyModel;

/// Length of one mining cycle: three hours.
pub const CYCLE_SECONDS: i64 = 3 * 60 * 60;
const CYCLE_MILLIS: i64 = CYCLE_SECONDS * 1000;

pub fn cycle_duration() -> Duration {
    Duration::seconds(CYCLE_SECONDS)
}

/// What a tick changed besides the progress value itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// The first cycle was anchored at this tick.
    pub anchored: bool,
    /// Progress reached 100% at this tick.
    pub completed: bool,
    /// FirstCollect was unlocked at this tick.
    pub first_collect_unlocked: bool,
}

impl TickOutcome {
    pub fn needs_save(&self) -> bool {
        self.anchored || self.first_collect_unlocked
    }
}

/// `min(100, 100 * elapsed / cycle)`, with negative elapsed treated as zero.
pub fn progress_for_elapsed(elapsed: Duration) -> f64 {
    let millis = elapsed.num_milliseconds().max(0) as f64;
    (millis / CYCLE_MILLIS as f64 * 100.0).min(100.0)
}

/// Periodic progress update. Anchors the first cycle lazily, then derives
/// progress from the anchor. A saturated timer is left alone until collected.
pub fn tick(model: &mut EconomyModel, now: DateTime<Utc>) -> TickOutcome {
    let mut outcome = TickOutcome::default();
    if model.mining_timer.progress_percent >= 100.0 {
        return outcome;
    }

    let anchor = match model.mining_timer.last_collect_instant {
        Some(anchor) => anchor,
        None => {
            model.mining_timer.last_collect_instant = Some(now);
            outcome.anchored = true;
            now
        }
    };
    advance(model, anchor, now, &mut outcome);
    outcome
}

/// One-time recomputation after a restore. Unlike `tick` it never anchors a
/// cycle: a model that was never ticked keeps waiting for its first tick.
pub fn catch_up(model: &mut EconomyModel, now: DateTime<Utc>) -> TickOutcome {
    let mut outcome = TickOutcome::default();
    if model.mining_timer.progress_percent >= 100.0 {
        return outcome;
    }
    if let Some(anchor) = model.mining_timer.last_collect_instant {
        advance(model, anchor, now, &mut outcome);
    }
    outcome
}

fn advance(
    model: &mut EconomyModel,
    anchor: DateTime<Utc>,
    now: DateTime<Utc>,
    outcome: &mut TickOutcome,
) {
    // max() keeps progress monotonic if the wall clock steps backwards.
    let progress = progress_for_elapsed(now - anchor).max(model.mining_timer.progress_percent);
    model.mining_timer.progress_percent = progress;

    if progress >= 100.0 {
        outcome.completed = true;
        outcome.first_collect_unlocked = model.achievements.unlock_first_collect(now);
    }
}

/// Time left in the running cycle. A cycle that has not been anchored yet
/// reports the full duration.
pub fn remaining(model: &EconomyModel, now: DateTime<Utc>) -> Duration {
    let timer = &model.mining_timer;
    if timer.progress_percent >= 100.0 {
        return Duration::zero();
    }
    match timer.last_collect_instant {
        Some(anchor) => {
            let elapsed = (now - anchor).max(Duration::zero());
            (cycle_duration() - elapsed).max(Duration::zero())
        }
        None => cycle_duration(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AchievementKind;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 8, 0, 0).unwrap()
    }

    #[test]
    fn first_tick_anchors_cycle() {
        let mut model = EconomyModel::new();
        let outcome = tick(&mut model, t0());
        assert!(outcome.anchored);
        assert!(outcome.needs_save());
        assert_eq!(model.mining_timer().last_collect_instant(), Some(t0()));
        assert_eq!(model.mining_timer().progress_percent(), 0.0);
    }

    #[test]
    fn half_cycle_is_fifty_percent() {
        let mut model = EconomyModel::new();
        tick(&mut model, t0());
        let outcome = tick(&mut model, t0() + Duration::minutes(90));
        assert!(!outcome.anchored);
        assert!((model.mining_timer().progress_percent() - 50.0).abs() < 1e-9);
        assert_eq!(remaining(&model, t0() + Duration::minutes(90)), Duration::minutes(90));
    }

    #[test]
    fn completion_unlocks_first_collect_once() {
        let mut model = EconomyModel::new();
        tick(&mut model, t0());
        let outcome = tick(&mut model, t0() + Duration::hours(3));
        assert!(outcome.completed);
        assert!(outcome.first_collect_unlocked);
        assert_eq!(model.mining_timer().progress_percent(), 100.0);
        assert!(model.achievements().is_achieved(AchievementKind::FirstCollect));
        assert_eq!(
            model.achievements().first_collect().date,
            Some(t0() + Duration::hours(3))
        );

        // Saturated: further ticks are no-ops.
        let outcome = tick(&mut model, t0() + Duration::hours(5));
        assert_eq!(outcome, TickOutcome::default());
        assert_eq!(
            model.achievements().first_collect().date,
            Some(t0() + Duration::hours(3))
        );
    }

    #[test]
    fn offline_gap_beyond_cycle_clamps() {
        let mut model = EconomyModel::new();
        tick(&mut model, t0());
        tick(&mut model, t0() + Duration::days(4));
        assert_eq!(model.mining_timer().progress_percent(), 100.0);
        assert_eq!(remaining(&model, t0() + Duration::days(4)), Duration::zero());
    }

    #[test]
    fn future_anchor_clamps_to_zero() {
        let mut model = EconomyModel::new();
        model.mining_timer.last_collect_instant = Some(t0() + Duration::hours(2));
        tick(&mut model, t0());
        assert_eq!(model.mining_timer().progress_percent(), 0.0);
        assert_eq!(remaining(&model, t0()), cycle_duration());
    }

    #[test]
    fn clock_stepping_back_keeps_progress() {
        let mut model = EconomyModel::new();
        tick(&mut model, t0());
        tick(&mut model, t0() + Duration::hours(1));
        let before = model.mining_timer().progress_percent();
        tick(&mut model, t0() + Duration::minutes(30));
        assert_eq!(model.mining_timer().progress_percent(), before);
    }

    #[test]
    fn catch_up_never_anchors() {
        let mut model = EconomyModel::new();
        let outcome = catch_up(&mut model, t0());
        assert_eq!(outcome, TickOutcome::default());
        assert!(model.mining_timer().last_collect_instant().is_none());
    }

    #[test]
    fn catch_up_after_long_absence_is_ready() {
        let mut model = EconomyModel::new();
        model.mining_timer.last_collect_instant = Some(t0());
        let outcome = catch_up(&mut model, t0() + Duration::hours(7));
        assert!(outcome.completed);
        assert!(model.mining_timer().is_ready());
    }

    #[test]
    fn unanchored_remaining_is_full_cycle() {
        let model = EconomyModel::new();
        assert_eq!(remaining(&model, t0()), Duration::hours(3));
    }
}
