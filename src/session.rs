//! The session owns the model for the lifetime of a play session and wires
//! every engine operation to the clock and the snapshot store.

use log::{debug, info, warn};

use crate::clock::Clock;
use crate::collect::{self, Collection};
use crate::daily::{self, DailyClaim};
use crate::error::{EconomyError, StoreError};
use crate::market::{self, Purchase};
use crate::model::{EconomyModel, UpgradeKind};
use crate::progress::{self, TickOutcome};
use crate::snapshot;
use crate::store::SnapshotStore;
use crate::view::Dashboard;

/// How the session's model came to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Fresh,
    Restored,
    /// A snapshot existed but could not be decoded or read.
    Recovered,
}

pub struct Session<S, C> {
    model: EconomyModel,
    store: S,
    clock: C,
    origin: Origin,
    caught_up: TickOutcome,
}

impl<S: SnapshotStore, C: Clock> Session<S, C> {
    /// Loads the stored snapshot, or starts fresh when there is none or it is
    /// unusable. Never fails: a bad snapshot is logged and replaced.
    pub fn open(store: S, clock: C) -> Self {
        let now = clock.now();
        let (model, origin, caught_up) = match store.load() {
            Ok(Some(bytes)) => match snapshot::restore(&bytes, now) {
                Ok((model, outcome)) => {
                    info!(
                        "restored snapshot: balance {}, progress {:.1}%",
                        model.balance(),
                        model.mining_timer().progress_percent()
                    );
                    if outcome.first_collect_unlocked {
                        debug!("first cycle completed while offline");
                    }
                    (model, Origin::Restored, outcome)
                }
                Err(e) => {
                    warn!("{}; starting a fresh economy", e);
                    (EconomyModel::new(), Origin::Recovered, TickOutcome::default())
                }
            },
            Ok(None) => {
                info!("no snapshot found; starting a fresh economy");
                (EconomyModel::new(), Origin::Fresh, TickOutcome::default())
            }
            Err(e) => {
                warn!("could not read snapshot ({}); starting a fresh economy", e);
                (EconomyModel::new(), Origin::Recovered, TickOutcome::default())
            }
        };

        let session = Self {
            model,
            store,
            clock,
            origin,
            caught_up,
        };
        if caught_up.needs_save() {
            session.persist();
        }
        session
    }

    pub fn model(&self) -> &EconomyModel {
        &self.model
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// What the restore catch-up changed while the player was away.
    pub fn caught_up(&self) -> TickOutcome {
        self.caught_up
    }

    pub fn tick(&mut self) -> TickOutcome {
        let outcome = progress::tick(&mut self.model, self.clock.now());
        if outcome.needs_save() {
            self.persist();
        }
        outcome
    }

    pub fn collect(&mut self) -> Result<Collection, EconomyError> {
        let collection = collect::collect(&mut self.model, self.clock.now())?;
        self.persist();
        Ok(collection)
    }

    pub fn buy(&mut self, kind: UpgradeKind) -> Result<Purchase, EconomyError> {
        let purchase = market::buy(&mut self.model, kind)?;
        self.persist();
        Ok(purchase)
    }

    pub fn claim_daily(&mut self) -> Result<DailyClaim, EconomyError> {
        let claim = daily::claim(&mut self.model, self.clock.today())?;
        self.persist();
        Ok(claim)
    }

    pub fn current_cost(&self, kind: UpgradeKind) -> f64 {
        market::current_cost(&self.model, kind)
    }

    pub fn dashboard(&self) -> Dashboard {
        Dashboard::build(&self.model, self.clock.now(), self.clock.today())
    }

    /// Synchronous save for teardown. Unlike the saves after each action,
    /// the error is returned to the caller.
    pub fn flush(&self) -> Result<(), StoreError> {
        match snapshot::encode(&self.model) {
            Ok(bytes) => self.store.save(&bytes),
            Err(e) => {
                warn!("could not encode snapshot: {}", e);
                Ok(())
            }
        }
    }

    /// Save after a mutation. A failure keeps the in-memory model as the
    /// source of truth; the next successful save reconciles.
    fn persist(&self) {
        if let Err(e) = self.flush() {
            warn!("snapshot save failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::model::AchievementKind;
    use crate::store::MemoryStore;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 8, 0, 0).unwrap()
    }

    struct FailingStore;

    impl SnapshotStore for FailingStore {
        fn load(&self) -> Result<Option<Vec<u8>>, StoreError> {
            Ok(None)
        }

        fn save(&self, _snapshot: &[u8]) -> Result<(), StoreError> {
            Err(std::io::Error::other("disk full").into())
        }
    }

    #[test]
    fn fresh_session_without_snapshot() {
        let session = Session::open(MemoryStore::new(), ManualClock::new(t0()));
        assert_eq!(session.origin(), Origin::Fresh);
        assert_eq!(session.model(), &EconomyModel::new());
    }

    #[test]
    fn malformed_snapshot_falls_back_to_fresh() {
        let store = MemoryStore::with_snapshot("{\"balance\": true");
        let session = Session::open(store, ManualClock::new(t0()));
        assert_eq!(session.origin(), Origin::Recovered);
        assert_eq!(session.model(), &EconomyModel::new());
    }

    #[test]
    fn tick_saves_only_on_edges() {
        let store = MemoryStore::new();
        let clock = ManualClock::new(t0());
        let mut session = Session::open(&store, &clock);

        assert!(session.tick().anchored);
        assert_eq!(store.save_count(), 1);

        clock.advance(Duration::hours(1));
        session.tick();
        assert_eq!(store.save_count(), 1);

        clock.advance(Duration::hours(2));
        assert!(session.tick().first_collect_unlocked);
        assert_eq!(store.save_count(), 2);
    }

    #[test]
    fn every_action_saves() {
        let store = MemoryStore::new();
        let clock = ManualClock::new(t0());
        let mut session = Session::open(&store, &clock);
        session.tick();
        clock.advance(Duration::hours(3));
        session.tick();
        let baseline = store.save_count();

        session.collect().unwrap();
        session.buy(UpgradeKind::Mini).unwrap();
        session.claim_daily().unwrap();
        assert_eq!(store.save_count(), baseline + 3);

        // Rejected actions do not save.
        assert!(session.collect().is_err());
        assert!(session.claim_daily().is_err());
        assert_eq!(store.save_count(), baseline + 3);
    }

    #[test]
    fn save_failure_keeps_mutation() {
        let clock = ManualClock::new(t0());
        let mut session = Session::open(FailingStore, &clock);
        let claim = session.claim_daily().unwrap();
        assert_eq!(claim.granted, 100);
        assert_eq!(session.model().balance(), 1100.0);
        assert!(session.flush().is_err());
    }

    #[test]
    fn offline_unlock_is_saved_on_open() {
        let store = MemoryStore::new();
        let clock = ManualClock::new(t0());
        {
            let mut session = Session::open(&store, &clock);
            session.tick();
        }
        assert_eq!(store.save_count(), 1);

        clock.advance(Duration::hours(5));
        let session = Session::open(&store, &clock);
        assert!(session.caught_up().first_collect_unlocked);
        assert_eq!(store.save_count(), 2);

        let saved = crate::snapshot::decode(&store.snapshot().unwrap()).unwrap();
        assert_eq!(saved.achievements().first_collect().date, Some(clock.now()));

        // Nothing new to record on the next open.
        clock.advance(Duration::hours(1));
        let reopened = Session::open(&store, &clock);
        assert!(!reopened.caught_up().needs_save());
        assert_eq!(store.save_count(), 2);
        assert_eq!(
            reopened.model().achievements().first_collect().date,
            Some(t0() + Duration::hours(5))
        );
    }

    #[test]
    fn reopen_resumes_where_it_left_off() {
        let store = MemoryStore::new();
        let clock = ManualClock::new(t0());
        {
            let mut session = Session::open(&store, &clock);
            session.tick();
            session.buy(UpgradeKind::Mini).unwrap();
        }

        clock.advance(Duration::hours(4));
        let mut session = Session::open(&store, &clock);
        assert_eq!(session.origin(), Origin::Restored);
        // 1000 - 500 = 500, floored back up to 1000 on restore.
        assert_eq!(session.model().balance(), 1000.0);
        assert_eq!(session.model().upgrade(UpgradeKind::Mini).count, 1);
        assert!(session.model().mining_timer().is_ready());
        assert!(session.model().achievements().is_achieved(AchievementKind::FirstCollect));

        // 100 + 1 * 0.5 * 20 = 110
        assert_eq!(session.collect().unwrap().earned, 110);
    }
}
