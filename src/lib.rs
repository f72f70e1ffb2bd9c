//! Marmalade mining economy.
//!
//! An idle-progression engine: a mining cycle fills over three hours of wall
//! time, a full cycle is collected for a reward, the reward buys factory and
//! logistics upgrades, and a daily login streak grants bonus balance.
//! Achievements unlock along the way.
//!
//! Hosts own a [`Session`], feed it periodic ticks (see [`Ticker`]) and read
//! [`Dashboard`] projections for display.

pub mod clock;
pub mod collect;
pub mod daily;
pub mod error;
pub mod market;
pub mod model;
pub mod progress;
pub mod scheduler;
pub mod session;
pub mod snapshot;
pub mod store;
pub mod view;

pub use clock::{Clock, ManualClock, SystemClock};
pub use collect::Collection;
pub use daily::DailyClaim;
pub use error::{EconomyError, SnapshotError, StoreError};
pub use market::Purchase;
pub use model::{AchievementKind, EconomyModel, UpgradeKind, UpgradeState};
pub use progress::TickOutcome;
pub use scheduler::Ticker;
pub use session::{Origin, Session};
pub use store::{JsonFileStore, MemoryStore, SnapshotStore};
pub use view::{Countdown, Dashboard};
