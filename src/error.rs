//! Error types for the economy engine and its persistence boundary.

use chrono::NaiveDate;
use thiserror::Error;

/// Rejected economic actions. None of these change the model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EconomyError {
    #[error("mining is not ready: {progress:.0}% complete")]
    NotReady { progress: f64 },

    #[error("insufficient funds: cost {cost}, balance {balance}")]
    InsufficientFunds { cost: f64, balance: f64 },

    #[error("daily bonus already claimed on {date}")]
    AlreadyClaimed { date: NaiveDate },
}

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("malformed snapshot: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
