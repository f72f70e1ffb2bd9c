use std::path::PathBuf;
use std::time::Duration;

use marmalade::scheduler::DEFAULT_TICK;

const SAVE_VAR: &str = "MARMALADE_SAVE";
const LOG_VAR: &str = "MARMALADE_LOG";
const TICK_VAR: &str = "MARMALADE_TICK_MS";

const DEFAULT_SAVE_PATH: &str = "marmalade-save.json";
const DEFAULT_LOG_PATH: &str = "marmalade.log";
const MIN_TICK_MS: u64 = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct ShellConfig {
    pub save_path: PathBuf,
    pub log_path: PathBuf,
    pub tick_rate: Duration,
    /// Problems found while reading the environment. Reported once logging
    /// is up, since the log path itself comes from here.
    pub warnings: Vec<String>,
}

impl ShellConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let save_path = lookup(SAVE_VAR)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SAVE_PATH.to_string());
        let log_path = lookup(LOG_VAR)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_PATH.to_string());

        let mut warnings = Vec::new();
        let tick_rate = match lookup(TICK_VAR) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(ms) => Duration::from_millis(ms.max(MIN_TICK_MS)),
                Err(_) => {
                    warnings.push(format!(
                        "{}={:?} is not a number of milliseconds; using default",
                        TICK_VAR, raw
                    ));
                    DEFAULT_TICK
                }
            },
            None => DEFAULT_TICK,
        };

        Self {
            save_path: PathBuf::from(save_path),
            log_path: PathBuf::from(log_path),
            tick_rate,
            warnings,
        }
    }
}
