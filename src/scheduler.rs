//! Periodic tick source.
//!
//! The ticker thread only sends events; whoever owns the `Session` receives
//! them and calls `tick` on its own thread, so every action runs to
//! completion before the next one starts.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, warn};

/// Default cadence; a 3-hour cycle needs no more than one-second resolution.
pub const DEFAULT_TICK: Duration = Duration::from_secs(1);

pub struct Ticker {
    cancelled: Arc<AtomicBool>,
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    /// Sends a clone of `event` every `interval` until cancelled or the
    /// receiver is dropped.
    pub fn spawn<E>(interval: Duration, tx: Sender<E>, event: E) -> Self
    where
        E: Clone + Send + 'static,
    {
        let cancelled = Arc::new(AtomicBool::new(false));
        let (stop, stop_rx) = mpsc::channel::<()>();
        let handle = thread::spawn(move || {
            while let Err(RecvTimeoutError::Timeout) = stop_rx.recv_timeout(interval) {
                if tx.send(event.clone()).is_err() {
                    break;
                }
            }
            debug!("ticker stopped");
        });

        Self {
            cancelled,
            stop: Some(stop),
            handle: Some(handle),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Stops the ticker and waits for its thread to exit. At most one more
    /// event may already be queued.
    pub fn cancel(&mut self) {
        self.cancelled.store(true, Ordering::Release);
        // Dropping the sender disconnects the channel, which ends the wait.
        self.stop.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("ticker thread panicked");
            }
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Instant;

    #[test]
    fn delivers_ticks_until_cancelled() {
        let (tx, rx) = mpsc::channel();
        let mut ticker = Ticker::spawn(Duration::from_millis(5), tx, 7u8);

        for _ in 0..3 {
            assert_eq!(rx.recv_timeout(Duration::from_secs(2)), Ok(7));
        }

        ticker.cancel();
        assert!(ticker.is_cancelled());
        // The sender is gone once the thread exits, so the channel drains and closes.
        while rx.recv_timeout(Duration::from_secs(2)).is_ok() {}
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn cancel_does_not_wait_out_the_interval() {
        let (tx, _rx) = mpsc::channel::<()>();
        let mut ticker = Ticker::spawn(Duration::from_secs(60), tx, ());
        let started = Instant::now();
        ticker.cancel();
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn stops_when_receiver_dropped() {
        let (tx, rx) = mpsc::channel::<()>();
        let mut ticker = Ticker::spawn(Duration::from_millis(1), tx, ());
        drop(rx);
        // Joins without hanging because send fails.
        ticker.cancel();
    }
}
