/// Scheduled wakeups with cancellation
///
/// The playback loop suspends only through [`Clock::sleep`]. A real clock
/// blocks its thread until the period elapses or its [`Shutdown`] token is
/// cancelled; tests substitute a scripted clock.
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    Elapsed,
    Cancelled,
}

pub trait Clock: Send {
    fn sleep(&mut self, period: Duration) -> Wake;
}

/// Cancellation token paired with a [`ThreadClock`]
#[derive(Debug)]
pub struct Shutdown {
    tx: Sender<()>,
}

impl Shutdown {
    /// Wakes the paired clock; every later sleep returns `Cancelled` at once.
    pub fn cancel(self) {
        drop(self.tx);
    }
}

#[derive(Debug)]
pub struct ThreadClock {
    cancel: Receiver<()>,
}

impl Clock for ThreadClock {
    fn sleep(&mut self, period: Duration) -> Wake {
        match self.cancel.recv_timeout(period) {
            Err(RecvTimeoutError::Timeout) => Wake::Elapsed,
            Ok(()) | Err(RecvTimeoutError::Disconnected) => Wake::Cancelled,
        }
    }
}

pub fn cancellable() -> (Shutdown, ThreadClock) {
    let (tx, rx) = bounded(0);
    (Shutdown { tx }, ThreadClock { cancel: rx })
}
