//! Session clock and cooperative stop coordination.

use chrono::{DateTime, Local};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Fixed-budget wall clock, started once before workers launch.
///
/// Once `expired()` returns true it keeps returning true.
#[derive(Debug)]
pub struct SessionClock {
    started: Instant,
    started_at: DateTime<Local>,
    limit: Duration,
    tripped: AtomicBool,
}

impl SessionClock {
    /// Start the clock now.
    pub fn start(limit: Duration) -> Self {
        Self {
            started: Instant::now(),
            started_at: Local::now(),
            limit,
            tripped: AtomicBool::new(false),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }

    /// Wall-clock time at which the session will auto-stop.
    pub fn deadline(&self) -> DateTime<Local> {
        let limit = chrono::Duration::from_std(self.limit).unwrap_or(chrono::Duration::MAX);
        self.started_at
            .checked_add_signed(limit)
            .unwrap_or(self.started_at)
    }

    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    pub fn expired(&self) -> bool {
        if self.tripped.load(Ordering::Acquire) {
            return true;
        }
        if self.elapsed() >= self.limit {
            self.tripped.store(true, Ordering::Release);
            return true;
        }
        false
    }
}

/// Why the pool was asked to stop early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The session clock ran out
    SessionExpired,
    /// The user interrupted the process
    Interrupted,
}

/// The one flag every worker both reads and writes.
///
/// Stopping is cooperative: workers check it at the top of each loop
/// iteration. The first reason recorded wins.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    token: CancellationToken,
    reason: Arc<OnceLock<StopReason>>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a stop. Later calls keep the first reason.
    pub fn stop(&self, reason: StopReason) {
        let _ = self.reason.set(reason);
        self.token.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn reason(&self) -> Option<StopReason> {
        self.reason.get().copied()
    }

    /// Resolves once a stop has been requested.
    pub async fn stopped(&self) {
        self.token.cancelled().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_limit_is_expired_immediately() {
        let clock = SessionClock::start(Duration::ZERO);
        assert!(clock.expired());
    }

    #[test]
    fn test_long_limit_is_not_expired() {
        let clock = SessionClock::start(Duration::from_secs(7200));
        assert!(!clock.expired());
        assert!(clock.deadline() > clock.started_at());
    }

    #[test]
    fn test_expiry_latches() {
        let clock = SessionClock::start(Duration::from_millis(10));
        std::thread::sleep(Duration::from_millis(20));
        assert!(clock.expired());
        assert!(clock.expired());
    }

    #[test]
    fn test_first_stop_reason_wins() {
        let signal = StopSignal::new();
        let seen_by_worker = signal.clone();
        assert!(!seen_by_worker.is_stopped());

        signal.stop(StopReason::SessionExpired);
        signal.stop(StopReason::Interrupted);

        assert!(seen_by_worker.is_stopped());
        assert_eq!(seen_by_worker.reason(), Some(StopReason::SessionExpired));
    }

    #[tokio::test]
    async fn test_stopped_resolves_after_stop() {
        let signal = StopSignal::new();
        let waiter = signal.clone();
        let handle = tokio::spawn(async move { waiter.stopped().await });

        signal.stop(StopReason::Interrupted);
        handle.await.unwrap();
    }
}
