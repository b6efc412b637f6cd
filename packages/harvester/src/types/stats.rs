//! Session-wide counters.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic counters shared by every worker.
///
/// There is no decrement and no reset; a snapshot is taken for reporting.
#[derive(Debug, Default)]
pub struct SessionStats {
    processed: AtomicU64,
    errors: AtomicU64,
    emails_found: AtomicU64,
    social_found: AtomicU64,
    write_failures: AtomicU64,
}

/// Point-in-time copy of [`SessionStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StatsSnapshot {
    pub processed: u64,
    pub errors: u64,
    pub emails_found: u64,
    pub social_found: u64,
    /// Records extracted but not confirmed by the output store
    pub write_failures: u64,
}

impl StatsSnapshot {
    /// Every dequeued job lands in exactly one of these two.
    pub fn settled(&self) -> u64 {
        self.processed + self.errors
    }
}

impl SessionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_processed(&self) {
        self.processed.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_email(&self) {
        self.emails_found.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_social(&self) {
        self.social_found.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_write_failure(&self) {
        self.write_failures.fetch_add(1, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            processed: self.processed.load(Ordering::SeqCst),
            errors: self.errors.load(Ordering::SeqCst),
            emails_found: self.emails_found.load(Ordering::SeqCst),
            social_found: self.social_found.load(Ordering::SeqCst),
            write_failures: self.write_failures.load(Ordering::SeqCst),
        }
    }
}
