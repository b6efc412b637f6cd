//! Job - one unit of work in the queue.

use serde::{Deserialize, Serialize};

/// A map-listing URL plus how many times it has already been attempted.
///
/// The URL never changes across retries; only `attempt` moves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Target listing URL
    pub url: String,

    /// Zero for a fresh job, incremented on every re-enqueue
    pub attempt: u32,
}

impl Job {
    /// Create a fresh job.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            attempt: 0,
        }
    }

    /// The follow-up job after a transient failure.
    pub fn retry(&self) -> Self {
        Self {
            url: self.url.clone(),
            attempt: self.attempt + 1,
        }
    }

    /// Whether this is a re-attempt rather than a fresh fetch.
    pub fn is_retry(&self) -> bool {
        self.attempt > 0
    }
}

impl std::fmt::Display for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_retry() {
            write!(f, "{} (attempt {})", self.url, self.attempt + 1)
        } else {
            f.write_str(&self.url)
        }
    }
}
