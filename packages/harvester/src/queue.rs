//! Work queue and retry policy.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::types::job::Job;

/// Shared FIFO of pending jobs.
///
/// `dequeue` never waits: an empty queue means the worker is done.
#[derive(Debug, Default)]
pub struct WorkQueue {
    pending: Mutex<VecDeque<Job>>,
    in_flight: AtomicU64,
    dequeued: AtomicU64,
    acknowledged: AtomicU64,
}

impl WorkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from an iterator of jobs.
    pub fn from_jobs(jobs: impl IntoIterator<Item = Job>) -> Self {
        Self {
            pending: Mutex::new(jobs.into_iter().collect()),
            ..Default::default()
        }
    }

    pub fn enqueue(&self, job: Job) {
        self.lock().push_back(job);
    }

    /// Take the next job, or `None` right away if there is none.
    pub fn dequeue(&self) -> Option<Job> {
        let job = self.lock().pop_front()?;
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        self.dequeued.fetch_add(1, Ordering::SeqCst);
        Some(job)
    }

    /// Acknowledge a dequeued job, whatever its outcome.
    pub fn mark_done(&self, _job: &Job) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.acknowledged.fetch_add(1, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Jobs dequeued but not yet acknowledged.
    pub fn in_flight(&self) -> u64 {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Total dequeues over the session, retries included.
    pub fn dequeued_total(&self) -> u64 {
        self.dequeued.load(Ordering::SeqCst)
    }

    pub fn acknowledged_total(&self) -> u64 {
        self.acknowledged.load(Ordering::SeqCst)
    }

    /// Jobs still waiting plus jobs in flight.
    pub fn unfinished(&self) -> u64 {
        self.len() as u64 + self.in_flight()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<Job>> {
        // Poisoning is ignored: push/pop never leave the deque half-updated.
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// What to do with a job after a retryable failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Put this job back on the queue
    Retry(Job),
    /// Ceiling reached; drop it
    GiveUp,
}

/// Fixed-ceiling retry policy with no backoff beyond the normal jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 3 }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn decide(&self, failed: &Job) -> RetryDecision {
        let next = failed.retry();
        if next.attempt < self.max_attempts {
            RetryDecision::Retry(next)
        } else {
            RetryDecision::GiveUp
        }
    }

    /// Apply the decision to `queue`. Returns whether the job was re-enqueued.
    pub fn apply(&self, queue: &WorkQueue, failed: &Job) -> bool {
        match self.decide(failed) {
            RetryDecision::Retry(next) => {
                tracing::info!(url = %next.url, attempt = next.attempt + 1, "Re-enqueueing after timeout");
                queue.enqueue(next);
                true
            }
            RetryDecision::GiveUp => {
                tracing::error!(url = %failed.url, attempts = self.max_attempts, "Max attempts reached, dropping job");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_fifo_and_nonblocking_dequeue() {
        let queue = WorkQueue::from_jobs([Job::new("a"), Job::new("b")]);
        assert_eq!(queue.dequeue().unwrap().url, "a");
        assert_eq!(queue.dequeue().unwrap().url, "b");
        assert!(queue.dequeue().is_none());
        assert_eq!(queue.dequeued_total(), 2);
        assert_eq!(queue.in_flight(), 2);
    }

    #[test]
    fn test_mark_done_tracks_in_flight() {
        let queue = WorkQueue::from_jobs([Job::new("a")]);
        let job = queue.dequeue().unwrap();
        assert_eq!(queue.unfinished(), 1);
        queue.mark_done(&job);
        assert_eq!(queue.unfinished(), 0);
        assert_eq!(queue.acknowledged_total(), 1);
    }

    #[test]
    fn test_retry_until_ceiling() {
        let policy = RetryPolicy::new(3);
        let fresh = Job::new("https://maps.example/A");

        let RetryDecision::Retry(second) = policy.decide(&fresh) else {
            panic!("first failure should retry");
        };
        assert_eq!(second.attempt, 1);

        let RetryDecision::Retry(third) = policy.decide(&second) else {
            panic!("second failure should retry");
        };
        assert_eq!(third.attempt, 2);

        assert_eq!(policy.decide(&third), RetryDecision::GiveUp);
    }

    #[test]
    fn test_apply_requeues_at_the_back() {
        let queue = WorkQueue::from_jobs([Job::new("a"), Job::new("b")]);
        let policy = RetryPolicy::default();

        let a = queue.dequeue().unwrap();
        assert!(policy.apply(&queue, &a));
        queue.mark_done(&a);

        assert_eq!(queue.dequeue().unwrap().url, "b");
        let again = queue.dequeue().unwrap();
        assert_eq!(again.url, "a");
        assert_eq!(again.attempt, 1);
    }

    #[test]
    fn test_single_attempt_policy_never_retries() {
        let policy = RetryPolicy::new(1);
        assert_eq!(policy.decide(&Job::new("a")), RetryDecision::GiveUp);
    }

    #[test]
    fn test_concurrent_drain_sees_each_job_once() {
        let queue = Arc::new(WorkQueue::from_jobs((0..500).map(|i| Job::new(i.to_string()))));
        let handles: Vec<_> = (0..6)
            .map(|_| {
                let queue = queue.clone();
                std::thread::spawn(move || {
                    let mut seen = Vec::new();
                    while let Some(job) = queue.dequeue() {
                        queue.mark_done(&job);
                        seen.push(job.url);
                    }
                    seen
                })
            })
            .collect();

        let mut all: Vec<String> = handles.into_iter().flat_map(|h| h.join().unwrap()).collect();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), 500);
        assert_eq!(queue.acknowledged_total(), 500);
    }
}
