//! Worker pool and session driver.
//!
//! A session seeds the queue, starts the clock, spawns one task per worker
//! and waits for every task to return. Nothing is aborted: early stops are
//! cooperative, so in-flight jobs always finish.

use indicatif::ProgressBar;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::cache::ContactCache;
use crate::clock::{SessionClock, StopReason, StopSignal};
use crate::queue::WorkQueue;
use crate::sink::Sink;
use crate::stores::DedupStore;
use crate::traits::browser::Browser;
use crate::types::config::HarvestConfig;
use crate::types::job::Job;
use crate::types::stats::{SessionStats, StatsSnapshot};
use crate::worker::{Worker, WorkerDeps, WorkerExit, WorkerReport};

/// Fresh jobs for every URL not already completed for this project.
///
/// Duplicates within `urls` are kept, matching the input sheet.
pub fn seed_jobs<S: AsRef<str>>(urls: &[S], dedup: &DedupStore) -> Vec<Job> {
    urls.iter()
        .map(|url| url.as_ref())
        .filter(|url| !dedup.contains(url))
        .map(Job::new)
        .collect()
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionOutcome {
    /// Every worker found the queue empty
    Completed,
    /// The session clock ran out
    AutoStopped,
    /// The user interrupted the run
    Interrupted,
    /// No worker could create a browser context; jobs were left untouched
    NoWorkers,
}

impl From<Option<StopReason>> for SessionOutcome {
    fn from(reason: Option<StopReason>) -> Self {
        match reason {
            None => SessionOutcome::Completed,
            Some(StopReason::SessionExpired) => SessionOutcome::AutoStopped,
            Some(StopReason::Interrupted) => SessionOutcome::Interrupted,
        }
    }
}

/// Everything known once the pool has joined.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub session_id: Uuid,
    pub outcome: SessionOutcome,
    pub stats: StatsSnapshot,
    /// Jobs handed out, retries included
    pub dequeued: u64,
    /// Jobs still waiting when the pool stopped
    pub remaining: u64,
    /// Workers that ran at least their loop (context created)
    pub workers_started: usize,
    /// How each worker's loop ended, in join order
    pub worker_exits: Vec<WorkerExit>,
    /// Distinct website domains mined
    pub domains_mined: usize,
    pub elapsed: Duration,
}

/// Fixed-size pool sharing one queue, cache, clock and sink.
pub struct WorkerPool {
    browser: Arc<dyn Browser>,
    config: Arc<HarvestConfig>,
    sink: Arc<Sink>,
    stop: StopSignal,
    progress: ProgressBar,
}

impl WorkerPool {
    pub fn new(browser: Arc<dyn Browser>, config: HarvestConfig, sink: Arc<Sink>) -> Self {
        Self {
            browser,
            config: Arc::new(config),
            sink,
            stop: StopSignal::new(),
            progress: ProgressBar::hidden(),
        }
    }

    /// Advance `progress` once per settled job.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Share a stop signal created before the pool, e.g. by a signal handler.
    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    /// Handle for requesting an early stop from outside the pool.
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    /// Run one session over `jobs` and wait for every worker.
    pub async fn run(&self, jobs: Vec<Job>) -> SessionReport {
        let session_id = Uuid::now_v7();
        let span = info_span!("session", id = %session_id);
        self.run_session(session_id, jobs).instrument(span).await
    }

    async fn run_session(&self, session_id: Uuid, jobs: Vec<Job>) -> SessionReport {
        let clock = Arc::new(SessionClock::start(self.config.session_limit()));
        let stats = Arc::new(SessionStats::new());
        let cache = Arc::new(ContactCache::new());
        let worker_count = self.config.workers.min(jobs.len());
        let queue = Arc::new(WorkQueue::from_jobs(jobs));

        info!(
            workers = worker_count,
            jobs = queue.len(),
            deadline = %clock.deadline().format("%H:%M:%S"),
            "Starting session"
        );

        let deps = WorkerDeps {
            queue: queue.clone(),
            cache: cache.clone(),
            stats: stats.clone(),
            clock: clock.clone(),
            stop: self.stop.clone(),
            sink: self.sink.clone(),
            config: self.config.clone(),
            progress: self.progress.clone(),
        };

        let handles: Vec<_> = (0..worker_count)
            .map(|id| {
                let worker = Worker::new(id, deps.clone());
                tokio::spawn(worker.run(self.browser.clone()).in_current_span())
            })
            .collect();

        let mut reports: Vec<WorkerReport> = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok(report) => reports.push(report),
                Err(e) => error!(error = %e, "Worker task failed"),
            }
        }

        let worker_exits: Vec<WorkerExit> = reports.iter().map(|r| r.exit).collect();
        let workers_started = worker_exits
            .iter()
            .filter(|exit| **exit != WorkerExit::LaunchFailed)
            .count();
        let remaining = queue.unfinished();

        let outcome = match self.stop.reason() {
            None if workers_started == 0 && remaining > 0 => {
                warn!(remaining, "No worker could start, nothing was processed");
                SessionOutcome::NoWorkers
            }
            reason => SessionOutcome::from(reason),
        };

        let report = SessionReport {
            session_id,
            outcome,
            stats: stats.snapshot(),
            dequeued: queue.dequeued_total(),
            remaining,
            workers_started,
            worker_exits,
            domains_mined: cache.len(),
            elapsed: clock.elapsed(),
        };

        info!(
            outcome = ?report.outcome,
            processed = report.stats.processed,
            errors = report.stats.errors,
            remaining = report.remaining,
            "Session finished"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::MemoryWorkbook;
    use crate::testing::MockBrowser;
    use crate::traits::sheet::Workbook;
    use crate::types::record::HEADERS;

    #[test]
    fn test_outcome_follows_stop_reason() {
        assert_eq!(SessionOutcome::from(None), SessionOutcome::Completed);
        assert_eq!(
            SessionOutcome::from(Some(StopReason::SessionExpired)),
            SessionOutcome::AutoStopped
        );
        assert_eq!(
            SessionOutcome::from(Some(StopReason::Interrupted)),
            SessionOutcome::Interrupted
        );
    }

    #[test]
    fn test_seed_skips_completed_urls() {
        let dir = tempfile::tempdir().unwrap();
        let dedup = DedupStore::open(dir.path(), "roma").unwrap();
        dedup.record("https://maps.example/B").unwrap();

        let urls = ["https://maps.example/A", "https://maps.example/B", "https://maps.example/C"];
        let jobs = seed_jobs(&urls[..], &dedup);

        assert_eq!(jobs.len(), urls.len() - 1);
        assert!(jobs.iter().all(|j| j.attempt == 0 && j.url != "https://maps.example/B"));
    }

    #[tokio::test]
    async fn test_empty_session_completes_without_workers() {
        let dir = tempfile::tempdir().unwrap();
        let book = Arc::new(MemoryWorkbook::new());
        book.create_tab("roma", &HEADERS).await.unwrap();
        let dedup = Arc::new(DedupStore::open(dir.path(), "roma").unwrap());
        let sink = Arc::new(Sink::new(book, "roma", dedup));
        let browser = MockBrowser::new();

        let pool = WorkerPool::new(Arc::new(browser.clone()), HarvestConfig::new(), sink);
        let report = pool.run(Vec::new()).await;

        assert_eq!(report.outcome, SessionOutcome::Completed);
        assert_eq!(report.workers_started, 0);
        assert_eq!(browser.contexts_created(), 0);
    }

    #[tokio::test]
    async fn test_launch_failure_everywhere_is_not_completion() {
        let dir = tempfile::tempdir().unwrap();
        let book = Arc::new(MemoryWorkbook::new());
        book.create_tab("roma", &HEADERS).await.unwrap();
        let dedup = Arc::new(DedupStore::open(dir.path(), "roma").unwrap());
        let sink = Arc::new(Sink::new(book, "roma", dedup));
        let browser = MockBrowser::new().fail_contexts(2);

        let urls = ["https://maps.example/A", "https://maps.example/B", "https://maps.example/C"];
        let pool = WorkerPool::new(
            Arc::new(browser),
            HarvestConfig::new().with_workers(2).without_delay(),
            sink,
        );
        let report = pool.run(urls.iter().map(|u| Job::new(*u)).collect()).await;

        assert_eq!(report.outcome, SessionOutcome::NoWorkers);
        assert_eq!(report.workers_started, 0);
        assert_eq!(report.worker_exits, vec![WorkerExit::LaunchFailed; 2]);
        assert_eq!(report.remaining, 3);
        assert_eq!(report.dequeued, 0);
    }
}
