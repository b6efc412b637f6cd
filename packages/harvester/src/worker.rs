//! A single worker: one browser context, one job at a time.

use indicatif::ProgressBar;
use rand::Rng;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::cache::ContactCache;
use crate::clock::{SessionClock, StopReason, StopSignal};
use crate::input::validate_job_url;
use crate::pipeline;
use crate::queue::{RetryPolicy, WorkQueue};
use crate::sink::Sink;
use crate::traits::browser::{Browser, BrowserContext};
use crate::types::config::HarvestConfig;
use crate::types::job::Job;
use crate::types::stats::SessionStats;

/// Shared structures handed to every worker at construction.
#[derive(Clone)]
pub struct WorkerDeps {
    pub queue: Arc<WorkQueue>,
    pub cache: Arc<ContactCache>,
    pub stats: Arc<SessionStats>,
    pub clock: Arc<SessionClock>,
    pub stop: StopSignal,
    pub sink: Arc<Sink>,
    pub config: Arc<HarvestConfig>,
    pub progress: ProgressBar,
}

/// How a worker's loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerExit {
    /// Nothing left to dequeue
    Drained,
    /// Stop flag observed (set by this worker or another)
    Stopped,
    /// Context could not be created; the worker never ran a job
    LaunchFailed,
}

/// Summary returned when a worker task finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerReport {
    pub id: usize,
    pub jobs: u64,
    pub exit: WorkerExit,
}

pub struct Worker {
    id: usize,
    deps: WorkerDeps,
    retry: RetryPolicy,
}

impl Worker {
    pub fn new(id: usize, deps: WorkerDeps) -> Self {
        let retry = RetryPolicy::new(deps.config.max_attempts);
        Self { id, deps, retry }
    }

    /// Drive the loop until the queue drains or a stop is requested.
    pub async fn run(self, browser: Arc<dyn Browser>) -> WorkerReport {
        let context = match browser.new_context(&self.deps.config.context).await {
            Ok(context) => context,
            Err(e) => {
                error!(worker = self.id, error = %e, "Could not create browser context, worker exiting");
                return self.report(0, WorkerExit::LaunchFailed);
            }
        };
        debug!(worker = self.id, "Worker started");

        let mut jobs = 0;
        let exit = loop {
            if self.deps.stop.is_stopped() {
                break WorkerExit::Stopped;
            }
            if self.deps.clock.expired() {
                warn!(worker = self.id, elapsed = ?self.deps.clock.elapsed(), "Session limit reached, stopping");
                self.deps.stop.stop(StopReason::SessionExpired);
                break WorkerExit::Stopped;
            }
            let Some(job) = self.deps.queue.dequeue() else {
                break WorkerExit::Drained;
            };

            let span = info_span!("job", worker = self.id, url = %job.url, attempt = job.attempt);
            self.process(context.as_ref(), &job).instrument(span).await;

            self.deps.queue.mark_done(&job);
            self.deps.progress.inc(1);
            jobs += 1;

            self.pause().await;
        };

        if let Err(e) = context.close().await {
            debug!(worker = self.id, error = %e, "Failed to close browser context");
        }
        debug!(worker = self.id, jobs, exit = ?exit, "Worker finished");
        self.report(jobs, exit)
    }

    /// Settle one job: exactly one of `processed` or `errors` moves.
    async fn process(&self, context: &dyn BrowserContext, job: &Job) {
        let stats = &self.deps.stats;

        if let Err(e) = validate_job_url(&job.url) {
            error!(error = %e, "Invalid input, skipping");
            stats.record_error();
            return;
        }

        match pipeline::extract_listing(context, job, &self.deps.cache, &self.deps.config).await {
            Ok(record) => {
                if record.email().is_found() {
                    stats.record_email();
                }
                if record.contact.social.any_found() {
                    stats.record_social();
                }

                match self.deps.sink.write(&record).await {
                    Ok(()) => self.deps.sink.mark_completed(&job.url),
                    Err(e) => {
                        error!(error = %e, "Failed to write row");
                        stats.record_write_failure();
                    }
                }

                stats.record_processed();
                info!(name = %record.name, email = %record.email(), "Processed");
            }
            Err(e) if e.is_retryable() => {
                error!(error = %e, "Timeout on listing");
                stats.record_error();
                if self.retry.apply(&self.deps.queue, job) {
                    self.deps.progress.inc_length(1);
                }
            }
            Err(e) => {
                error!(error = %e, "Unexpected failure on listing");
                stats.record_error();
            }
        }
    }

    /// Politeness delay. Cut short if a stop is requested meanwhile.
    async fn pause(&self) {
        let delay = jitter(self.deps.config.delay_min_ms, self.deps.config.delay_max_ms);
        if delay.is_zero() {
            return;
        }
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = self.deps.stop.stopped() => {}
        }
    }

    fn report(&self, jobs: u64, exit: WorkerExit) -> WorkerReport {
        WorkerReport {
            id: self.id,
            jobs,
            exit,
        }
    }
}

/// Uniform random delay in `[min_ms, max_ms]`.
pub fn jitter(min_ms: u64, max_ms: u64) -> Duration {
    if max_ms <= min_ms {
        return Duration::from_millis(min_ms);
    }
    Duration::from_millis(rand::thread_rng().gen_range(min_ms..=max_ms))
}
