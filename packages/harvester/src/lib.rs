//! Concurrent Business-Listing Harvester
//!
//! Pulls map-listing URLs from a work queue, reads each listing with an
//! automation engine, and mines every linked business website once for an
//! email address and social profiles. Results go to a spreadsheet tab per
//! project; completed URLs go to a per-project progress log so an
//! interrupted session can resume.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use harvester::{seed_jobs, HarvestConfig, HttpBrowser, Sink, WorkerPool};
//! use harvester::stores::{CsvWorkbook, DedupStore};
//!
//! let workbook = Arc::new(CsvWorkbook::open("out")?);
//! let tab = harvester::project::open_or_create(workbook.as_ref(), "roma").await?;
//! let dedup = Arc::new(DedupStore::open(".".as_ref(), &tab)?);
//! let jobs = seed_jobs(&urls, &dedup);
//!
//! let sink = Arc::new(Sink::new(workbook, tab, dedup));
//! let pool = WorkerPool::new(Arc::new(HttpBrowser::new()), HarvestConfig::default(), sink);
//! let report = pool.run(jobs).await;
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Engine, spreadsheet and notifier seams
//! - [`types`] - Jobs, records, configuration and counters
//! - [`pipeline`] - Per-job listing extraction and contact mining
//! - [`pool`] - Worker pool and session driver
//! - [`stores`] - Dedup log and spreadsheet adapters
//! - [`engines`] - Automation engine implementations
//! - [`testing`] - Mock implementations for testing

pub mod cache;
pub mod clock;
pub mod engines;
pub mod error;
pub mod input;
pub mod notify;
pub mod pipeline;
pub mod pool;
pub mod project;
pub mod queue;
pub mod report;
pub mod sink;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;
pub mod worker;

// Re-export core types at crate root
pub use cache::ContactCache;
pub use clock::{SessionClock, StopReason, StopSignal};
pub use engines::HttpBrowser;
pub use error::{BrowserError, HarvestError, JobError, NotifyError, StoreError};
pub use input::{ingest_urls, site_key, validate_job_url, SiteKey};
pub use notify::{notify_quietly, TelegramNotifier};
pub use pool::{seed_jobs, SessionOutcome, SessionReport, WorkerPool};
pub use project::StartMode;
pub use queue::{RetryDecision, RetryPolicy, WorkQueue};
pub use sink::Sink;
pub use traits::{
    browser::{Browser, BrowserContext, Element, Page, WaitPolicy},
    notifier::Notifier,
    sheet::{InputSource, Workbook},
};
pub use types::{
    config::{ContextOptions, HarvestConfig, ListingSelectors},
    job::Job,
    record::{ContactInfo, ExtractedRecord, Field, SocialKind, SocialLinks, HEADERS, NOT_FOUND},
    stats::{SessionStats, StatsSnapshot},
};
