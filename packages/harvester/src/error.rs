//! Typed errors for the harvester library.
//!
//! Uses `thiserror` for library errors (not `anyhow`); the binary wraps
//! these with context at the setup boundary.

use thiserror::Error;

/// Errors raised by an automation engine.
#[derive(Debug, Error)]
pub enum BrowserError {
    /// Navigation or wait exceeded its timeout
    #[error("timeout loading: {url}")]
    Timeout { url: String },

    /// Navigation failed for any other reason (DNS, TLS, HTTP status)
    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    /// Selector could not be parsed by the engine
    #[error("invalid selector: {0}")]
    InvalidSelector(String),

    /// Selector matched nothing within its timeout
    #[error("no element matches: {0}")]
    NotFound(String),

    /// Page has not navigated anywhere yet, or was closed
    #[error("page has no document loaded")]
    NoDocument,

    /// Session or context could not be created
    #[error("failed to launch browser session: {0}")]
    Launch(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl BrowserError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, BrowserError::Timeout { .. })
    }
}

/// Errors that end a single job.
#[derive(Debug, Error)]
pub enum JobError {
    /// Job URL failed syntactic validation
    #[error("invalid job url: {url}")]
    InvalidUrl { url: String },

    /// The automation engine failed on the primary listing page
    #[error(transparent)]
    Browser(#[from] BrowserError),
}

impl JobError {
    /// Only a timeout on the primary listing navigation is worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, JobError::Browser(e) if e.is_timeout())
    }
}

/// Errors from the spreadsheet adapters and the dedup log.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("worksheet not found: {0}")]
    TabNotFound(String),

    #[error("worksheet already exists: {0}")]
    TabExists(String),

    /// The backing store refused the write
    #[error("write rejected: {0}")]
    Rejected(String),
}

/// Errors from the notification channel.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("telegram: {0}")]
    Telegram(#[from] telegram::TelegramError),

    #[error("notification channel unavailable: {0}")]
    Unavailable(String),
}

/// Setup-level errors surfaced to the entry point.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("invalid project name: {0:?}")]
    InvalidProject(String),
}

/// Result type alias for setup operations.
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for automation calls.
pub type BrowserResult<T> = std::result::Result<T, BrowserError>;

/// Result type alias for job execution.
pub type JobResult<T> = std::result::Result<T, JobError>;

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
