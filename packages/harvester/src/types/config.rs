//! Configuration types for the extraction pool.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Hard ceiling on the pool size, whatever the machine offers.
pub const MAX_WORKERS: usize = 6;

/// Default pool size: half the available parallelism, clamped to `2..=6`.
pub fn default_worker_count() -> usize {
    let cpus = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(2);
    (cpus / 2).clamp(2, MAX_WORKERS)
}

/// Configuration for one harvesting session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestConfig {
    /// Number of workers, each with its own browser context.
    pub workers: usize,

    /// Total attempts per job before it is dropped. Default: 3.
    pub max_attempts: u32,

    /// Lower bound of the jittered delay after every job, in milliseconds.
    pub delay_min_ms: u64,

    /// Upper bound of the jittered delay after every job, in milliseconds.
    pub delay_max_ms: u64,

    /// Wall-clock budget for the whole session, in milliseconds. Default: 2 hours.
    pub session_limit_ms: u64,

    /// Timeout for the primary listing navigation.
    pub navigation_timeout_ms: u64,

    /// Per-field lookup timeout on the listing page.
    pub field_timeout_ms: u64,

    /// How long to look for a consent dialog before giving up.
    pub consent_timeout_ms: u64,

    /// Default timeout on the auxiliary page used for contact mining.
    pub contact_timeout_ms: u64,

    /// Structural selectors for the listing fields.
    #[serde(default)]
    pub selectors: ListingSelectors,

    /// Buttons that dismiss a cookie/consent dialog, tried in order.
    #[serde(default = "default_consent_selectors")]
    pub consent_selectors: Vec<String>,

    /// Anchor labels that lead to a contact page (case-insensitive).
    #[serde(default = "default_contact_labels")]
    pub contact_labels: Vec<String>,

    /// Options for each worker's browser context.
    #[serde(default)]
    pub context: ContextOptions,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            workers: default_worker_count(),
            max_attempts: 3,
            delay_min_ms: 2_000,
            delay_max_ms: 5_000,
            session_limit_ms: 2 * 60 * 60 * 1_000,
            navigation_timeout_ms: 30_000,
            field_timeout_ms: 3_000,
            consent_timeout_ms: 2_500,
            contact_timeout_ms: 12_000,
            selectors: ListingSelectors::default(),
            consent_selectors: default_consent_selectors(),
            contact_labels: default_contact_labels(),
            context: ContextOptions::default(),
        }
    }
}

impl HarvestConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pool size, clamped to `1..=MAX_WORKERS`.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.clamp(1, MAX_WORKERS);
        self
    }

    /// Set the attempt ceiling (at least one attempt).
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Set the jitter bounds. Bounds are swapped if given backwards.
    pub fn with_delay_ms(mut self, min: u64, max: u64) -> Self {
        self.delay_min_ms = min.min(max);
        self.delay_max_ms = min.max(max);
        self
    }

    /// Disable the politeness delay (tests, local fixtures).
    pub fn without_delay(self) -> Self {
        self.with_delay_ms(0, 0)
    }

    pub fn with_session_limit(mut self, limit: Duration) -> Self {
        self.session_limit_ms = limit.as_millis() as u64;
        self
    }

    pub fn with_navigation_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_selectors(mut self, selectors: ListingSelectors) -> Self {
        self.selectors = selectors;
        self
    }

    pub fn session_limit(&self) -> Duration {
        Duration::from_millis(self.session_limit_ms)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    pub fn field_timeout(&self) -> Duration {
        Duration::from_millis(self.field_timeout_ms)
    }

    pub fn consent_timeout(&self) -> Duration {
        Duration::from_millis(self.consent_timeout_ms)
    }

    pub fn contact_timeout(&self) -> Duration {
        Duration::from_millis(self.contact_timeout_ms)
    }
}

/// CSS selectors for the fields of a map listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingSelectors {
    pub name: String,
    pub category: String,
    pub address: String,
    pub phone: String,
    /// Anchor whose `href` is the business website
    pub website: String,
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self {
            name: "h1.DUwDvf".to_string(),
            category: "button[jsaction*='pane.wfvdle17.category']".to_string(),
            address: "button[data-item-id='address'] div.Io6YTe".to_string(),
            phone: "button[aria-label*='Telefono'] div.Io6YTe, button[aria-label*='tel:'] div.Io6YTe"
                .to_string(),
            website: "a[aria-label*='Sito web'], a[aria-label*='sito web']".to_string(),
        }
    }
}

/// Per-context browser options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextOptions {
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub locale: String,
    pub user_agent: String,
    pub headless: bool,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            viewport_width: 1366,
            viewport_height: 900,
            locale: "it-IT".to_string(),
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/140.0.0.0 Safari/537.36".to_string(),
            headless: true,
        }
    }
}

fn default_consent_selectors() -> Vec<String> {
    ["Accetta", "Accept", "OK"]
        .iter()
        .map(|label| format!("button:has-text('{}')", label))
        .collect()
}

fn default_contact_labels() -> Vec<String> {
    vec!["Contatti".to_string(), "Contact".to_string()]
}
