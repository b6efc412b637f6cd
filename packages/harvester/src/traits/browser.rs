//! Automation engine seam.
//!
//! A [`Browser`] hands out isolated [`BrowserContext`]s (one per worker),
//! each of which opens [`Page`]s. Every call may fail with a timeout or a
//! navigation error; callers decide whether that is fatal.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

use crate::error::BrowserResult;
use crate::types::config::ContextOptions;

/// When `goto` is considered finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaitPolicy {
    /// DOM parsed; subresources may still be loading
    #[default]
    DomContentLoaded,
    /// Full load event
    Load,
}

/// Snapshot of a matched DOM element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    text: String,
    attributes: HashMap<String, String>,
}

impl Element {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attributes: HashMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn text_content(&self) -> &str {
        &self.text
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Shorthand for `attribute("href")`.
    pub fn href(&self) -> Option<&str> {
        self.attribute("href")
    }
}

/// An automation engine capable of creating isolated contexts.
#[async_trait]
pub trait Browser: Send + Sync {
    /// Create a context with its own cookies and storage.
    async fn new_context(&self, options: &ContextOptions) -> BrowserResult<Box<dyn BrowserContext>>;
}

/// An isolated browsing context, owned by exactly one worker.
#[async_trait]
pub trait BrowserContext: Send + Sync {
    /// Open a blank page.
    async fn new_page(&self) -> BrowserResult<Box<dyn Page>>;

    /// Release the context and every page it still owns.
    async fn close(&self) -> BrowserResult<()>;
}

/// A single tab.
#[async_trait]
pub trait Page: Send + Sync {
    /// Navigate, waiting according to `wait`.
    async fn goto(&mut self, url: &str, wait: WaitPolicy) -> BrowserResult<()>;

    /// Set the default timeout for subsequent navigations on this page.
    fn set_default_timeout(&mut self, timeout: Duration);

    /// URL of the currently loaded document.
    fn current_url(&self) -> Option<String>;

    /// First element matching `selector`, waiting up to `timeout`.
    ///
    /// `Ok(None)` means nothing matched; engines that wait for elements
    /// report a timeout as an error instead.
    async fn query_selector(&self, selector: &str, timeout: Duration)
        -> BrowserResult<Option<Element>>;

    /// Every element currently matching `selector`.
    async fn all_matching(&self, selector: &str) -> BrowserResult<Vec<Element>>;

    /// Click the first element matching `selector`.
    async fn click(&self, selector: &str, timeout: Duration) -> BrowserResult<()>;

    /// Markup of the rendered document.
    async fn rendered_text(&self) -> BrowserResult<String>;

    /// Close the page. Safe to call more than once.
    async fn close(&mut self) -> BrowserResult<()>;
}
