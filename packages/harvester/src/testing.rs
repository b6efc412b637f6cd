//! Testing utilities including mock implementations.
//!
//! These are useful for exercising the pipeline and the worker pool without
//! launching a real browser or posting real notifications.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::error::{BrowserError, BrowserResult, NotifyError};
use crate::traits::browser::{Browser, BrowserContext, Element, Page, WaitPolicy};
use crate::traits::notifier::Notifier;
use crate::types::config::ContextOptions;

/// Scripted content of one page.
///
/// Selectors are matched verbatim: a query for `h1.title` only finds
/// elements registered under exactly `h1.title`.
#[derive(Debug, Clone, Default)]
pub struct PageFixture {
    elements: HashMap<String, Vec<Element>>,
    text: String,
}

impl PageFixture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an element under a selector.
    pub fn with_element(mut self, selector: impl Into<String>, element: Element) -> Self {
        self.elements.entry(selector.into()).or_default().push(element);
        self
    }

    /// Add an anchor, visible to `a[href]` (and `a[href^='mailto:']` for mail links).
    pub fn with_link(self, href: &str, text: &str) -> Self {
        let anchor = Element::new(text).with_attribute("href", href);
        let fixture = if href.to_lowercase().starts_with("mailto:") {
            self.with_element("a[href^='mailto:']", anchor.clone())
        } else {
            self
        };
        fixture.with_element("a[href]", anchor)
    }

    /// Set the rendered document text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    fn matching(&self, selector: &str) -> Vec<Element> {
        self.elements.get(selector).cloned().unwrap_or_default()
    }
}

/// Record of a call made to the mock browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockBrowserCall {
    NewContext,
    NewPage,
    Goto { url: String },
    Click { selector: String },
    ClosePage,
    CloseContext,
}

#[derive(Debug, Default)]
struct MockState {
    pages: RwLock<HashMap<String, PageFixture>>,
    timeout_urls: RwLock<HashSet<String>>,
    fail_urls: RwLock<HashSet<String>>,
    latency: RwLock<HashMap<String, Duration>>,
    default_latency: RwLock<Duration>,
    query_latency: RwLock<Duration>,
    failing_contexts: AtomicUsize,
    open_pages: AtomicUsize,
    calls: RwLock<Vec<MockBrowserCall>>,
}

impl MockState {
    fn record(&self, call: MockBrowserCall) {
        self.calls.write().unwrap().push(call);
    }

    fn latency_for(&self, url: &str) -> Duration {
        self.latency
            .read()
            .unwrap()
            .get(url)
            .copied()
            .unwrap_or(*self.default_latency.read().unwrap())
    }
}

/// A mock automation engine for testing.
///
/// Cloning shares the scripted pages and the call log.
#[derive(Debug, Clone, Default)]
pub struct MockBrowser {
    state: Arc<MockState>,
}

impl MockBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `fixture` at `url`.
    pub fn with_page(self, url: impl Into<String>, fixture: PageFixture) -> Self {
        self.state.pages.write().unwrap().insert(url.into(), fixture);
        self
    }

    /// Navigation to `url` fails with a timeout.
    pub fn timeout_url(self, url: impl Into<String>) -> Self {
        self.state.timeout_urls.write().unwrap().insert(url.into());
        self
    }

    /// Navigation to `url` fails with a non-timeout error.
    pub fn fail_url(self, url: impl Into<String>) -> Self {
        self.state.fail_urls.write().unwrap().insert(url.into());
        self
    }

    /// Delay every navigation to `url`.
    pub fn with_latency(self, url: impl Into<String>, latency: Duration) -> Self {
        self.state.latency.write().unwrap().insert(url.into(), latency);
        self
    }

    /// Delay every navigation without a specific latency.
    pub fn with_default_latency(self, latency: Duration) -> Self {
        *self.state.default_latency.write().unwrap() = latency;
        self
    }

    /// Delay every `query_selector` call.
    pub fn with_query_latency(self, latency: Duration) -> Self {
        *self.state.query_latency.write().unwrap() = latency;
        self
    }

    /// The next `count` calls to `new_context` fail.
    pub fn fail_contexts(self, count: usize) -> Self {
        self.state.failing_contexts.store(count, Ordering::SeqCst);
        self
    }

    /// Get all calls made to this mock.
    pub fn calls(&self) -> Vec<MockBrowserCall> {
        self.state.calls.read().unwrap().clone()
    }

    /// How many times `url` was navigated to.
    pub fn goto_count(&self, url: &str) -> usize {
        self.state
            .calls
            .read()
            .unwrap()
            .iter()
            .filter(|c| matches!(c, MockBrowserCall::Goto { url: u } if u == url))
            .count()
    }

    /// Pages opened and not yet closed.
    pub fn open_pages(&self) -> usize {
        self.state.open_pages.load(Ordering::SeqCst)
    }

    /// Number of contexts successfully created.
    pub fn contexts_created(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, MockBrowserCall::NewContext))
            .count()
    }
}

#[async_trait]
impl Browser for MockBrowser {
    async fn new_context(&self, _options: &ContextOptions) -> BrowserResult<Box<dyn BrowserContext>> {
        let failing = self
            .state
            .failing_contexts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if failing.is_ok() {
            return Err(BrowserError::Launch("mock context failure".into()));
        }

        self.state.record(MockBrowserCall::NewContext);
        Ok(Box::new(MockContext {
            state: self.state.clone(),
        }))
    }
}

struct MockContext {
    state: Arc<MockState>,
}

#[async_trait]
impl BrowserContext for MockContext {
    async fn new_page(&self) -> BrowserResult<Box<dyn Page>> {
        self.state.record(MockBrowserCall::NewPage);
        self.state.open_pages.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockPage {
            state: self.state.clone(),
            url: None,
            fixture: None,
            closed: false,
        }))
    }

    async fn close(&self) -> BrowserResult<()> {
        self.state.record(MockBrowserCall::CloseContext);
        Ok(())
    }
}

struct MockPage {
    state: Arc<MockState>,
    url: Option<String>,
    fixture: Option<PageFixture>,
    closed: bool,
}

impl MockPage {
    fn fixture(&self) -> BrowserResult<&PageFixture> {
        self.fixture.as_ref().ok_or(BrowserError::NoDocument)
    }
}

#[async_trait]
impl Page for MockPage {
    async fn goto(&mut self, url: &str, _wait: WaitPolicy) -> BrowserResult<()> {
        self.state.record(MockBrowserCall::Goto {
            url: url.to_string(),
        });

        let latency = self.state.latency_for(url);
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        if self.state.timeout_urls.read().unwrap().contains(url) {
            return Err(BrowserError::Timeout {
                url: url.to_string(),
            });
        }
        if self.state.fail_urls.read().unwrap().contains(url) {
            return Err(BrowserError::Navigation {
                url: url.to_string(),
                reason: "mock failure".to_string(),
            });
        }

        let fixture = self.state.pages.read().unwrap().get(url).cloned();
        match fixture {
            Some(fixture) => {
                self.url = Some(url.to_string());
                self.fixture = Some(fixture);
                Ok(())
            }
            None => Err(BrowserError::Navigation {
                url: url.to_string(),
                reason: "404 Not Found".to_string(),
            }),
        }
    }

    fn set_default_timeout(&mut self, _timeout: Duration) {}

    fn current_url(&self) -> Option<String> {
        self.url.clone()
    }

    async fn query_selector(&self, selector: &str, _timeout: Duration) -> BrowserResult<Option<Element>> {
        let latency = *self.state.query_latency.read().unwrap();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        Ok(self.fixture()?.matching(selector).into_iter().next())
    }

    async fn all_matching(&self, selector: &str) -> BrowserResult<Vec<Element>> {
        Ok(self.fixture()?.matching(selector))
    }

    async fn click(&self, selector: &str, _timeout: Duration) -> BrowserResult<()> {
        self.state.record(MockBrowserCall::Click {
            selector: selector.to_string(),
        });
        if self.fixture()?.matching(selector).is_empty() {
            return Err(BrowserError::NotFound(selector.to_string()));
        }
        Ok(())
    }

    async fn rendered_text(&self) -> BrowserResult<String> {
        Ok(self.fixture()?.text.clone())
    }

    async fn close(&mut self) -> BrowserResult<()> {
        if !self.closed {
            self.closed = true;
            self.state.open_pages.fetch_sub(1, Ordering::SeqCst);
            self.state.record(MockBrowserCall::ClosePage);
        }
        Ok(())
    }
}

/// A mock notifier that keeps every message it was asked to send.
#[derive(Debug, Clone, Default)]
pub struct MockNotifier {
    messages: Arc<RwLock<Vec<String>>>,
    fail: bool,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `notify` call fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.read().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn notify(&self, message: &str) -> Result<(), NotifyError> {
        if self.fail {
            return Err(NotifyError::Unavailable("mock notifier set to fail".to_string()));
        }
        self.messages.write().unwrap().push(message.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_browser_serves_fixtures() {
        let browser = MockBrowser::new().with_page(
            "https://a.example/",
            PageFixture::new()
                .with_text("hello")
                .with_link("mailto:x@a.example", "mail"),
        );
        let context = browser.new_context(&ContextOptions::default()).await.unwrap();
        let mut page = context.new_page().await.unwrap();

        assert!(matches!(page.rendered_text().await, Err(BrowserError::NoDocument)));
        page.goto("https://a.example/", WaitPolicy::Load).await.unwrap();
        assert_eq!(page.rendered_text().await.unwrap(), "hello");
        assert_eq!(page.all_matching("a[href]").await.unwrap().len(), 1);
        assert_eq!(page.all_matching("a[href^='mailto:']").await.unwrap().len(), 1);

        page.close().await.unwrap();
        page.close().await.unwrap();
        assert_eq!(browser.open_pages(), 0);
        assert_eq!(browser.goto_count("https://a.example/"), 1);
    }

    #[tokio::test]
    async fn test_mock_browser_failures() {
        let browser = MockBrowser::new()
            .timeout_url("https://slow.example/")
            .fail_contexts(1);

        assert!(browser.new_context(&ContextOptions::default()).await.is_err());
        let context = browser.new_context(&ContextOptions::default()).await.unwrap();
        let mut page = context.new_page().await.unwrap();

        let err = page.goto("https://slow.example/", WaitPolicy::default()).await.unwrap_err();
        assert!(err.is_timeout());
        let err = page.goto("https://missing.example/", WaitPolicy::default()).await.unwrap_err();
        assert!(!err.is_timeout());
        assert_eq!(browser.contexts_created(), 1);
    }

    #[tokio::test]
    async fn test_mock_notifier() {
        let notifier = MockNotifier::new();
        notifier.notify("done").await.unwrap();
        assert_eq!(notifier.messages(), vec!["done"]);

        assert!(MockNotifier::failing().notify("x").await.is_err());
    }
}
