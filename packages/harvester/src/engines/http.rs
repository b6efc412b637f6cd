//! Static-HTML automation engine.
//!
//! Fetches documents with `reqwest` and answers CSS queries with `scraper`.
//! There is no script execution, so `click` can only confirm that its target
//! exists, and "rendered" text is the markup as served.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::debug;

use crate::error::{BrowserError, BrowserResult};
use crate::traits::browser::{Browser, BrowserContext, Element, Page, WaitPolicy};
use crate::types::config::ContextOptions;

const DEFAULT_PAGE_TIMEOUT: Duration = Duration::from_secs(30);

/// Engine backed by plain HTTP requests.
#[derive(Debug, Clone, Default)]
pub struct HttpBrowser {
    page_timeout: Option<Duration>,
    direct: bool,
}

impl HttpBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default navigation timeout for pages of every context.
    pub fn with_page_timeout(mut self, timeout: Duration) -> Self {
        self.page_timeout = Some(timeout);
        self
    }

    /// Ignore proxy settings from the environment.
    pub fn without_proxy(mut self) -> Self {
        self.direct = true;
        self
    }
}

#[async_trait]
impl Browser for HttpBrowser {
    async fn new_context(&self, options: &ContextOptions) -> BrowserResult<Box<dyn BrowserContext>> {
        let mut headers = HeaderMap::new();
        if let Ok(locale) = HeaderValue::from_str(&options.locale) {
            headers.insert(ACCEPT_LANGUAGE, locale);
        }

        let mut builder = Client::builder()
            .user_agent(options.user_agent.clone())
            .default_headers(headers);
        if self.direct {
            builder = builder.no_proxy();
        }
        let client = builder
            .build()
            .map_err(|e| BrowserError::Launch(Box::new(e)))?;

        Ok(Box::new(HttpContext {
            client,
            page_timeout: self.page_timeout.unwrap_or(DEFAULT_PAGE_TIMEOUT),
        }))
    }
}

struct HttpContext {
    client: Client,
    page_timeout: Duration,
}

#[async_trait]
impl BrowserContext for HttpContext {
    async fn new_page(&self) -> BrowserResult<Box<dyn Page>> {
        Ok(Box::new(HttpPage {
            client: self.client.clone(),
            timeout: self.page_timeout,
            url: None,
            markup: None,
        }))
    }

    async fn close(&self) -> BrowserResult<()> {
        Ok(())
    }
}

struct HttpPage {
    client: Client,
    timeout: Duration,
    url: Option<String>,
    markup: Option<String>,
}

impl HttpPage {
    fn markup(&self) -> BrowserResult<&str> {
        self.markup.as_deref().ok_or(BrowserError::NoDocument)
    }
}

fn navigation_error(url: &str, e: reqwest::Error) -> BrowserError {
    if e.is_timeout() {
        BrowserError::Timeout {
            url: url.to_string(),
        }
    } else {
        BrowserError::Navigation {
            url: url.to_string(),
            reason: e.to_string(),
        }
    }
}

#[async_trait]
impl Page for HttpPage {
    async fn goto(&mut self, url: &str, _wait: WaitPolicy) -> BrowserResult<()> {
        debug!(url, "HTTP fetch starting");
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| navigation_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BrowserError::Navigation {
                url: url.to_string(),
                reason: format!("HTTP {}", status),
            });
        }

        let final_url = response.url().to_string();
        let markup = response.text().await.map_err(|e| navigation_error(url, e))?;

        self.url = Some(final_url);
        self.markup = Some(markup);
        Ok(())
    }

    fn set_default_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    fn current_url(&self) -> Option<String> {
        self.url.clone()
    }

    async fn query_selector(&self, selector: &str, _timeout: Duration) -> BrowserResult<Option<Element>> {
        Ok(select(self.markup()?, selector, Some(1))?.into_iter().next())
    }

    async fn all_matching(&self, selector: &str) -> BrowserResult<Vec<Element>> {
        select(self.markup()?, selector, None)
    }

    async fn click(&self, selector: &str, _timeout: Duration) -> BrowserResult<()> {
        if select(self.markup()?, selector, Some(1))?.is_empty() {
            return Err(BrowserError::NotFound(selector.to_string()));
        }
        Ok(())
    }

    async fn rendered_text(&self) -> BrowserResult<String> {
        Ok(self.markup()?.to_string())
    }

    async fn close(&mut self) -> BrowserResult<()> {
        self.markup = None;
        Ok(())
    }
}

/// Run a CSS query over `markup`. Parsing stays synchronous so no
/// non-`Send` DOM handle ever crosses an await.
fn select(markup: &str, selector: &str, limit: Option<usize>) -> BrowserResult<Vec<Element>> {
    let parsed = Selector::parse(selector)
        .map_err(|e| BrowserError::InvalidSelector(format!("{}: {}", selector, e)))?;
    let document = Html::parse_document(markup);

    Ok(document
        .select(&parsed)
        .take(limit.unwrap_or(usize::MAX))
        .map(snapshot)
        .collect())
}

fn snapshot(element: ElementRef<'_>) -> Element {
    element
        .value()
        .attrs()
        .fold(Element::new(element.text().collect::<String>()), |el, (name, value)| {
            el.with_attribute(name, value)
        })
}
