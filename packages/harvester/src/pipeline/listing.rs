//! Map listing page: consent dialog and field lookups.

use std::time::Duration;
use tracing::debug;

use crate::traits::browser::Page;
use crate::types::config::HarvestConfig;
use crate::types::record::Field;

/// Fields read directly off a listing page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingFields {
    pub name: Field,
    pub category: Field,
    pub address: Field,
    pub phone: Field,
    /// `href` of the website anchor
    pub website: Field,
}

/// Try each consent button in turn. Returns whether one was clicked.
///
/// Never fails: a page without a dialog is the common case.
pub async fn dismiss_consent(page: &dyn Page, config: &HarvestConfig) -> bool {
    let timeout = config.consent_timeout();
    for selector in &config.consent_selectors {
        match page.click(selector, timeout).await {
            Ok(()) => {
                debug!(selector = %selector, "Dismissed consent dialog");
                return true;
            }
            Err(e) => debug!(selector = %selector, error = %e, "No consent button"),
        }
    }
    false
}

/// Text of the first element matching `selector`, or `NotFound`.
///
/// The lookup is bounded by `timeout` even if the engine ignores it.
pub async fn text_or_missing(page: &dyn Page, selector: &str, timeout: Duration) -> Field {
    match tokio::time::timeout(timeout, page.query_selector(selector, timeout)).await {
        Ok(Ok(Some(element))) => Field::from_text(Some(element.text_content())),
        Ok(Ok(None)) => Field::NotFound,
        Ok(Err(e)) => {
            debug!(selector, error = %e, "Field lookup failed");
            Field::NotFound
        }
        Err(_) => {
            debug!(selector, "Field lookup timed out");
            Field::NotFound
        }
    }
}

/// Like [`text_or_missing`] but reads an attribute.
pub async fn attribute_or_missing(
    page: &dyn Page,
    selector: &str,
    attribute: &str,
    timeout: Duration,
) -> Field {
    match tokio::time::timeout(timeout, page.query_selector(selector, timeout)).await {
        Ok(Ok(Some(element))) => Field::from_text(element.attribute(attribute)),
        Ok(Ok(None)) | Err(_) => Field::NotFound,
        Ok(Err(e)) => {
            debug!(selector, error = %e, "Attribute lookup failed");
            Field::NotFound
        }
    }
}

/// Read every listing field. Misses become `NotFound`; nothing here fails.
pub async fn read_fields(page: &dyn Page, config: &HarvestConfig) -> ListingFields {
    let selectors = &config.selectors;
    let timeout = config.field_timeout();

    ListingFields {
        name: text_or_missing(page, &selectors.name, timeout).await,
        category: text_or_missing(page, &selectors.category, timeout).await,
        address: text_or_missing(page, &selectors.address, timeout).await,
        phone: text_or_missing(page, &selectors.phone, timeout).await,
        website: attribute_or_missing(page, &selectors.website, "href", timeout).await,
    }
}
