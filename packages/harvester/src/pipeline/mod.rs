//! Extraction pipeline - everything one job does with its browser context.
//!
//! The pipeline:
//! - Opens the listing page and dismisses any consent dialog
//! - Reads the listing fields, each with its own short timeout
//! - Mines the business website for contacts (once per domain)
//! - Closes every page it opened, on every path

pub mod contacts;
pub mod listing;
pub mod social;

pub use contacts::{find_email, mailto_address, mine_contacts};
pub use listing::{dismiss_consent, read_fields, ListingFields};
pub use social::match_socials;

use tracing::debug;

use crate::cache::ContactCache;
use crate::error::JobResult;
use crate::input::site_key;
use crate::traits::browser::{BrowserContext, Page, WaitPolicy};
use crate::types::config::HarvestConfig;
use crate::types::job::Job;
use crate::types::record::{ContactInfo, ExtractedRecord};

/// Run one job on `context` and build its record.
///
/// Only a failure to open or load the listing page is an error; every
/// lookup after that degrades to "not found".
pub async fn extract_listing(
    context: &dyn BrowserContext,
    job: &Job,
    cache: &ContactCache,
    config: &HarvestConfig,
) -> JobResult<ExtractedRecord> {
    let mut page = context.new_page().await?;
    page.set_default_timeout(config.navigation_timeout());

    let result = extract_on_page(page.as_mut(), context, job, cache, config).await;

    if let Err(e) = page.close().await {
        debug!(url = %job.url, error = %e, "Failed to close listing page");
    }
    result
}

async fn extract_on_page(
    page: &mut dyn Page,
    context: &dyn BrowserContext,
    job: &Job,
    cache: &ContactCache,
    config: &HarvestConfig,
) -> JobResult<ExtractedRecord> {
    page.goto(&job.url, WaitPolicy::DomContentLoaded).await?;
    listing::dismiss_consent(page, config).await;

    let fields = read_fields(page, config).await;

    let contact = match fields.website.as_deref().and_then(site_key) {
        Some(site) => mine_contacts(context, &site, cache, config).await,
        None => ContactInfo::empty(),
    };

    Ok(ExtractedRecord {
        name: fields.name,
        category: fields.category,
        address: fields.address,
        phone: fields.phone,
        website: fields.website,
        contact,
    })
}
