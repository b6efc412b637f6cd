//! One-hop contact mining on a business website.
//!
//! The home page is visited at most once per domain per session, through the
//! [`ContactCache`]. Email lookup order is: `mailto:` anchors, then the
//! rendered document, then the first "contact" page linked from home. Social
//! profiles come from the home page anchors only.

use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, info};
use url::Url;

use crate::cache::ContactCache;
use crate::input::SiteKey;
use crate::pipeline::{listing, social};
use crate::traits::browser::{BrowserContext, Element, Page, WaitPolicy};
use crate::types::config::HarvestConfig;
use crate::types::record::{ContactInfo, Field};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}").unwrap());

static EMAIL_EXACT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$").unwrap());

const ANCHORS: &str = "a[href]";
const MAILTO_ANCHORS: &str = "a[href^='mailto:']";

/// First email-looking substring of `text`.
pub fn find_email(text: &str) -> Option<&str> {
    EMAIL_RE.find(text).map(|m| m.as_str())
}

/// Address of a `mailto:` target, if it is a single well-formed email.
pub fn mailto_address(href: &str) -> Option<&str> {
    let (scheme, rest) = href.split_at_checked(7)?;
    if !scheme.eq_ignore_ascii_case("mailto:") {
        return None;
    }
    let address = rest.split('?').next()?.trim();
    EMAIL_EXACT_RE.is_match(address).then_some(address)
}

/// Contact data for `site`, visiting it only if no worker has yet.
pub async fn mine_contacts(
    context: &dyn BrowserContext,
    site: &SiteKey,
    cache: &ContactCache,
    config: &HarvestConfig,
) -> ContactInfo {
    cache
        .get_or_resolve(&site.domain, || visit_site(context, &site.home, config))
        .await
}

/// Open an auxiliary page on `home`, mine it, and close the page.
async fn visit_site(context: &dyn BrowserContext, home: &str, config: &HarvestConfig) -> ContactInfo {
    let mut page = match context.new_page().await {
        Ok(page) => page,
        Err(e) => {
            debug!(site = home, error = %e, "Could not open page for site");
            return ContactInfo::empty();
        }
    };
    page.set_default_timeout(config.contact_timeout());

    let info = scan_site(page.as_mut(), home, config).await;

    if let Err(e) = page.close().await {
        debug!(site = home, error = %e, "Failed to close site page");
    }

    info!(
        site = home,
        email = %info.email,
        social = info.social.found_count(),
        "Mined site contacts"
    );
    info
}

async fn scan_site(page: &mut dyn Page, home: &str, config: &HarvestConfig) -> ContactInfo {
    if let Err(e) = page.goto(home, WaitPolicy::DomContentLoaded).await {
        debug!(site = home, error = %e, "Site unreachable");
        return ContactInfo::empty();
    }

    listing::dismiss_consent(page, config).await;

    let mut email = mailto_email(page).await;

    if !email.is_found() {
        email = page_email(page).await;
    }

    let anchors = page.all_matching(ANCHORS).await.unwrap_or_else(|e| {
        debug!(site = home, error = %e, "Anchor scan failed");
        Vec::new()
    });
    let social = social::match_socials(&anchors);

    if !email.is_found() {
        email = contact_page_email(page, &anchors, config).await;
    }

    ContactInfo { email, social }
}

async fn mailto_email(page: &dyn Page) -> Field {
    let anchors = page.all_matching(MAILTO_ANCHORS).await.unwrap_or_default();
    let address = anchors
        .iter()
        .filter_map(Element::href)
        .find_map(mailto_address);
    Field::from_text(address)
}

async fn page_email(page: &dyn Page) -> Field {
    match page.rendered_text().await {
        Ok(text) => Field::from_text(find_email(&text)),
        Err(e) => {
            debug!(error = %e, "Could not read page content");
            Field::NotFound
        }
    }
}

/// Follow the first anchor whose text names a contact page and scan it.
async fn contact_page_email(page: &mut dyn Page, anchors: &[Element], config: &HarvestConfig) -> Field {
    let Some(target) = contact_link(anchors, &config.contact_labels) else {
        return Field::NotFound;
    };
    let target = match page.current_url().and_then(|base| Url::parse(&base).ok()) {
        Some(base) => match base.join(target) {
            Ok(resolved) => resolved.to_string(),
            Err(_) => return Field::NotFound,
        },
        None => target.to_string(),
    };

    if let Err(e) = page.goto(&target, WaitPolicy::DomContentLoaded).await {
        debug!(url = %target, error = %e, "Contact page unreachable");
        return Field::NotFound;
    }
    page_email(page).await
}

/// `href` of the first anchor whose text contains one of `labels`.
pub fn contact_link<'a>(anchors: &'a [Element], labels: &[String]) -> Option<&'a str> {
    let labels: Vec<String> = labels.iter().map(|l| l.to_lowercase()).collect();
    anchors.iter().find_map(|anchor| {
        let text = anchor.text_content().to_lowercase();
        let href = anchor.href().filter(|h| !h.trim().is_empty())?;
        labels.iter().any(|l| text.contains(l.as_str())).then_some(href)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::site_key;
    use crate::testing::{MockBrowser, PageFixture};
    use crate::traits::browser::Browser;
    use crate::types::config::ContextOptions;
    use crate::types::record::SocialKind;

    #[test]
    fn test_mailto_address() {
        assert_eq!(mailto_address("mailto:a@b.com"), Some("a@b.com"));
        assert_eq!(mailto_address("MAILTO:info@acme.it?subject=Hi"), Some("info@acme.it"));
        assert_eq!(mailto_address("mailto:not an email"), None);
        assert_eq!(mailto_address("https://acme.it"), None);
        assert_eq!(mailto_address("mail"), None);
    }

    #[test]
    fn test_find_email_in_markup() {
        let html = "<p>Scrivici: <b>Info@Trattoria.IT</b> oppure chiama</p>";
        assert_eq!(find_email(html), Some("Info@Trattoria.IT"));
        assert_eq!(find_email("no address here"), None);
    }

    #[test]
    fn test_contact_link_matches_label_case_insensitively() {
        let anchors = vec![
            Element::new("Home").with_attribute("href", "/"),
            Element::new("CONTATTI").with_attribute("href", "/contatti"),
            Element::new("Contact us").with_attribute("href", "/contact"),
        ];
        let labels = vec!["Contatti".to_string(), "Contact".to_string()];
        assert_eq!(contact_link(&anchors, &labels), Some("/contatti"));
    }

    async fn mine(browser: &MockBrowser, website: &str, cache: &ContactCache) -> ContactInfo {
        let config = HarvestConfig::default();
        let context = browser.new_context(&ContextOptions::default()).await.unwrap();
        let site = site_key(website).unwrap();
        mine_contacts(context.as_ref(), &site, cache, &config).await
    }

    #[tokio::test]
    async fn test_mailto_beats_page_text() {
        let browser = MockBrowser::new().with_page(
            "https://acme.example/",
            PageFixture::new()
                .with_text("write to sales@acme.example")
                .with_link("mailto:a@b.com", "Email us")
                .with_link("https://facebook.com/x", "")
                .with_link("https://instagram.com/y", ""),
        );
        let cache = ContactCache::new();

        let info = mine(&browser, "https://acme.example/chi-siamo", &cache).await;
        assert_eq!(info.email, Field::Found("a@b.com".into()));
        assert_eq!(
            info.social.get(SocialKind::Facebook).as_deref(),
            Some("https://facebook.com/x")
        );
        assert_eq!(
            info.social.get(SocialKind::Instagram).as_deref(),
            Some("https://instagram.com/y")
        );
        assert_eq!(info.social.found_count(), 2);
        assert_eq!(browser.open_pages(), 0);
    }

    #[tokio::test]
    async fn test_falls_back_to_contact_page() {
        let browser = MockBrowser::new()
            .with_page(
                "https://acme.example/",
                PageFixture::new().with_link("/contatti", "Contatti"),
            )
            .with_page(
                "https://acme.example/contatti",
                PageFixture::new().with_text("<p>info@acme.example</p>"),
            );
        let cache = ContactCache::new();

        let info = mine(&browser, "acme.example", &cache).await;
        assert_eq!(info.email, Field::Found("info@acme.example".into()));
        assert_eq!(browser.goto_count("https://acme.example/contatti"), 1);
    }

    #[tokio::test]
    async fn test_unreachable_site_is_cached_as_empty() {
        let browser = MockBrowser::new().fail_url("https://down.example/");
        let cache = ContactCache::new();

        let first = mine(&browser, "https://down.example/x", &cache).await;
        let second = mine(&browser, "https://DOWN.example/y", &cache).await;

        assert_eq!(first, ContactInfo::empty());
        assert_eq!(second, ContactInfo::empty());
        assert_eq!(browser.goto_count("https://down.example/"), 1);
        assert_eq!(browser.open_pages(), 0);
    }
}
