//! URL ingestion and normalization.
//!
//! Raw input values become job URLs here; website links become contact
//! cache keys here.

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

use crate::error::{JobError, JobResult};

static SCHEME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^https?://").unwrap());

/// Whether a raw value already carries an http(s) scheme.
pub fn looks_like_url(value: &str) -> bool {
    SCHEME_RE.is_match(value.trim())
}

/// Coerce `www.`-prefixed values to `https://`; leave everything else alone.
pub fn ensure_scheme(value: &str) -> String {
    let value = value.trim();
    if looks_like_url(value) {
        return value.to_string();
    }
    if value.get(..4).is_some_and(|p| p.eq_ignore_ascii_case("www.")) {
        return format!("https://{}", value);
    }
    value.to_string()
}

/// Turn raw input cells into job URLs, skipping anything that does not look
/// like a URL. Order is preserved and duplicates are kept.
pub fn ingest_urls<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    values
        .into_iter()
        .filter_map(|raw| {
            let raw = raw.as_ref().trim();
            if raw.is_empty() {
                return None;
            }
            let candidate = ensure_scheme(raw);
            if looks_like_url(&candidate) {
                Some(candidate)
            } else {
                tracing::debug!(value = %raw, "Skipping non-URL input value");
                None
            }
        })
        .collect()
}

/// Syntactic check performed by a worker before it drives the browser.
pub fn validate_job_url(url: &str) -> JobResult<Url> {
    let invalid = || JobError::InvalidUrl {
        url: url.to_string(),
    };

    if !looks_like_url(url) {
        return Err(invalid());
    }
    let parsed = Url::parse(url.trim()).map_err(|_| invalid())?;
    match parsed.host_str() {
        Some(host) if !host.is_empty() => Ok(parsed),
        _ => Err(invalid()),
    }
}

/// A business website reduced to its home page and cache key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteKey {
    /// `scheme://host[:port]/`
    pub home: String,
    /// Lowercased `host[:port]`
    pub domain: String,
}

/// Normalize a website link to its home page.
///
/// Links without a scheme are treated as `https`; paths, queries and
/// fragments are dropped.
pub fn site_key(website: &str) -> Option<SiteKey> {
    let website = website.trim();
    if website.is_empty() {
        return None;
    }

    let parsed = match Url::parse(website) {
        Ok(u) if u.host_str().is_some() => u,
        _ => Url::parse(&format!("https://{}", website.trim_start_matches('/'))).ok()?,
    };

    let host = parsed.host_str()?.to_lowercase();
    if host.is_empty() {
        return None;
    }
    let domain = match parsed.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    };

    Some(SiteKey {
        home: format!("{}://{}/", parsed.scheme(), domain),
        domain,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_ingest_skips_malformed_values() {
        let urls = ingest_urls(["https://maps.example/A", "not-a-url", "https://maps.example/B"]);
        assert_eq!(urls, vec!["https://maps.example/A", "https://maps.example/B"]);
    }

    #[test]
    fn test_ingest_coerces_www_prefix() {
        let urls = ingest_urls(["  www.maps.example/place/1 ", "", "URL"]);
        assert_eq!(urls, vec!["https://www.maps.example/place/1"]);
    }

    #[test]
    fn test_ingest_keeps_duplicates_and_order() {
        let urls = ingest_urls(["http://a.example", "https://b.example", "http://a.example"]);
        assert_eq!(urls.len(), 3);
        assert_eq!(urls[2], "http://a.example");
    }

    #[test]
    fn test_validate_job_url() {
        assert!(validate_job_url("https://maps.example/place?x=1").is_ok());
        assert!(validate_job_url("ftp://maps.example/").is_err());
        assert!(validate_job_url("https://").is_err());
        assert!(validate_job_url("maps.example").is_err());
    }

    #[test]
    fn test_site_key_strips_path_and_case() {
        let key = site_key("https://WWW.Acme.Example/about?lang=it#team").unwrap();
        assert_eq!(key.home, "https://www.acme.example/");
        assert_eq!(key.domain, "www.acme.example");
    }

    #[test]
    fn test_site_key_without_scheme() {
        let key = site_key("acme.example/contatti").unwrap();
        assert_eq!(key.home, "https://acme.example/");
        assert_eq!(key.domain, "acme.example");
    }

    #[test]
    fn test_site_key_keeps_port_and_scheme() {
        let key = site_key("http://acme.example:8080/x").unwrap();
        assert_eq!(key.home, "http://acme.example:8080/");
        assert_eq!(key.domain, "acme.example:8080");
    }

    #[test]
    fn test_site_key_trailing_slash_is_same_domain() {
        assert_eq!(
            site_key("https://acme.example").unwrap(),
            site_key("https://acme.example/").unwrap()
        );
    }

    proptest! {
        #[test]
        fn site_key_is_idempotent(host in "[a-z]{1,12}\\.[a-z]{2,6}", path in "(/[a-z0-9]{0,8}){0,3}") {
            let first = site_key(&format!("https://{}{}", host, path)).unwrap();
            let second = site_key(&first.home).unwrap();
            prop_assert_eq!(&first, &second);
            prop_assert!(first.home.ends_with('/'));
            prop_assert_eq!(first.domain, host);
        }
    }
}
