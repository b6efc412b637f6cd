//! Session-scoped contact cache keyed by website domain.
//!
//! The map lock is held only long enough to find or insert a per-domain
//! cell. Resolution happens inside that cell, so two workers racing on the
//! same domain trigger a single site visit, while workers on other domains
//! are never blocked by it.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;

use crate::types::record::ContactInfo;

/// Domain → mined contact data, never evicted during a session.
#[derive(Debug, Default)]
pub struct ContactCache {
    entries: Mutex<HashMap<String, Arc<OnceCell<ContactInfo>>>>,
    resolutions: AtomicU64,
}

impl ContactCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached entry for `domain`, running `resolve` if this is
    /// the first request for it.
    ///
    /// Concurrent callers for the same domain wait for the first one and all
    /// observe the same value. Whatever `resolve` returns is cached, including
    /// an all-"not found" result.
    pub async fn get_or_resolve<F, Fut>(&self, domain: &str, resolve: F) -> ContactInfo
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ContactInfo>,
    {
        let cell = self.cell(domain);
        let resolutions = &self.resolutions;

        cell.get_or_init(|| async move {
            resolutions.fetch_add(1, Ordering::SeqCst);
            resolve().await
        })
        .await
        .clone()
    }

    /// Cached entry, if resolved.
    pub fn get(&self, domain: &str) -> Option<ContactInfo> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.get(domain).and_then(|cell| cell.get().cloned())
    }

    /// Number of domains with a resolved entry.
    pub fn len(&self) -> usize {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.values().filter(|cell| cell.initialized()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// How many times a resolver actually ran.
    pub fn resolutions(&self) -> u64 {
        self.resolutions.load(Ordering::SeqCst)
    }

    fn cell(&self, domain: &str) -> Arc<OnceCell<ContactInfo>> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries
            .entry(domain.to_string())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::record::{Field, SocialKind};
    use std::time::Duration;

    fn info(email: &str) -> ContactInfo {
        let mut info = ContactInfo::empty();
        info.email = Field::Found(email.to_string());
        info.social.fill(SocialKind::Facebook, "https://facebook.com/acme");
        info
    }

    #[tokio::test]
    async fn test_second_lookup_does_not_resolve() {
        let cache = ContactCache::new();

        let first = cache
            .get_or_resolve("acme.example", || async { info("a@acme.example") })
            .await;
        let second = cache
            .get_or_resolve("acme.example", || async { info("other@acme.example") })
            .await;

        assert_eq!(first, second);
        assert_eq!(cache.resolutions(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_result_is_cached() {
        let cache = ContactCache::new();
        cache
            .get_or_resolve("void.example", || async { ContactInfo::empty() })
            .await;

        assert_eq!(cache.get("void.example"), Some(ContactInfo::empty()));
        cache
            .get_or_resolve("void.example", || async { info("late@void.example") })
            .await;
        assert_eq!(cache.resolutions(), 1);
    }

    #[tokio::test]
    async fn test_racing_workers_share_one_resolution() {
        let cache = Arc::new(ContactCache::new());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = cache.clone();
                tokio::spawn(async move {
                    cache
                        .get_or_resolve("acme.example", || async move {
                            tokio::time::sleep(Duration::from_millis(50)).await;
                            info(&format!("worker{}@acme.example", i))
                        })
                        .await
                })
            })
            .collect();

        let mut results = Vec::new();
        for h in handles {
            results.push(h.await.unwrap());
        }

        assert_eq!(cache.resolutions(), 1);
        assert!(results.windows(2).all(|w| w[0] == w[1]));
    }

    #[tokio::test]
    async fn test_slow_domain_does_not_block_others() {
        let cache = Arc::new(ContactCache::new());

        let slow = {
            let cache = cache.clone();
            tokio::spawn(async move {
                cache
                    .get_or_resolve("slow.example", || async {
                        tokio::time::sleep(Duration::from_millis(300)).await;
                        ContactInfo::empty()
                    })
                    .await
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        let started = std::time::Instant::now();
        cache
            .get_or_resolve("fast.example", || async { info("x@fast.example") })
            .await;
        assert!(started.elapsed() < Duration::from_millis(200));

        slow.await.unwrap();
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_unknown_domain_is_none() {
        let cache = ContactCache::new();
        assert!(cache.get("nowhere.example").is_none());
        assert!(cache.is_empty());
    }
}
