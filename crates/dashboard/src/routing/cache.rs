//! In-memory org lookup cache with TTL
//!
//! Caches site-name and custom-domain lookups to cut round trips to the
//! backend on every page load. Misses are kept for a shorter TTL so a newly
//! created org or a freshly verified domain shows up quickly.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use lms_shared::CurrentOrg;

/// Default cache TTL (5 minutes)
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);
/// Default TTL for lookups that found nothing
const DEFAULT_NEGATIVE_TTL: Duration = Duration::from_secs(30);

/// Cache entry with expiration
#[derive(Clone)]
struct CacheEntry {
    org: Option<CurrentOrg>,
    expires_at: Instant,
}

impl CacheEntry {
    fn new(org: Option<CurrentOrg>, ttl: Duration) -> Self {
        Self {
            org,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() > self.expires_at
    }
}

/// Thread-safe in-memory org cache
pub struct OrgCache {
    /// Maps lookup key -> org (None means the lookup found nothing)
    cache: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
    negative_ttl: Duration,
}

impl Default for OrgCache {
    fn default() -> Self {
        Self::new()
    }
}

impl OrgCache {
    /// Create a new cache with default TTLs
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_CACHE_TTL, DEFAULT_NEGATIVE_TTL)
    }

    /// Create a new cache with custom TTLs for found orgs and for misses
    pub fn with_ttl(ttl: Duration, negative_ttl: Duration) -> Self {
        Self {
            cache: RwLock::new(HashMap::new()),
            ttl,
            negative_ttl,
        }
    }

    /// Key for a site-name lookup.
    ///
    /// Must be the exact value sent to the backend, which matches site names
    /// case-sensitively.
    pub fn site_key(site_name: &str) -> String {
        format!("site:{}", site_name)
    }

    /// Key for a custom-domain lookup (hosts arrive normalized)
    pub fn domain_key(host: &str) -> String {
        format!("domain:{}", host)
    }

    /// Get a cached lookup
    /// Returns Some(Some(org)) if found and valid
    /// Returns Some(None) if the lookup was cached as empty
    /// Returns None if not in cache or expired
    pub fn get(&self, key: &str) -> Option<Option<CurrentOrg>> {
        let cache = self.cache.read().ok()?;
        let entry = cache.get(key)?;

        if entry.is_expired() {
            None
        } else {
            Some(entry.org.clone())
        }
    }

    /// Cache a lookup result
    pub fn set(&self, key: &str, org: Option<CurrentOrg>) {
        if self.ttl.is_zero() {
            return;
        }
        let ttl = if org.is_some() { self.ttl } else { self.negative_ttl };
        if let Ok(mut cache) = self.cache.write() {
            cache.insert(key.to_string(), CacheEntry::new(org, ttl));
        }
    }

    /// Clear expired entries
    pub fn cleanup(&self) {
        if let Ok(mut cache) = self.cache.write() {
            cache.retain(|_, entry| !entry.is_expired());
        }
    }

    pub fn stats(&self) -> CacheStats {
        if let Ok(cache) = self.cache.read() {
            let total = cache.len();
            let expired = cache.values().filter(|e| e.is_expired()).count();
            CacheStats {
                total_entries: total,
                expired_entries: expired,
                active_entries: total - expired,
            }
        } else {
            CacheStats::default()
        }
    }
}

/// Cache statistics
#[derive(Default, Debug, serde::Serialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub expired_entries: usize,
    pub active_entries: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use lms_shared::OrgId;
    use std::thread::sleep;

    fn org(site_name: &str) -> CurrentOrg {
        CurrentOrg {
            id: OrgId::new(),
            name: site_name.to_uppercase(),
            site_name: site_name.to_string(),
            avatar_url: None,
            custom_domain: None,
            is_custom_domain_verified: false,
            theme: None,
            favicon: None,
            landingpage: None,
            customization: None,
            is_restricted: false,
        }
    }

    #[test]
    fn test_cache_get_set() {
        let cache = OrgCache::new();
        let acme = org("acme");
        let key = OrgCache::site_key("acme");

        assert!(cache.get(&key).is_none());

        cache.set(&key, Some(acme.clone()));
        assert_eq!(cache.get(&key), Some(Some(acme)));
    }

    #[test]
    fn test_keys_keep_case_and_are_namespaced() {
        assert_ne!(OrgCache::site_key("ACME"), OrgCache::site_key("acme"));
        assert_ne!(OrgCache::site_key("acme.org"), OrgCache::domain_key("acme.org"));
    }

    #[test]
    fn test_miss_under_other_case_leaves_hit_alone() {
        let cache = OrgCache::new();
        let acme = org("acme");

        cache.set(&OrgCache::site_key("acme"), Some(acme.clone()));
        cache.set(&OrgCache::site_key("ACME"), None);

        assert_eq!(cache.get(&OrgCache::site_key("acme")), Some(Some(acme)));
        assert_eq!(cache.get(&OrgCache::site_key("ACME")), Some(None));
    }

    #[test]
    fn test_cache_negative() {
        let cache = OrgCache::new();
        let key = OrgCache::domain_key("unknown.example.com");

        cache.set(&key, None);
        assert_eq!(cache.get(&key), Some(None));
    }

    #[test]
    fn test_misses_expire_before_hits() {
        let cache = OrgCache::with_ttl(Duration::from_secs(60), Duration::from_millis(50));
        let hit = OrgCache::site_key("acme");
        let miss = OrgCache::site_key("ghost");

        cache.set(&hit, Some(org("acme")));
        cache.set(&miss, None);

        sleep(Duration::from_millis(60));
        assert!(cache.get(&hit).is_some());
        assert!(cache.get(&miss).is_none());
    }

    #[test]
    fn test_zero_ttl_stores_nothing() {
        let cache = OrgCache::with_ttl(Duration::ZERO, Duration::ZERO);
        cache.set(&OrgCache::site_key("acme"), Some(org("acme")));
        assert_eq!(cache.stats().total_entries, 0);
    }

    #[test]
    fn test_cache_expiration() {
        let cache = OrgCache::with_ttl(Duration::from_millis(50), Duration::from_millis(50));
        let key = OrgCache::site_key("acme");

        cache.set(&key, Some(org("acme")));
        assert!(cache.get(&key).is_some());

        sleep(Duration::from_millis(60));
        assert!(cache.get(&key).is_none());
        assert_eq!(cache.stats().expired_entries, 1);

        cache.cleanup();
        assert_eq!(cache.stats().total_entries, 0);
    }
}
