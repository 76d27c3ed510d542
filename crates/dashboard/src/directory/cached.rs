//! Caching decorator for org lookups

use std::sync::Arc;

use async_trait::async_trait;
use lms_shared::{CurrentOrg, OrgId, SessionUser, UserId};

use super::{DirectoryError, OrgDirectory};
use crate::routing::OrgCache;

/// Wraps a directory and caches the two org lookups, including misses.
///
/// Sessions and memberships always go to the inner directory. Errors are
/// never cached.
pub struct CachedDirectory<D> {
    inner: D,
    cache: Arc<OrgCache>,
}

impl<D: OrgDirectory> CachedDirectory<D> {
    pub fn new(inner: D, cache: Arc<OrgCache>) -> Self {
        Self { inner, cache }
    }

    async fn cached<F>(&self, key: String, fetch: F) -> Result<Option<CurrentOrg>, DirectoryError>
    where
        F: std::future::Future<Output = Result<Option<CurrentOrg>, DirectoryError>>,
    {
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit);
        }

        let org = fetch.await?;
        self.cache.set(&key, org.clone());
        Ok(org)
    }
}

#[async_trait]
impl<D: OrgDirectory> OrgDirectory for CachedDirectory<D> {
    async fn org_by_site_name(&self, site_name: &str) -> Result<Option<CurrentOrg>, DirectoryError> {
        self.cached(
            OrgCache::site_key(site_name),
            self.inner.org_by_site_name(site_name),
        )
        .await
    }

    async fn org_by_custom_domain(&self, host: &str) -> Result<Option<CurrentOrg>, DirectoryError> {
        self.cached(
            OrgCache::domain_key(host),
            self.inner.org_by_custom_domain(host),
        )
        .await
    }

    async fn session_user(&self, access_token: &str) -> Result<Option<SessionUser>, DirectoryError> {
        self.inner.session_user(access_token).await
    }

    async fn is_member(&self, org_id: OrgId, user_id: UserId) -> Result<bool, DirectoryError> {
        self.inner.is_member(org_id, user_id).await
    }

    async fn health_check(&self) -> Result<(), DirectoryError> {
        self.inner.health_check().await
    }
}
