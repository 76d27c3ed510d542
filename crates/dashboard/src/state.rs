//! Shared application state

use std::sync::Arc;

use crate::config::Config;
use crate::directory::{CachedDirectory, DirectoryError, OrgDirectory, SupabaseDirectory};
use crate::layout::LayoutLoader;
use crate::routing::OrgCache;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub loader: LayoutLoader,
    /// None when the org cache is disabled (`ORG_CACHE_TTL_SECS=0`)
    pub org_cache: Option<Arc<OrgCache>>,
}

impl AppState {
    /// Wire the Supabase directory, with caching unless the TTL is zero
    pub fn new(config: Arc<Config>) -> Result<Self, DirectoryError> {
        let supabase = SupabaseDirectory::new(&config.supabase_url, &config.supabase_key)?;

        if config.org_cache_ttl.is_zero() {
            tracing::info!("Org lookup cache disabled");
            return Ok(Self::with_directory(config, Arc::new(supabase), None));
        }

        let cache = Arc::new(OrgCache::with_ttl(
            config.org_cache_ttl,
            config.org_cache_negative_ttl,
        ));
        let directory = CachedDirectory::new(supabase, cache.clone());
        Ok(Self::with_directory(config, Arc::new(directory), Some(cache)))
    }

    /// Build state around any directory implementation
    pub fn with_directory(
        config: Arc<Config>,
        directory: Arc<dyn OrgDirectory>,
        org_cache: Option<Arc<OrgCache>>,
    ) -> Self {
        Self {
            loader: LayoutLoader::new(config.clone(), directory),
            config,
            org_cache,
        }
    }
}
