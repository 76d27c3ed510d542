//! Host-based tenant routing
//!
//! This module turns incoming Host headers into a site classification,
//! covering org-specific URLs like:
//! - Org subdomains: acme.example.com, acme.app.example.com
//! - Custom domains: learn.company.com

mod cache;
mod host_resolver;

pub use cache::{CacheStats, OrgCache};
pub use host_resolver::{
    is_local_host, normalize_host, HostClass, HostResolver, BLOCKED_SUBDOMAINS, PLAY_SUBDOMAIN,
};
