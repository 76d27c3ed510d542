//! Host classification
//!
//! Works out which kind of site an incoming Host header points at:
//! - Custom domains: learn.company.com -> org lookup by verified custom domain
//! - Org subdomains: acme.example.com or acme.app.example.com -> org lookup by site name
//! - App subdomains: app.example.com -> the plain dashboard, no org context
//! - Blocked subdomains: reserved labels such as play.example.com

use crate::config::Config;

/// Reserved subdomains that can never be used as an organization site name
pub const BLOCKED_SUBDOMAINS: &[&str] = &[
    "play",
    "app",
    "www", // a leading `www.` is stripped; deeper ones (acme.www.example.com) land here
    "api",
    "admin",
    "dashboard",
    "dev",
    "staging",
    "test",
    "demo",
    "blog",
    "docs",
    "help",
    "support",
    "status",
    "mail",
    "cdn",
    "static",
    "assets",
    "media",
];

/// Subdomain that serves the public playground without authentication
pub const PLAY_SUBDOMAIN: &str = "play";

/// How a request host was classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostClass {
    /// A host outside the platform's own domains (normalized, without port)
    CustomDomain(String),
    /// One of the configured app subdomains, or the bare base domain
    AppSubdomain,
    /// An organization site name
    OrgSubdomain(String),
    /// A reserved label from [`BLOCKED_SUBDOMAINS`]
    Blocked(String),
}

/// Stateless host parser built from the routing part of [`Config`]
#[derive(Debug, Clone)]
pub struct HostResolver {
    app_host: String,
    app_subdomains: Vec<String>,
    platform_hosts: Vec<String>,
}

impl HostResolver {
    pub fn new(app_host: String, app_subdomains: Vec<String>, platform_hosts: Vec<String>) -> Self {
        Self {
            app_host,
            app_subdomains,
            platform_hosts,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.app_host.clone(),
            config.app_subdomains.clone(),
            config.platform_hosts.clone(),
        )
    }

    /// Classify a host. Custom domains take priority, then blocked labels,
    /// then app subdomains; anything left is an organization subdomain.
    pub fn classify(&self, host: &str) -> HostClass {
        if self.is_custom_domain(host) {
            return HostClass::CustomDomain(normalize_host(host));
        }

        let subdomain = self.subdomain(host).unwrap_or_default();

        if BLOCKED_SUBDOMAINS.contains(&subdomain.as_str()) {
            return HostClass::Blocked(subdomain);
        }

        if subdomain.is_empty() || self.is_app_subdomain(&subdomain) {
            return HostClass::AppSubdomain;
        }

        HostClass::OrgSubdomain(subdomain)
    }

    /// Extract the organization label from a host under the app host.
    ///
    /// Labels in front of the base domain are scanned right to left and the
    /// first one that isn't an app subdomain wins, so both
    /// `acme.example.com` and `acme.app.example.com` yield `acme`.
    /// Returns None for the bare base domain and for foreign hosts.
    pub fn subdomain(&self, host: &str) -> Option<String> {
        if self.app_host.is_empty() {
            return None;
        }

        let host = normalize_host(host);
        let host = host.strip_prefix("www.").unwrap_or(&host);

        if !is_same_or_subdomain(host, &self.app_host) {
            return None;
        }

        let base_parts = self.app_host.split('.').count();
        let parts: Vec<&str> = host.split('.').collect();
        let prefix_len = parts.len().saturating_sub(base_parts);

        parts[..prefix_len]
            .iter()
            .rev()
            .find(|part| !self.is_app_subdomain(part))
            .map(|part| part.to_string())
    }

    /// Whether the host is a tenant's own domain rather than one of ours
    pub fn is_custom_domain(&self, host: &str) -> bool {
        if is_local_host(host) {
            return false;
        }

        let host = normalize_host(host);

        let mut platform = self.platform_hosts.iter().map(String::as_str);
        let is_platform_host = (!self.app_host.is_empty()
            && is_same_or_subdomain(&host, &self.app_host))
            || platform.any(|base| is_same_or_subdomain(&host, base));

        !is_platform_host
    }

    pub fn is_app_subdomain(&self, label: &str) -> bool {
        self.app_subdomains.iter().any(|s| s == label)
    }
}

/// Normalize a host header value: lowercase and without port
pub fn normalize_host(host: &str) -> String {
    let host = host.trim();
    // Bracketed IPv6 literal, keep the brackets and drop the port
    let host = if host.starts_with('[') {
        match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        }
    } else {
        host.split(':').next().unwrap_or(host)
    };
    host.to_lowercase()
}

/// Local development hosts (`localhost`, loopback addresses), port ignored
pub fn is_local_host(host: &str) -> bool {
    let host = normalize_host(host);
    host.contains("localhost") || host == "127.0.0.1" || host == "[::1]"
}

fn is_same_or_subdomain(host: &str, base: &str) -> bool {
    host == base
        || host
            .strip_suffix(base)
            .is_some_and(|prefix| prefix.ends_with('.'))
}
