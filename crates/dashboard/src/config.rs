//! Application configuration

use std::env;
use std::time::Duration;

/// Hosts that belong to the platform itself and never count as custom domains
const DEFAULT_PLATFORM_HOSTS: &str = "classroomio.com,vercel.app";

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub bind_address: String,
    /// Take the request host from `X-Forwarded-Host` (only behind a proxy that sets it)
    pub trust_forwarded_host: bool,

    // Deployment mode
    pub is_selfhosted: bool,
    pub dev_mode: bool,

    // Tenant routing
    pub app_subdomains: Vec<String>, // e.g., ["app"] for app.example.com
    pub app_host: String,            // e.g., "example.com" for *.example.com routing
    pub platform_hosts: Vec<String>,
    pub main_app_url: String,

    // Supabase
    pub supabase_url: String,
    pub supabase_key: String,
    pub session_cookie_name: String,

    // Org lookup cache
    pub org_cache_ttl: Duration,
    pub org_cache_negative_ttl: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let supabase_url = env::var("SUPABASE_URL")
            .ok()
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing("SUPABASE_URL"))?;
        if !supabase_url.starts_with("http://") && !supabase_url.starts_with("https://") {
            return Err(ConfigError::Invalid(
                "SUPABASE_URL must start with http:// or https://",
            ));
        }

        // Lookups run server side, so the service role key wins when present
        let supabase_key = env::var("SUPABASE_SERVICE_ROLE_KEY")
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(|| env::var("SUPABASE_ANON_KEY").ok().filter(|v| !v.is_empty()))
            .ok_or(ConfigError::Missing("SUPABASE_SERVICE_ROLE_KEY or SUPABASE_ANON_KEY"))?;

        Ok(Self {
            // Server
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            trust_forwarded_host: env::var("TRUST_FORWARDED_HOST")
                .map(|v| v == "true")
                .unwrap_or(false),

            // Deployment mode
            is_selfhosted: env::var("PUBLIC_IS_SELFHOSTED")
                .map(|v| v == "true")
                .unwrap_or(false),
            dev_mode: env::var("APP_ENV")
                .map(|v| v.eq_ignore_ascii_case("development"))
                .unwrap_or(false),

            // Tenant routing
            app_subdomains: split_list(&env::var("PRIVATE_APP_SUBDOMAINS").unwrap_or_default()),
            app_host: env::var("PRIVATE_APP_HOST")
                .unwrap_or_default()
                .trim()
                .to_lowercase(),
            platform_hosts: split_list(
                &env::var("PRIVATE_PLATFORM_HOSTS")
                    .unwrap_or_else(|_| DEFAULT_PLATFORM_HOSTS.to_string()),
            ),
            main_app_url: env::var("MAIN_APP_URL")
                .unwrap_or_else(|_| "https://app.classroomio.com".to_string())
                .trim_end_matches('/')
                .to_string(),

            // Supabase
            supabase_url: supabase_url.trim_end_matches('/').to_string(),
            supabase_key,
            session_cookie_name: env::var("SESSION_COOKIE_NAME")
                .unwrap_or_else(|_| "sb-access-token".to_string()),

            // Org lookup cache
            org_cache_ttl: secs_var("ORG_CACHE_TTL_SECS", 300),
            org_cache_negative_ttl: secs_var("ORG_CACHE_NEGATIVE_TTL_SECS", 30),
        })
    }

    /// Server-side rendering is turned off for selfhosted deployments
    pub fn ssr_enabled(&self) -> bool {
        !self.is_selfhosted
    }

    /// Where organization subdomains that don't exist are sent
    pub fn org_not_found_url(&self) -> String {
        format!("{}/404?type=org", self.main_app_url)
    }

    /// Login page of the main app, used when a selfhosted visitor is not a member.
    ///
    /// Built from the first app subdomain and the app host; falls back to the
    /// main app URL when either is unset.
    pub fn main_login_url(&self) -> String {
        match self.app_subdomains.first() {
            Some(subdomain) if !self.app_host.is_empty() => {
                format!("https://{}.{}/login", subdomain, self.app_host)
            }
            _ => format!("{}/login", self.main_app_url),
        }
    }
}

fn secs_var(name: &str, default: u64) -> Duration {
    Duration::from_secs(
        env::var(name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default),
    )
}

/// Split a comma separated env value, dropping blanks
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|part| part.trim().to_lowercase())
        .filter(|part| !part.is_empty())
        .collect()
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serial_test::serial;

    const ROUTING_VARS: &[&str] = &[
        "SUPABASE_URL",
        "SUPABASE_SERVICE_ROLE_KEY",
        "SUPABASE_ANON_KEY",
        "PUBLIC_IS_SELFHOSTED",
        "PRIVATE_APP_SUBDOMAINS",
        "PRIVATE_APP_HOST",
        "PRIVATE_PLATFORM_HOSTS",
        "MAIN_APP_URL",
        "APP_ENV",
        "ORG_CACHE_TTL_SECS",
        "ORG_CACHE_NEGATIVE_TTL_SECS",
        "TRUST_FORWARDED_HOST",
    ];

    fn clear_env() {
        for var in ROUTING_VARS {
            env::remove_var(var);
        }
    }

    fn setup_minimal_config() {
        clear_env();
        env::set_var("SUPABASE_URL", "https://project.supabase.co/");
        env::set_var("SUPABASE_ANON_KEY", "anon-key");
    }

    #[test]
    #[serial]
    fn test_missing_supabase_url() {
        clear_env();
        match Config::from_env() {
            Err(ConfigError::Missing("SUPABASE_URL")) => {}
            other => panic!("Expected Missing(SUPABASE_URL), got: {:?}", other),
        }
    }

    #[test]
    #[serial]
    fn test_rejects_non_http_supabase_url() {
        clear_env();
        env::set_var("SUPABASE_URL", "project.supabase.co");
        env::set_var("SUPABASE_ANON_KEY", "anon-key");
        assert!(matches!(Config::from_env(), Err(ConfigError::Invalid(_))));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_missing_supabase_key() {
        clear_env();
        env::set_var("SUPABASE_URL", "https://project.supabase.co");
        assert!(matches!(Config::from_env(), Err(ConfigError::Missing(_))));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_defaults() {
        setup_minimal_config();
        let config = Config::from_env().unwrap();

        assert!(!config.is_selfhosted);
        assert!(!config.dev_mode);
        assert!(config.ssr_enabled());
        assert!(config.app_subdomains.is_empty());
        assert_eq!(config.platform_hosts, vec!["classroomio.com", "vercel.app"]);
        assert_eq!(config.supabase_url, "https://project.supabase.co");
        assert_eq!(config.org_cache_ttl, Duration::from_secs(300));
        assert_eq!(config.org_cache_negative_ttl, Duration::from_secs(30));
        assert!(!config.trust_forwarded_host);
        assert_eq!(
            config.org_not_found_url(),
            "https://app.classroomio.com/404?type=org"
        );
        clear_env();
    }

    #[test]
    #[serial]
    fn test_service_role_key_preferred() {
        setup_minimal_config();
        env::set_var("SUPABASE_SERVICE_ROLE_KEY", "service-key");
        let config = Config::from_env().unwrap();
        assert_eq!(config.supabase_key, "service-key");
        env::remove_var("SUPABASE_SERVICE_ROLE_KEY");
        clear_env();
    }

    #[test]
    #[serial]
    fn test_routing_lists_and_login_url() {
        setup_minimal_config();
        env::set_var("PUBLIC_IS_SELFHOSTED", "true");
        env::set_var("PRIVATE_APP_SUBDOMAINS", " app , dashboard,,");
        env::set_var("PRIVATE_APP_HOST", "Learn.Example.org");
        env::set_var("APP_ENV", "development");

        let config = Config::from_env().unwrap();
        assert!(config.is_selfhosted);
        assert!(!config.ssr_enabled());
        assert!(config.dev_mode);
        assert_eq!(config.app_subdomains, vec!["app", "dashboard"]);
        assert_eq!(config.app_host, "learn.example.org");
        assert_eq!(config.main_login_url(), "https://app.learn.example.org/login");
        clear_env();
    }

    #[test]
    #[serial]
    fn test_cache_ttls_and_proxy_trust() {
        setup_minimal_config();
        env::set_var("ORG_CACHE_TTL_SECS", "600");
        env::set_var("ORG_CACHE_NEGATIVE_TTL_SECS", "5");
        env::set_var("TRUST_FORWARDED_HOST", "true");

        let config = Config::from_env().unwrap();
        assert_eq!(config.org_cache_ttl, Duration::from_secs(600));
        assert_eq!(config.org_cache_negative_ttl, Duration::from_secs(5));
        assert!(config.trust_forwarded_host);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_login_url_falls_back_to_main_app() {
        setup_minimal_config();
        env::set_var("MAIN_APP_URL", "https://dash.example.org/");
        let config = Config::from_env().unwrap();
        assert_eq!(config.main_login_url(), "https://dash.example.org/login");
        clear_env();
    }
}
