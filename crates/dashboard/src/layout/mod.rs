//! Per-request layout loading
//!
//! Decides, for every dashboard request, which organization (if any) the
//! page belongs to, whether authentication can be skipped, and whether the
//! visitor has to be sent elsewhere. Lookup failures never surface as
//! errors: they are logged and the request falls back to the plain
//! dashboard. The only thing that escapes [`LayoutLoader::load`] is a
//! [`LoadRedirect`].

mod meta;

use std::sync::Arc;

use axum::response::{IntoResponse, Redirect, Response};
use lms_shared::CurrentOrg;
use serde::Serialize;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::config::Config;
use crate::directory::{DirectoryError, OrgDirectory};
use crate::routing::{is_local_host, HostClass, HostResolver, PLAY_SUBDOMAIN};

pub use meta::{canonical_url, BaseMetaTags, OpenGraph, OpenGraphImage, TwitterCard};

/// Cookie holding a local organization override
pub const ORG_SITE_COOKIE: &str = "_orgSiteName";
/// Cookie that opens the playground without authentication
pub const DEBUG_PLAY_COOKIE: &str = "debugPlay";
/// Query parameter that sets [`ORG_SITE_COOKIE`] on local hosts
pub const ORG_QUERY_PARAM: &str = "org";

/// What the page tier receives for every request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutData {
    pub org_site_name: String,
    pub is_org_site: bool,
    pub skip_auth: bool,
    pub org: Option<CurrentOrg>,
    pub base_meta_tags: BaseMetaTags,
    pub server_lang: String,
    pub ssr: bool,
}

impl LayoutData {
    /// Layout for the plain dashboard: no org context
    pub fn new(url: &Url, server_lang: String, ssr: bool) -> Self {
        Self {
            org_site_name: String::new(),
            is_org_site: false,
            skip_auth: false,
            org: None,
            base_meta_tags: BaseMetaTags::for_url(url),
            server_lang,
            ssr,
        }
    }
}

/// The parts of a request the loader looks at
#[derive(Debug, Clone)]
pub struct LoadRequest {
    pub url: Url,
    pub accept_language: Option<String>,
    pub org_site_cookie: Option<String>,
    pub debug_play_cookie: Option<String>,
    pub access_token: Option<String>,
}

impl LoadRequest {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            accept_language: None,
            org_site_cookie: None,
            debug_play_cookie: None,
            access_token: None,
        }
    }

    fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    fn query_param(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }
}

/// Cookie writes requested by the loader, applied in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieAction {
    SetOrgSiteName(String),
    ClearOrgSiteName,
}

/// Successful load: the layout plus any cookie writes
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub data: LayoutData,
    pub cookies: Vec<CookieAction>,
}

/// The visitor must go elsewhere (307 Temporary Redirect)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Redirect to {location}")]
pub struct LoadRedirect {
    pub location: String,
}

impl LoadRedirect {
    pub fn to(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
        }
    }
}

impl IntoResponse for LoadRedirect {
    fn into_response(self) -> Response {
        Redirect::temporary(&self.location).into_response()
    }
}

/// Result of checking a selfhosted visitor against an org
enum MemberAccess {
    Member(CurrentOrg),
    NotMember,
    /// No org behind the subdomain, or no valid session
    Unresolved,
}

/// Runs the layout decision procedure against an [`OrgDirectory`]
#[derive(Clone)]
pub struct LayoutLoader {
    config: Arc<Config>,
    resolver: HostResolver,
    directory: Arc<dyn OrgDirectory>,
}

impl LayoutLoader {
    pub fn new(config: Arc<Config>, directory: Arc<dyn OrgDirectory>) -> Self {
        let resolver = HostResolver::from_config(&config);
        Self {
            config,
            resolver,
            directory,
        }
    }

    pub fn directory(&self) -> &Arc<dyn OrgDirectory> {
        &self.directory
    }

    /// Load the layout for one request
    pub async fn load(&self, request: &LoadRequest) -> Result<LoadOutcome, LoadRedirect> {
        let mut data = LayoutData::new(
            &request.url,
            request.accept_language.clone().unwrap_or_default(),
            self.config.ssr_enabled(),
        );

        if self.config.is_selfhosted {
            // Selfhosted instances never go past this branch
            self.load_selfhosted(request, &mut data).await?;
            return Ok(LoadOutcome {
                data,
                cookies: Vec::new(),
            });
        }

        self.load_hosted(request, data).await
    }

    async fn load_selfhosted(
        &self,
        request: &LoadRequest,
        data: &mut LayoutData,
    ) -> Result<(), LoadRedirect> {
        let Some(subdomain) = self.resolver.subdomain(request.host()) else {
            return Ok(());
        };
        debug!(subdomain = %subdomain, "Resolving selfhosted organization");

        match self
            .member_access(&subdomain, request.access_token.as_deref())
            .await
        {
            Ok(MemberAccess::Member(org)) => {
                data.org = Some(org);
                data.is_org_site = true;
                data.org_site_name = subdomain;
                Ok(())
            }
            Ok(MemberAccess::NotMember) => {
                info!(subdomain = %subdomain, "User is not a member of organization, sending to main login");
                Err(LoadRedirect::to(self.config.main_login_url()))
            }
            Ok(MemberAccess::Unresolved) => Ok(()),
            Err(e) => {
                error!(subdomain = %subdomain, error = %e, "Error loading organization");
                Ok(())
            }
        }
    }

    async fn member_access(
        &self,
        subdomain: &str,
        access_token: Option<&str>,
    ) -> Result<MemberAccess, DirectoryError> {
        let Some(org) = self.find_by_site_name(subdomain).await? else {
            info!(subdomain = %subdomain, "Organization not found for subdomain");
            return Ok(MemberAccess::Unresolved);
        };

        let Some(token) = access_token.filter(|t| !t.is_empty()) else {
            debug!("No session found for organization access check");
            return Ok(MemberAccess::Unresolved);
        };

        let Some(user) = self.directory.session_user(token).await? else {
            debug!("Session rejected for organization access check");
            return Ok(MemberAccess::Unresolved);
        };

        if self.directory.is_member(org.id, user.id).await? {
            Ok(MemberAccess::Member(org))
        } else {
            Ok(MemberAccess::NotMember)
        }
    }

    async fn load_hosted(
        &self,
        request: &LoadRequest,
        mut data: LayoutData,
    ) -> Result<LoadOutcome, LoadRedirect> {
        let host = request.host();
        let is_local = is_local_host(host);
        let is_dev = self.config.dev_mode || is_local;
        let mut cookies = Vec::new();

        let mut org_site_cookie = request.org_site_cookie.clone().filter(|v| !v.is_empty());
        if is_local {
            if let Some(site_name) = request
                .query_param(ORG_QUERY_PARAM)
                .filter(|v| !v.is_empty())
            {
                debug!(site_name = %site_name, "Setting local organization override");
                cookies.push(CookieAction::SetOrgSiteName(site_name.clone()));
                org_site_cookie = Some(site_name);
            }
        }

        let debug_site_name = org_site_cookie.clone().filter(|v| v != "false");
        let debug_play = request.debug_play_cookie.as_deref() == Some("true");

        match self.resolver.classify(host) {
            HostClass::CustomDomain(domain) => {
                self.load_custom_domain(&domain, &mut data).await;
            }
            HostClass::AppSubdomain if debug_site_name.is_none() => {}
            class @ (HostClass::AppSubdomain | HostClass::OrgSubdomain(_)) => {
                // App hosts only get here with a local override naming the org
                let subdomain = match class {
                    HostClass::OrgSubdomain(subdomain) => subdomain,
                    _ => String::new(),
                };
                let has_cookie = org_site_cookie.is_some();
                let clear_cookie = self
                    .load_org_site(subdomain, debug_site_name, has_cookie, is_dev, &mut data)
                    .await?;
                if clear_cookie {
                    cookies.push(CookieAction::ClearOrgSiteName);
                }
            }
            HostClass::Blocked(subdomain) => {
                if subdomain == PLAY_SUBDOMAIN || debug_play {
                    data.skip_auth = true;
                } else if !self.resolver.is_app_subdomain(&subdomain) && !is_dev {
                    info!(subdomain = %subdomain, "Blocked subdomain, sending to main app");
                    return Err(LoadRedirect::to(self.config.main_app_url.clone()));
                }
            }
        }

        Ok(LoadOutcome { data, cookies })
    }

    async fn load_custom_domain(&self, domain: &str, data: &mut LayoutData) {
        match self.directory.org_by_custom_domain(domain).await {
            Ok(Some(org)) => {
                debug!(domain = %domain, org_id = %org.id, "Custom domain resolved");
                data.is_org_site = true;
                data.org_site_name = org.site_name.clone();
                data.org = Some(org);
            }
            Ok(None) => {
                warn!(domain = %domain, "Custom domain org not found, loading dashboard");
            }
            Err(e) => {
                error!(domain = %domain, error = %e, "Error loading custom domain org");
            }
        }
    }

    /// Org subdomain (or local override) branch.
    ///
    /// Returns Ok(true) when the override cookie should be cleared.
    async fn load_org_site(
        &self,
        subdomain: String,
        debug_site_name: Option<String>,
        has_override_cookie: bool,
        is_dev: bool,
        data: &mut LayoutData,
    ) -> Result<bool, LoadRedirect> {
        data.is_org_site = debug_site_name.is_some() || !subdomain.is_empty();
        data.org_site_name = debug_site_name.unwrap_or(subdomain);

        match self.find_by_site_name(&data.org_site_name).await {
            Ok(Some(org)) => {
                data.org = Some(org);
                Ok(false)
            }
            Ok(None) if !is_dev => {
                info!(site_name = %data.org_site_name, "Organization not found for subdomain");
                Err(LoadRedirect::to(self.config.org_not_found_url()))
            }
            Ok(None) => Ok(has_override_cookie),
            Err(e) => {
                error!(site_name = %data.org_site_name, error = %e, "Error loading organization");
                Ok(false)
            }
        }
    }

    async fn find_by_site_name(&self, site_name: &str) -> Result<Option<CurrentOrg>, DirectoryError> {
        if site_name.is_empty() {
            return Ok(None);
        }
        self.directory.org_by_site_name(site_name).await
    }
}
