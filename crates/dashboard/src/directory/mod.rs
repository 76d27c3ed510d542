//! Organization directory
//!
//! The dashboard never owns organization data. Everything it needs to know
//! about a tenant (does the org exist, is this user a member) comes from the
//! backend through [`OrgDirectory`].

mod cached;
mod supabase;

use async_trait::async_trait;
use lms_shared::{CurrentOrg, OrgId, SessionUser, UserId};

pub use cached::CachedDirectory;
pub use supabase::SupabaseDirectory;

/// Read-only view of organizations, sessions and memberships
#[async_trait]
pub trait OrgDirectory: Send + Sync {
    /// Find an organization by its site name (the subdomain label)
    async fn org_by_site_name(&self, site_name: &str) -> Result<Option<CurrentOrg>, DirectoryError>;

    /// Find an organization by a verified custom domain
    async fn org_by_custom_domain(&self, host: &str) -> Result<Option<CurrentOrg>, DirectoryError>;

    /// Resolve an access token to its user. Ok(None) means no valid session.
    async fn session_user(&self, access_token: &str) -> Result<Option<SessionUser>, DirectoryError>;

    /// Whether the user belongs to the organization
    async fn is_member(&self, org_id: OrgId, user_id: UserId) -> Result<bool, DirectoryError>;

    /// Cheap reachability check used by the readiness probe
    async fn health_check(&self) -> Result<(), DirectoryError>;
}

/// Errors that can occur while talking to the directory backend
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for DirectoryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            DirectoryError::Decode(err.to_string())
        } else {
            DirectoryError::Request(err.to_string())
        }
    }
}
