//! Supabase-backed directory
//!
//! Organizations and memberships are read through PostgREST
//! (`/rest/v1/...`), sessions are validated against GoTrue (`/auth/v1/user`).

use std::time::Duration;

use async_trait::async_trait;
use lms_shared::{CurrentOrg, OrgId, SessionUser, UserId, CURRENT_ORG_COLUMNS};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{DirectoryError, OrgDirectory};

/// Upper bound for a single backend call
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the Supabase REST and auth APIs
#[derive(Clone)]
pub struct SupabaseDirectory {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct SupabaseUser {
    id: String,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MemberRow {
    #[allow(dead_code)] // Only the row's presence matters
    id: serde_json::Value,
}

impl SupabaseDirectory {
    /// Create a client with its own connection pool
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, DirectoryError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| DirectoryError::Request(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(client, base_url, api_key))
    }

    /// Create a client on top of an existing reqwest client
    pub fn with_client(client: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .header("apikey", &self.api_key)
    }

    /// GET from PostgREST with the service key as bearer
    fn rest(&self, table: &str) -> RequestBuilder {
        self.get(&format!("/rest/v1/{}", table))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Accept", "application/json")
    }

    async fn first_org(&self, filters: &[(&str, String)]) -> Result<Option<CurrentOrg>, DirectoryError> {
        let mut query: Vec<(&str, String)> = vec![
            ("select", CURRENT_ORG_COLUMNS.to_string()),
            ("limit", "1".to_string()),
        ];
        query.extend(filters.iter().cloned());

        let response = self.rest("organization").query(&query).send().await?;
        let rows: Vec<CurrentOrg> = ensure_success(response).await?.json().await?;
        Ok(rows.into_iter().next())
    }
}

#[async_trait]
impl OrgDirectory for SupabaseDirectory {
    async fn org_by_site_name(&self, site_name: &str) -> Result<Option<CurrentOrg>, DirectoryError> {
        self.first_org(&[("siteName", format!("eq.{}", site_name))]).await
    }

    async fn org_by_custom_domain(&self, host: &str) -> Result<Option<CurrentOrg>, DirectoryError> {
        self.first_org(&[
            ("customDomain", format!("eq.{}", host)),
            ("isCustomDomainVerified", "eq.true".to_string()),
        ])
        .await
    }

    async fn session_user(&self, access_token: &str) -> Result<Option<SessionUser>, DirectoryError> {
        let response = self
            .get("/auth/v1/user")
            .header("Authorization", format!("Bearer {}", access_token))
            .send()
            .await?;

        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            debug!(status = %response.status(), "Access token rejected by auth endpoint");
            return Ok(None);
        }

        let user: SupabaseUser = ensure_success(response).await?.json().await?;
        let id = Uuid::parse_str(&user.id).map_err(|e| {
            warn!(user_id = %user.id, "Auth endpoint returned a non-UUID user id");
            DirectoryError::Decode(e.to_string())
        })?;

        Ok(Some(SessionUser {
            id: UserId(id),
            email: user.email,
        }))
    }

    async fn is_member(&self, org_id: OrgId, user_id: UserId) -> Result<bool, DirectoryError> {
        let response = self
            .rest("organizationmember")
            .query(&[
                ("select", "id".to_string()),
                ("organization_id", format!("eq.{}", org_id)),
                ("profile_id", format!("eq.{}", user_id)),
                ("limit", "1".to_string()),
            ])
            .send()
            .await?;

        let rows: Vec<MemberRow> = ensure_success(response).await?.json().await?;
        Ok(!rows.is_empty())
    }

    async fn health_check(&self) -> Result<(), DirectoryError> {
        let response = self.get("/auth/v1/health").send().await?;
        ensure_success(response).await.map(|_| ())
    }
}

/// Turn a non-2xx response into [`DirectoryError::Status`]
async fn ensure_success(response: Response) -> Result<Response, DirectoryError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(DirectoryError::Status {
        status: status.as_u16(),
        body,
    })
}
