//! Common types used across the dashboard services

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// ID Wrappers
// =============================================================================

/// Organization ID wrapper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrgId(pub Uuid);

impl OrgId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OrgId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for OrgId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for OrgId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// User (profile) ID wrapper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for UserId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

// =============================================================================
// Organization
// =============================================================================

/// Organization record as stored in the `organization` table.
///
/// Field names follow the table's column names so the same struct can be
/// decoded from the REST API and handed to the page tier unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentOrg {
    pub id: OrgId,
    pub name: String,
    #[serde(rename = "siteName")]
    pub site_name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(rename = "customDomain", default)]
    pub custom_domain: Option<String>,
    #[serde(rename = "isCustomDomainVerified", default)]
    pub is_custom_domain_verified: bool,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub favicon: Option<String>,
    #[serde(default)]
    pub landingpage: Option<serde_json::Value>,
    #[serde(default)]
    pub customization: Option<serde_json::Value>,
    #[serde(default)]
    pub is_restricted: bool,
}

/// Columns requested when fetching a [`CurrentOrg`]
pub const CURRENT_ORG_COLUMNS: &str = "id,name,siteName,avatar_url,customDomain,isCustomDomainVerified,theme,favicon,landingpage,customization,is_restricted";

// =============================================================================
// Session
// =============================================================================

/// Authenticated user behind an access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_current_org_decodes_minimal_row() {
        let row = r#"{
            "id": "5b3c2f0e-8d1a-4c1b-9d53-0c8f1f0a2b11",
            "name": "Acme Academy",
            "siteName": "acme"
        }"#;

        let org: CurrentOrg = serde_json::from_str(row).unwrap();
        assert_eq!(org.site_name, "acme");
        assert_eq!(org.custom_domain, None);
        assert!(!org.is_custom_domain_verified);
        assert!(!org.is_restricted);
    }

    #[test]
    fn test_current_org_keeps_column_names_when_serialized() {
        let org = CurrentOrg {
            id: OrgId::new(),
            name: "Acme".to_string(),
            site_name: "acme".to_string(),
            avatar_url: None,
            custom_domain: Some("learn.acme.com".to_string()),
            is_custom_domain_verified: true,
            theme: None,
            favicon: None,
            landingpage: None,
            customization: None,
            is_restricted: false,
        };

        let value = serde_json::to_value(&org).unwrap();
        assert_eq!(value["siteName"], "acme");
        assert_eq!(value["customDomain"], "learn.acme.com");
        assert_eq!(value["isCustomDomainVerified"], true);
    }

    #[test]
    fn test_session_user_without_email() {
        let user: SessionUser =
            serde_json::from_str(r#"{"id":"0f0c7d7c-6f53-4a43-8d83-3d0d3a4d3a5e"}"#).unwrap();
        assert!(user.email.is_none());
    }
}
