use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Column names that must never leave memory in a persisted organization.
const SECRET_KEYS: [&str; 2] = ["passcode", "passcode_hash"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrganizationRole {
    Admin,
    Manager,
    Viewer,
}

impl OrganizationRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrganizationRole::Admin => "admin",
            OrganizationRole::Manager => "manager",
            OrganizationRole::Viewer => "viewer",
        }
    }

    pub fn can_edit(&self) -> bool {
        matches!(self, OrganizationRole::Admin | OrganizationRole::Manager)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub plan: Option<String>,
    #[serde(default)]
    pub subscription_status: Option<String>,
    #[serde(default)]
    pub enabled_pages: Option<Vec<String>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Columns this client does not model yet, kept so a round trip through
    /// local storage does not lose them.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Organization {
    /// Copy of the organization with every secret column removed.
    pub fn sanitized(&self) -> Organization {
        let mut copy = self.clone();
        for key in SECRET_KEYS {
            copy.extra.remove(key);
        }
        copy
    }

    pub fn is_page_enabled(&self, page: &str) -> bool {
        match &self.enabled_pages {
            Some(pages) => pages.iter().any(|p| p.eq_ignore_ascii_case(page)),
            None => true,
        }
    }
}

/// Insert payload. The passcode is write-only: it is sent once and never
/// selected back.
#[derive(Debug, Clone, Serialize)]
pub struct NewOrganization {
    pub name: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    pub passcode: String,
    pub created_by: Uuid,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct OrganizationUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled_pages: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRole {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub user_id: Uuid,
    pub organization_id: Uuid,
    pub role: OrganizationRole,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationMembership {
    pub role: OrganizationRole,
    #[serde(rename = "organizations")]
    pub organization: Organization,
}

#[cfg(test)]
pub(crate) fn sample_organization(slug: &str) -> Organization {
    Organization {
        id: Uuid::new_v4(),
        name: format!("{slug} committee"),
        slug: slug.to_string(),
        description: None,
        logo_url: None,
        theme: None,
        plan: Some("free".into()),
        subscription_status: None,
        enabled_pages: None,
        created_at: None,
        updated_at: None,
        extra: Map::new(),
    }
}
