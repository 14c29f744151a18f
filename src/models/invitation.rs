use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::organization::OrganizationRole;

pub const INVITATION_TTL_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    Pending,
    Accepted,
}

impl InvitationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvitationStatus::Pending => "pending",
            InvitationStatus::Accepted => "accepted",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizationInvitation {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub email: String,
    pub role: OrganizationRole,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub status: InvitationStatus,
    #[serde(default)]
    pub invited_by: Option<Uuid>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl OrganizationInvitation {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }

    pub fn is_for_email(&self, email: &str) -> bool {
        self.email.trim().eq_ignore_ascii_case(email.trim())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewInvitation {
    pub organization_id: Uuid,
    pub email: String,
    pub role: OrganizationRole,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub status: InvitationStatus,
    pub invited_by: Uuid,
}

impl NewInvitation {
    pub fn pending(
        organization_id: Uuid,
        email: &str,
        role: OrganizationRole,
        token: String,
        invited_by: Uuid,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            organization_id,
            email: email.trim().to_lowercase(),
            role,
            token,
            expires_at: now + Duration::days(INVITATION_TTL_DAYS),
            status: InvitationStatus::Pending,
            invited_by,
        }
    }
}
