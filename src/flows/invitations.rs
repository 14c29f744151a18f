use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info};
use uuid::Uuid;

use crate::db::invitation_repository::InvitationRepository;
use crate::errors::AppError;
use crate::flows::invitation_accept::accept_path;
use crate::models::invitation::{NewInvitation, OrganizationInvitation, INVITATION_TTL_DAYS};
use crate::models::organization::{Organization, OrganizationRole};
use crate::models::user::SessionUser;
use crate::services::smtp_mailer::{InvitationEmail, Mailer};
use crate::utils::email::is_valid_email;
use crate::utils::token::random_token;

pub fn accept_url(app_origin: &str, token: &str) -> String {
    format!("{}{}", app_origin.trim_end_matches('/'), accept_path(token))
}

/// Admin side of invitations: issue, list, revoke.
pub struct InvitationAdmin {
    invitations: Arc<dyn InvitationRepository>,
    mailer: Arc<dyn Mailer>,
    app_origin: String,
}

impl InvitationAdmin {
    pub fn new(
        invitations: Arc<dyn InvitationRepository>,
        mailer: Arc<dyn Mailer>,
        app_origin: &str,
    ) -> Self {
        Self {
            invitations,
            mailer,
            app_origin: app_origin.to_string(),
        }
    }

    /// Stores a fresh pending invitation and emails its link. The invitation
    /// stands even if the email cannot be sent; the admin can share the link
    /// by hand.
    pub async fn invite_member(
        &self,
        organization: &Organization,
        email: &str,
        role: OrganizationRole,
        inviter: &SessionUser,
    ) -> Result<OrganizationInvitation, AppError> {
        let email = email.trim();
        if !is_valid_email(email) {
            return Err(AppError::Validation(format!(
                "{email} is not a valid email address"
            )));
        }

        let new = NewInvitation::pending(
            organization.id,
            email,
            role,
            random_token(),
            inviter.id,
            Utc::now(),
        );
        let invitation = self.invitations.create_invitation(&new).await?;
        info!(org_id = %organization.id, invitation_id = %invitation.id, role = role.as_str(), "invitation created");

        let message = InvitationEmail {
            to: invitation.email.clone(),
            organization_name: organization.name.clone(),
            role: role.as_str().to_string(),
            accept_url: accept_url(&self.app_origin, &invitation.token),
            expires_in_days: INVITATION_TTL_DAYS,
        };
        if let Err(err) = self.mailer.send_invitation_email(&message).await {
            error!(invitation_id = %invitation.id, %err, "invitation email failed");
        }
        Ok(invitation)
    }

    pub async fn list_invitations(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<OrganizationInvitation>, AppError> {
        Ok(self.invitations.list_invitations(organization_id).await?)
    }

    pub async fn revoke_invitation(&self, invitation_id: Uuid) -> Result<(), AppError> {
        self.invitations.delete_invitation(invitation_id).await?;
        info!(%invitation_id, "invitation revoked");
        Ok(())
    }
}
