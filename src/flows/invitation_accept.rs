use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::context::session::{sign_in_url, SessionContext};
use crate::db::invitation_repository::InvitationRepository;
use crate::db::organization_repository::OrganizationRepository;
use crate::errors::AppError;
use crate::models::invitation::OrganizationInvitation;
use crate::models::organization::OrganizationRole;
use crate::models::user::SessionUser;

pub const ACCEPT_PATH: &str = "/invite/accept";
pub const ORGANIZATIONS_PATH: &str = "/organizations";
pub const SUCCESS_REDIRECT_DELAY: Duration = Duration::from_secs(3);

pub fn accept_path(token: &str) -> String {
    format!("{ACCEPT_PATH}?token={}", urlencoding::encode(token))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcceptError {
    InvalidToken,
    EmailMismatch,
    /// Backend failure, already reduced to a user-facing message.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AcceptState {
    Loading,
    /// Not signed in. The caller navigates to `sign_in_url`; `return_to`
    /// has been remembered for after sign-in.
    RedirectToSignIn { sign_in_url: String, return_to: String },
    Success {
        organization_id: Uuid,
        role: OrganizationRole,
        already_member: bool,
        redirect_to: &'static str,
        redirect_after: Duration,
    },
    Expired,
    Error(AcceptError),
}

impl AcceptState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, AcceptState::Loading)
    }

    fn success(invitation: &OrganizationInvitation, already_member: bool) -> Self {
        AcceptState::Success {
            organization_id: invitation.organization_id,
            role: invitation.role,
            already_member,
            redirect_to: ORGANIZATIONS_PATH,
            redirect_after: SUCCESS_REDIRECT_DELAY,
        }
    }
}

impl From<AppError> for AcceptState {
    fn from(err: AppError) -> Self {
        AcceptState::Error(AcceptError::Failed(err.user_message()))
    }
}

/// Accepting an invitation link: one linear pass from `Loading` to a
/// terminal state.
pub struct InvitationAcceptance {
    session: Arc<SessionContext>,
    invitations: Arc<dyn InvitationRepository>,
    organizations: Arc<dyn OrganizationRepository>,
    state: RwLock<AcceptState>,
}

impl InvitationAcceptance {
    pub fn new(
        session: Arc<SessionContext>,
        invitations: Arc<dyn InvitationRepository>,
        organizations: Arc<dyn OrganizationRepository>,
    ) -> Self {
        Self {
            session,
            invitations,
            organizations,
            state: RwLock::new(AcceptState::Loading),
        }
    }

    pub async fn state(&self) -> AcceptState {
        self.state.read().await.clone()
    }

    pub async fn accept(&self, token: Option<&str>) -> AcceptState {
        *self.state.write().await = AcceptState::Loading;
        let next = self.run(token.map(str::trim).unwrap_or_default()).await;
        *self.state.write().await = next.clone();
        next
    }

    async fn run(&self, token: &str) -> AcceptState {
        if token.is_empty() {
            return AcceptState::Error(AcceptError::InvalidToken);
        }

        let Some(user) = self.session.current_user().await else {
            let return_to = accept_path(token);
            if let Err(err) = self.session.remember_return_to(&return_to) {
                warn!(%err, "could not remember invitation link across sign-in");
            }
            return AcceptState::RedirectToSignIn {
                sign_in_url: sign_in_url(&return_to),
                return_to,
            };
        };

        let invitation = match self.invitations.find_pending_by_token(token).await {
            Ok(Some(invitation)) => invitation,
            Ok(None) => return self.already_used(token, &user).await,
            Err(err) => {
                error!(%err, "invitation lookup failed");
                return AppError::from(err).into();
            }
        };

        if invitation.is_expired(Utc::now()) {
            info!(invitation_id = %invitation.id, "invitation expired");
            return AcceptState::Expired;
        }

        if !user
            .email
            .as_deref()
            .is_some_and(|email| invitation.is_for_email(email))
        {
            warn!(invitation_id = %invitation.id, user_id = %user.id, "invitation email mismatch");
            return AcceptState::Error(AcceptError::EmailMismatch);
        }

        match self
            .organizations
            .find_user_role(user.id, invitation.organization_id)
            .await
        {
            Ok(Some(_)) => {
                info!(org_id = %invitation.organization_id, user_id = %user.id, "already a member");
                return AcceptState::success(&invitation, true);
            }
            Ok(None) => {}
            Err(err) => {
                error!(%err, "membership lookup failed");
                return AppError::from(err).into();
            }
        }

        if let Err(err) = self
            .organizations
            .add_user_role(user.id, invitation.organization_id, invitation.role)
            .await
        {
            error!(%err, "could not add member role");
            return AppError::from(err).into();
        }
        if let Err(err) = self.invitations.mark_accepted(invitation.id).await {
            error!(invitation_id = %invitation.id, %err, "could not mark invitation accepted");
            return AppError::from(err).into();
        }

        info!(org_id = %invitation.organization_id, user_id = %user.id, role = invitation.role.as_str(), "invitation accepted");
        AcceptState::success(&invitation, false)
    }

    /// A token that is no longer pending is only good for the account that
    /// already used it.
    async fn already_used(&self, token: &str, user: &SessionUser) -> AcceptState {
        let used = match self.invitations.find_accepted_by_token(token).await {
            Ok(Some(invitation)) => invitation,
            Ok(None) => return AcceptState::Error(AcceptError::InvalidToken),
            Err(err) => {
                error!(%err, "invitation lookup failed");
                return AppError::from(err).into();
            }
        };
        let email_matches = user
            .email
            .as_deref()
            .is_some_and(|email| used.is_for_email(email));
        if !email_matches {
            return AcceptState::Error(AcceptError::InvalidToken);
        }
        match self
            .organizations
            .find_user_role(user.id, used.organization_id)
            .await
        {
            Ok(Some(_)) => AcceptState::success(&used, true),
            Ok(None) => AcceptState::Error(AcceptError::InvalidToken),
            Err(err) => {
                error!(%err, "membership lookup failed");
                AppError::from(err).into()
            }
        }
    }
}
