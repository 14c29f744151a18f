use async_trait::async_trait;
use uuid::Uuid;

use crate::db::rest_client::BackendError;
use crate::models::invitation::{NewInvitation, OrganizationInvitation};

#[async_trait]
pub trait InvitationRepository: Send + Sync {
    async fn create_invitation(
        &self,
        invitation: &NewInvitation,
    ) -> Result<OrganizationInvitation, BackendError>;

    /// Only invitations still in the `pending` state are returned.
    async fn find_pending_by_token(
        &self,
        token: &str,
    ) -> Result<Option<OrganizationInvitation>, BackendError>;

    /// An invitation that has already been used. Lets a repeated acceptance
    /// resolve to "already a member" instead of "invalid token".
    async fn find_accepted_by_token(
        &self,
        token: &str,
    ) -> Result<Option<OrganizationInvitation>, BackendError>;

    async fn mark_accepted(&self, invitation_id: Uuid) -> Result<(), BackendError>;

    async fn list_invitations(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<OrganizationInvitation>, BackendError>;

    async fn delete_invitation(&self, invitation_id: Uuid) -> Result<(), BackendError>;
}
