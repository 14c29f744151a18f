use async_trait::async_trait;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::db::invitation_repository::InvitationRepository;
use crate::db::rest_client::{BackendClient, BackendError};
use crate::models::invitation::{InvitationStatus, NewInvitation, OrganizationInvitation};

pub struct RestInvitationRepository {
    pub client: BackendClient,
}

#[async_trait]
impl InvitationRepository for RestInvitationRepository {
    async fn create_invitation(
        &self,
        invitation: &NewInvitation,
    ) -> Result<OrganizationInvitation, BackendError> {
        self.client
            .from("organization_invitations")
            .insert(invitation)
            .await
    }

    async fn find_pending_by_token(
        &self,
        token: &str,
    ) -> Result<Option<OrganizationInvitation>, BackendError> {
        self.client
            .from("organization_invitations")
            .select("*")
            .eq("token", token)
            .eq("status", InvitationStatus::Pending.as_str())
            .maybe_single()
            .await
    }

    async fn find_accepted_by_token(
        &self,
        token: &str,
    ) -> Result<Option<OrganizationInvitation>, BackendError> {
        self.client
            .from("organization_invitations")
            .select("*")
            .eq("token", token)
            .eq("status", InvitationStatus::Accepted.as_str())
            .maybe_single()
            .await
    }

    async fn mark_accepted(&self, invitation_id: Uuid) -> Result<(), BackendError> {
        let _: Vec<Value> = self
            .client
            .from("organization_invitations")
            .eq("id", invitation_id)
            .update(&json!({ "status": InvitationStatus::Accepted }))
            .await?;
        Ok(())
    }

    async fn list_invitations(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<OrganizationInvitation>, BackendError> {
        self.client
            .from("organization_invitations")
            .select("*")
            .eq("organization_id", organization_id)
            .order("created_at", false)
            .fetch()
            .await
    }

    async fn delete_invitation(&self, invitation_id: Uuid) -> Result<(), BackendError> {
        self.client
            .from("organization_invitations")
            .eq("id", invitation_id)
            .delete()
            .await
    }
}
