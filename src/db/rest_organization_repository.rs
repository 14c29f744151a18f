use async_trait::async_trait;
use serde_json::json;
use uuid::Uuid;

use crate::db::organization_repository::OrganizationRepository;
use crate::db::rest_client::{BackendClient, BackendError};
use crate::models::organization::{
    NewOrganization, Organization, OrganizationMembership, OrganizationRole, OrganizationUpdate,
    UserRole,
};

/// Public columns only; the passcode column is never requested.
pub const ORGANIZATION_COLUMNS: &str = "id,name,slug,description,logo_url,theme,plan,subscription_status,enabled_pages,created_at,updated_at";

pub struct RestOrganizationRepository {
    pub client: BackendClient,
}

#[async_trait]
impl OrganizationRepository for RestOrganizationRepository {
    async fn find_by_id(&self, organization_id: Uuid) -> Result<Option<Organization>, BackendError> {
        self.client
            .from("organizations")
            .select(ORGANIZATION_COLUMNS)
            .eq("id", organization_id)
            .maybe_single()
            .await
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Organization>, BackendError> {
        self.client
            .from("organizations")
            .select(ORGANIZATION_COLUMNS)
            .eq("slug", slug)
            .maybe_single()
            .await
    }

    async fn list_memberships_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<OrganizationMembership>, BackendError> {
        self.client
            .from("user_roles")
            .select(&format!("role,organizations({ORGANIZATION_COLUMNS})"))
            .eq("user_id", user_id)
            .order("created_at", false)
            .fetch()
            .await
    }

    async fn create_organization(
        &self,
        organization: &NewOrganization,
    ) -> Result<Organization, BackendError> {
        self.client
            .from("organizations")
            .select(ORGANIZATION_COLUMNS)
            .insert(organization)
            .await
    }

    async fn update_organization(
        &self,
        organization_id: Uuid,
        update: &OrganizationUpdate,
    ) -> Result<Organization, BackendError> {
        let rows: Vec<Organization> = self
            .client
            .from("organizations")
            .select(ORGANIZATION_COLUMNS)
            .eq("id", organization_id)
            .update(update)
            .await?;
        rows.into_iter().next().ok_or_else(|| {
            BackendError::InvalidResponse(format!("organization {organization_id} not updated"))
        })
    }

    async fn delete_organization(&self, organization_id: Uuid) -> Result<(), BackendError> {
        self.client
            .from("organizations")
            .eq("id", organization_id)
            .delete()
            .await
    }

    async fn verify_passcode(
        &self,
        organization_id: Uuid,
        passcode: &str,
    ) -> Result<bool, BackendError> {
        self.client
            .rpc(
                "verify_organization_passcode",
                &json!({ "org_id": organization_id, "passcode": passcode }),
            )
            .await
    }

    async fn find_user_role(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
    ) -> Result<Option<UserRole>, BackendError> {
        self.client
            .from("user_roles")
            .select("*")
            .eq("user_id", user_id)
            .eq("organization_id", organization_id)
            .maybe_single()
            .await
    }

    async fn add_user_role(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
        role: OrganizationRole,
    ) -> Result<UserRole, BackendError> {
        self.client
            .from("user_roles")
            .insert(&json!({
                "user_id": user_id,
                "organization_id": organization_id,
                "role": role,
            }))
            .await
    }

    async fn list_members(&self, organization_id: Uuid) -> Result<Vec<UserRole>, BackendError> {
        self.client
            .from("user_roles")
            .select("*")
            .eq("organization_id", organization_id)
            .order("created_at", true)
            .fetch()
            .await
    }
}
