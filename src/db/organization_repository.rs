use async_trait::async_trait;
use uuid::Uuid;

use crate::db::rest_client::BackendError;
use crate::models::organization::{
    NewOrganization, Organization, OrganizationMembership, OrganizationRole, OrganizationUpdate,
    UserRole,
};

#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    async fn find_by_id(&self, organization_id: Uuid) -> Result<Option<Organization>, BackendError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Organization>, BackendError>;

    async fn list_memberships_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<OrganizationMembership>, BackendError>;

    async fn create_organization(
        &self,
        organization: &NewOrganization,
    ) -> Result<Organization, BackendError>;

    async fn update_organization(
        &self,
        organization_id: Uuid,
        update: &OrganizationUpdate,
    ) -> Result<Organization, BackendError>;

    async fn delete_organization(&self, organization_id: Uuid) -> Result<(), BackendError>;

    /// Server-side passcode check. The stored passcode never reaches this
    /// process; only the verdict does.
    async fn verify_passcode(
        &self,
        organization_id: Uuid,
        passcode: &str,
    ) -> Result<bool, BackendError>;

    async fn find_user_role(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
    ) -> Result<Option<UserRole>, BackendError>;

    async fn add_user_role(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
        role: OrganizationRole,
    ) -> Result<UserRole, BackendError>;

    async fn list_members(&self, organization_id: Uuid) -> Result<Vec<UserRole>, BackendError>;
}
