use std::sync::Arc;

use tracing::info;

use crate::db::organization_repository::OrganizationRepository;
use crate::errors::AppError;
use crate::models::organization::{
    NewOrganization, Organization, OrganizationMembership, OrganizationRole,
};
use crate::models::user::SessionUser;
use crate::utils::slug::{slug_candidate, slugify};
use crate::utils::token::random_token;

pub const MIN_PASSCODE_LEN: usize = 4;
const MAX_SLUG_ATTEMPTS: usize = 20;

#[derive(Debug, Clone, Default)]
pub struct OrganizationDraft {
    pub name: String,
    pub passcode: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub theme: Option<String>,
}

/// Creating organizations and listing the ones a signed-in account belongs
/// to.
pub struct Onboarding {
    organizations: Arc<dyn OrganizationRepository>,
}

impl Onboarding {
    pub fn new(organizations: Arc<dyn OrganizationRepository>) -> Self {
        Self { organizations }
    }

    pub async fn my_organizations(
        &self,
        user: &SessionUser,
    ) -> Result<Vec<OrganizationMembership>, AppError> {
        Ok(self.organizations.list_memberships_for_user(user.id).await?)
    }

    /// Inserts the organization under a slug nobody has taken and makes the
    /// creator its admin.
    pub async fn create_organization(
        &self,
        user: &SessionUser,
        draft: OrganizationDraft,
    ) -> Result<Organization, AppError> {
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Organization name is required".into()));
        }
        if draft.passcode.trim().len() < MIN_PASSCODE_LEN {
            return Err(AppError::Validation(format!(
                "Passcode must be at least {MIN_PASSCODE_LEN} characters"
            )));
        }

        let slug = self.free_slug(name).await?;
        let organization = self
            .organizations
            .create_organization(&NewOrganization {
                name: name.to_string(),
                slug,
                description: draft.description,
                logo_url: draft.logo_url,
                theme: draft.theme,
                passcode: draft.passcode.trim().to_string(),
                created_by: user.id,
            })
            .await?;
        self.organizations
            .add_user_role(user.id, organization.id, OrganizationRole::Admin)
            .await?;

        info!(org_id = %organization.id, slug = %organization.slug, user_id = %user.id, "organization created");
        Ok(organization.sanitized())
    }

    async fn free_slug(&self, name: &str) -> Result<String, AppError> {
        let mut base = slugify(name);
        if base.is_empty() {
            base = format!("org-{}", &random_token()[..8]);
        }
        for attempt in 0..MAX_SLUG_ATTEMPTS {
            let candidate = slug_candidate(&base, attempt);
            if self.organizations.find_by_slug(&candidate).await?.is_none() {
                return Ok(candidate);
            }
        }
        Ok(format!("{base}-{}", &random_token()[..8]))
    }
}
