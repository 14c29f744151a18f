use async_trait::async_trait;
use chrono::Utc;
use reqwest::StatusCode;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::db::audit_log_repository::AuditLogRepository;
use crate::db::donation_repository::DonationRepository;
use crate::db::expense_repository::ExpenseRepository;
use crate::db::festival_repository::FestivalRepository;
use crate::db::image_repository::ImageRepository;
use crate::db::invitation_repository::InvitationRepository;
use crate::db::organization_repository::OrganizationRepository;
use crate::db::rest_client::BackendError;
use crate::db::settings_repository::SettingsRepository;
use crate::models::audit_log::AuditLog;
use crate::models::donation::{Donation, DonationCategory, DonationUpdate, NewDonation};
use crate::models::expense::{Expense, ExpenseUpdate, NewExpense};
use crate::models::festival::{Festival, FestivalUpdate, NewFestival};
use crate::models::image::{ImageRecord, NewImageRecord};
use crate::models::invitation::{InvitationStatus, NewInvitation, OrganizationInvitation};
use crate::models::organization::{
    NewOrganization, Organization, OrganizationMembership, OrganizationRole, OrganizationUpdate,
    UserRole,
};
use crate::models::setting::Setting;

/// In-memory stand-in for the hosted backend, shared by context and flow
/// tests.
#[derive(Default)]
pub struct MockDb {
    pub organizations: Mutex<Vec<Organization>>,
    pub passcodes: Mutex<HashMap<Uuid, String>>,
    pub user_roles: Mutex<Vec<UserRole>>,
    pub invitations: Mutex<Vec<OrganizationInvitation>>,
    pub festivals: Mutex<Vec<Festival>>,
    pub donations: Mutex<Vec<Donation>>,
    pub expenses: Mutex<Vec<Expense>>,
    pub images: Mutex<Vec<ImageRecord>>,
    pub settings: Mutex<Vec<Setting>>,
    pub audit_logs: Mutex<Vec<AuditLog>>,
    pub verify_calls: Mutex<usize>,
    pub festival_lookups: Mutex<usize>,
    pub should_fail: bool,
}

impl MockDb {
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Default::default()
        }
    }

    pub fn with_organization(self, org: Organization, passcode: &str) -> Self {
        self.passcodes
            .lock()
            .unwrap()
            .insert(org.id, passcode.to_string());
        self.organizations.lock().unwrap().push(org);
        self
    }

    fn check(&self) -> Result<(), BackendError> {
        if self.should_fail {
            return Err(BackendError::Api {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: "Mock DB failure".into(),
                code: None,
            });
        }
        Ok(())
    }

    fn missing(what: &str, id: Uuid) -> BackendError {
        BackendError::Api {
            status: StatusCode::NOT_FOUND,
            message: format!("{what} {id} not found"),
            code: None,
        }
    }
}

fn merge(target: &mut Value, patch: Value) {
    if let (Value::Object(target), Value::Object(patch)) = (target, patch) {
        for (k, v) in patch {
            target.insert(k, v);
        }
    }
}

fn patched<T, P>(row: &T, patch: &P) -> Result<T, BackendError>
where
    T: serde::Serialize + serde::de::DeserializeOwned,
    P: serde::Serialize,
{
    let mut value =
        serde_json::to_value(row).map_err(|e| BackendError::InvalidResponse(e.to_string()))?;
    let patch =
        serde_json::to_value(patch).map_err(|e| BackendError::InvalidResponse(e.to_string()))?;
    merge(&mut value, patch);
    serde_json::from_value(value).map_err(|e| BackendError::InvalidResponse(e.to_string()))
}

#[async_trait]
impl OrganizationRepository for MockDb {
    async fn find_by_id(&self, organization_id: Uuid) -> Result<Option<Organization>, BackendError> {
        self.check()?;
        Ok(self
            .organizations
            .lock()
            .unwrap()
            .iter()
            .find(|o| o.id == organization_id)
            .cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Organization>, BackendError> {
        self.check()?;
        Ok(self
            .organizations
            .lock()
            .unwrap()
            .iter()
            .find(|o| o.slug == slug)
            .cloned())
    }

    async fn list_memberships_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<OrganizationMembership>, BackendError> {
        self.check()?;
        let orgs = self.organizations.lock().unwrap();
        Ok(self
            .user_roles
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == user_id)
            .filter_map(|r| {
                orgs.iter()
                    .find(|o| o.id == r.organization_id)
                    .map(|o| OrganizationMembership {
                        role: r.role,
                        organization: o.clone(),
                    })
            })
            .collect())
    }

    async fn create_organization(
        &self,
        organization: &NewOrganization,
    ) -> Result<Organization, BackendError> {
        self.check()?;
        let mut orgs = self.organizations.lock().unwrap();
        if orgs.iter().any(|o| o.slug == organization.slug) {
            return Err(BackendError::Api {
                status: StatusCode::CONFLICT,
                message: "duplicate key value violates unique constraint".into(),
                code: Some("23505".into()),
            });
        }
        let org = Organization {
            id: Uuid::new_v4(),
            name: organization.name.clone(),
            slug: organization.slug.clone(),
            description: organization.description.clone(),
            logo_url: organization.logo_url.clone(),
            theme: organization.theme.clone(),
            plan: Some("free".into()),
            subscription_status: None,
            enabled_pages: None,
            created_at: Some(Utc::now()),
            updated_at: None,
            extra: Default::default(),
        };
        self.passcodes
            .lock()
            .unwrap()
            .insert(org.id, organization.passcode.clone());
        orgs.push(org.clone());
        Ok(org)
    }

    async fn update_organization(
        &self,
        organization_id: Uuid,
        update: &OrganizationUpdate,
    ) -> Result<Organization, BackendError> {
        self.check()?;
        let mut orgs = self.organizations.lock().unwrap();
        let org = orgs
            .iter_mut()
            .find(|o| o.id == organization_id)
            .ok_or_else(|| Self::missing("organization", organization_id))?;
        *org = patched(&*org, update)?;
        Ok(org.clone())
    }

    async fn delete_organization(&self, organization_id: Uuid) -> Result<(), BackendError> {
        self.check()?;
        self.organizations
            .lock()
            .unwrap()
            .retain(|o| o.id != organization_id);
        Ok(())
    }

    async fn verify_passcode(
        &self,
        organization_id: Uuid,
        passcode: &str,
    ) -> Result<bool, BackendError> {
        *self.verify_calls.lock().unwrap() += 1;
        self.check()?;
        Ok(self
            .passcodes
            .lock()
            .unwrap()
            .get(&organization_id)
            .map(|stored| stored == passcode)
            .unwrap_or(false))
    }

    async fn find_user_role(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
    ) -> Result<Option<UserRole>, BackendError> {
        self.check()?;
        Ok(self
            .user_roles
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.user_id == user_id && r.organization_id == organization_id)
            .cloned())
    }

    async fn add_user_role(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
        role: OrganizationRole,
    ) -> Result<UserRole, BackendError> {
        self.check()?;
        let row = UserRole {
            id: Some(Uuid::new_v4()),
            user_id,
            organization_id,
            role,
            created_at: Some(Utc::now()),
        };
        self.user_roles.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn list_members(&self, organization_id: Uuid) -> Result<Vec<UserRole>, BackendError> {
        self.check()?;
        Ok(self
            .user_roles
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.organization_id == organization_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl FestivalRepository for MockDb {
    async fn list_festivals(&self, organization_id: Uuid) -> Result<Vec<Festival>, BackendError> {
        self.check()?;
        Ok(self
            .festivals
            .lock()
            .unwrap()
            .iter()
            .filter(|f| f.organization_id == Some(organization_id))
            .cloned()
            .collect())
    }

    async fn find_by_name_and_year(
        &self,
        organization_id: Option<Uuid>,
        name: &str,
        year: i32,
    ) -> Result<Vec<Festival>, BackendError> {
        *self.festival_lookups.lock().unwrap() += 1;
        self.check()?;
        Ok(self
            .festivals
            .lock()
            .unwrap()
            .iter()
            .filter(|f| f.name == name && f.year == year)
            .filter(|f| organization_id.is_none() || f.organization_id == organization_id)
            .take(2)
            .cloned()
            .collect())
    }

    async fn find_active(&self, organization_id: Uuid) -> Result<Option<Festival>, BackendError> {
        self.check()?;
        Ok(self
            .festivals
            .lock()
            .unwrap()
            .iter()
            .find(|f| f.organization_id == Some(organization_id) && f.is_active)
            .cloned())
    }

    async fn create_festival(&self, festival: &NewFestival) -> Result<Festival, BackendError> {
        self.check()?;
        let row = Festival {
            id: Some(Uuid::new_v4()),
            organization_id: Some(festival.organization_id),
            name: festival.name.clone(),
            year: festival.year,
            background_image: festival.background_image.clone(),
            background_color: festival.background_color.clone(),
            is_active: festival.is_active,
            start_date: festival.start_date,
            end_date: festival.end_date,
            created_at: Some(Utc::now()),
        };
        self.festivals.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn update_festival(
        &self,
        festival_id: Uuid,
        update: &FestivalUpdate,
    ) -> Result<Festival, BackendError> {
        self.check()?;
        let mut festivals = self.festivals.lock().unwrap();
        let row = festivals
            .iter_mut()
            .find(|f| f.id == Some(festival_id))
            .ok_or_else(|| Self::missing("festival", festival_id))?;
        *row = patched(&*row, update)?;
        Ok(row.clone())
    }

    async fn delete_festival(&self, festival_id: Uuid) -> Result<(), BackendError> {
        self.check()?;
        self.festivals
            .lock()
            .unwrap()
            .retain(|f| f.id != Some(festival_id));
        Ok(())
    }
}

#[async_trait]
impl DonationRepository for MockDb {
    async fn list_donations(
        &self,
        festival_id: Uuid,
        category: Option<DonationCategory>,
    ) -> Result<Vec<Donation>, BackendError> {
        self.check()?;
        Ok(self
            .donations
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.festival_id == Some(festival_id))
            .filter(|d| category.map_or(true, |c| d.category == c))
            .cloned()
            .collect())
    }

    async fn search_donations(
        &self,
        festival_id: Uuid,
        term: &str,
    ) -> Result<Vec<Donation>, BackendError> {
        self.check()?;
        let needle = term.to_lowercase();
        Ok(self
            .donations
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.festival_id == Some(festival_id))
            .filter(|d| {
                d.name.to_lowercase().contains(&needle)
                    || d.name_telugu
                        .as_deref()
                        .is_some_and(|t| t.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect())
    }

    async fn create_donation(&self, donation: &NewDonation) -> Result<Donation, BackendError> {
        self.check()?;
        let row = Donation {
            id: Uuid::new_v4(),
            organization_id: Some(donation.organization_id),
            festival_id: Some(donation.festival_id),
            name: donation.name.clone(),
            name_telugu: donation.name_telugu.clone(),
            amount: donation.amount,
            donation_type: donation.donation_type.clone(),
            category: donation.category,
            received_amount: Some(donation.received_amount),
            created_at: Some(Utc::now()),
        };
        self.donations.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn update_donation(
        &self,
        donation_id: Uuid,
        update: &DonationUpdate,
    ) -> Result<Donation, BackendError> {
        self.check()?;
        let mut donations = self.donations.lock().unwrap();
        let row = donations
            .iter_mut()
            .find(|d| d.id == donation_id)
            .ok_or_else(|| Self::missing("donation", donation_id))?;
        *row = patched(&*row, update)?;
        Ok(row.clone())
    }

    async fn update_received_amount(
        &self,
        donation_id: Uuid,
        received_amount: f64,
    ) -> Result<Donation, BackendError> {
        self.update_donation(
            donation_id,
            &DonationUpdate {
                received_amount: Some(received_amount),
                ..Default::default()
            },
        )
        .await
    }

    async fn delete_donation(&self, donation_id: Uuid) -> Result<(), BackendError> {
        self.check()?;
        self.donations.lock().unwrap().retain(|d| d.id != donation_id);
        Ok(())
    }
}

#[async_trait]
impl ExpenseRepository for MockDb {
    async fn list_expenses(
        &self,
        organization_id: Uuid,
        festival_name: &str,
        festival_year: i32,
    ) -> Result<Vec<Expense>, BackendError> {
        self.check()?;
        Ok(self
            .expenses
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.organization_id == Some(organization_id))
            .filter(|e| e.festival_name == festival_name && e.festival_year == festival_year)
            .cloned()
            .collect())
    }

    async fn create_expense(&self, expense: &NewExpense) -> Result<Expense, BackendError> {
        self.check()?;
        let row = Expense {
            id: Uuid::new_v4(),
            organization_id: Some(expense.organization_id),
            festival_name: expense.festival_name.clone(),
            festival_year: expense.festival_year,
            expense_type: expense.expense_type.clone(),
            amount: expense.amount,
            description: expense.description.clone(),
            created_at: Some(Utc::now()),
        };
        self.expenses.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn update_expense(
        &self,
        expense_id: Uuid,
        update: &ExpenseUpdate,
    ) -> Result<Expense, BackendError> {
        self.check()?;
        let mut expenses = self.expenses.lock().unwrap();
        let row = expenses
            .iter_mut()
            .find(|e| e.id == expense_id)
            .ok_or_else(|| Self::missing("expense", expense_id))?;
        *row = patched(&*row, update)?;
        Ok(row.clone())
    }

    async fn delete_expense(&self, expense_id: Uuid) -> Result<(), BackendError> {
        self.check()?;
        self.expenses.lock().unwrap().retain(|e| e.id != expense_id);
        Ok(())
    }
}

#[async_trait]
impl ImageRepository for MockDb {
    async fn list_images(&self, festival_id: Uuid) -> Result<Vec<ImageRecord>, BackendError> {
        self.check()?;
        Ok(self
            .images
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.festival_id == Some(festival_id))
            .cloned()
            .collect())
    }

    async fn insert_image(&self, image: &NewImageRecord) -> Result<ImageRecord, BackendError> {
        self.check()?;
        let row = ImageRecord {
            id: Uuid::new_v4(),
            organization_id: Some(image.organization_id),
            festival_id: Some(image.festival_id),
            title: image.title.clone(),
            description: image.description.clone(),
            image_url: image.image_url.clone(),
            storage_path: image.storage_path.clone(),
            created_at: Some(Utc::now()),
        };
        self.images.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn delete_image(&self, image_id: Uuid) -> Result<(), BackendError> {
        self.check()?;
        self.images.lock().unwrap().retain(|i| i.id != image_id);
        Ok(())
    }
}

#[async_trait]
impl SettingsRepository for MockDb {
    async fn get_setting(
        &self,
        organization_id: Uuid,
        key: &str,
    ) -> Result<Option<Setting>, BackendError> {
        self.check()?;
        Ok(self
            .settings
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.organization_id == organization_id && s.key == key)
            .cloned())
    }

    async fn list_settings(&self, organization_id: Uuid) -> Result<Vec<Setting>, BackendError> {
        self.check()?;
        Ok(self
            .settings
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.organization_id == organization_id)
            .cloned()
            .collect())
    }

    async fn upsert_setting(
        &self,
        organization_id: Uuid,
        key: &str,
        value: Value,
    ) -> Result<Setting, BackendError> {
        self.check()?;
        let mut settings = self.settings.lock().unwrap();
        let row = Setting {
            id: None,
            organization_id,
            key: key.to_string(),
            value,
            updated_at: Some(Utc::now()),
        };
        settings.retain(|s| !(s.organization_id == organization_id && s.key == key));
        settings.push(row.clone());
        Ok(row)
    }
}

#[async_trait]
impl InvitationRepository for MockDb {
    async fn create_invitation(
        &self,
        invitation: &NewInvitation,
    ) -> Result<OrganizationInvitation, BackendError> {
        self.check()?;
        let row = OrganizationInvitation {
            id: Uuid::new_v4(),
            organization_id: invitation.organization_id,
            email: invitation.email.clone(),
            role: invitation.role,
            token: invitation.token.clone(),
            expires_at: invitation.expires_at,
            status: invitation.status,
            invited_by: Some(invitation.invited_by),
            created_at: Some(Utc::now()),
        };
        self.invitations.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn find_pending_by_token(
        &self,
        token: &str,
    ) -> Result<Option<OrganizationInvitation>, BackendError> {
        self.check()?;
        Ok(self
            .invitations
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.token == token && i.status == InvitationStatus::Pending)
            .cloned())
    }

    async fn find_accepted_by_token(
        &self,
        token: &str,
    ) -> Result<Option<OrganizationInvitation>, BackendError> {
        self.check()?;
        Ok(self
            .invitations
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.token == token && i.status == InvitationStatus::Accepted)
            .cloned())
    }

    async fn mark_accepted(&self, invitation_id: Uuid) -> Result<(), BackendError> {
        self.check()?;
        let mut invitations = self.invitations.lock().unwrap();
        let row = invitations
            .iter_mut()
            .find(|i| i.id == invitation_id)
            .ok_or_else(|| Self::missing("invitation", invitation_id))?;
        row.status = InvitationStatus::Accepted;
        Ok(())
    }

    async fn list_invitations(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<OrganizationInvitation>, BackendError> {
        self.check()?;
        Ok(self
            .invitations
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.organization_id == organization_id)
            .cloned()
            .collect())
    }

    async fn delete_invitation(&self, invitation_id: Uuid) -> Result<(), BackendError> {
        self.check()?;
        self.invitations
            .lock()
            .unwrap()
            .retain(|i| i.id != invitation_id);
        Ok(())
    }
}

#[async_trait]
impl AuditLogRepository for MockDb {
    async fn list_recent(
        &self,
        _organization_id: Uuid,
        limit: usize,
    ) -> Result<Vec<AuditLog>, BackendError> {
        self.check()?;
        let mut rows = self.audit_logs.lock().unwrap().clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(limit);
        Ok(rows)
    }
}
