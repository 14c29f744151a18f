use std::sync::Arc;

pub mod audit_log_repository;
pub mod donation_repository;
pub mod expense_repository;
pub mod festival_repository;
pub mod image_repository;
pub mod invitation_repository;
#[cfg(test)]
pub mod mock_db;
pub mod organization_repository;
pub mod rest_client;
pub mod rest_donation_repository;
pub mod rest_expense_repository;
pub mod rest_festival_repository;
pub mod rest_image_repository;
pub mod rest_invitation_repository;
pub mod rest_organization_repository;
pub mod rest_settings_repository;
pub mod settings_repository;

use audit_log_repository::{AuditLogRepository, RestAuditLogRepository};
use donation_repository::DonationRepository;
use expense_repository::ExpenseRepository;
use festival_repository::FestivalRepository;
use image_repository::ImageRepository;
use invitation_repository::InvitationRepository;
use organization_repository::OrganizationRepository;
use rest_client::BackendClient;
use rest_donation_repository::RestDonationRepository;
use rest_expense_repository::RestExpenseRepository;
use rest_festival_repository::RestFestivalRepository;
use rest_image_repository::RestImageRepository;
use rest_invitation_repository::RestInvitationRepository;
use rest_organization_repository::RestOrganizationRepository;
use rest_settings_repository::RestSettingsRepository;
use settings_repository::SettingsRepository;

/// One handle per backend table.
#[derive(Clone)]
pub struct Repositories {
    pub organizations: Arc<dyn OrganizationRepository>,
    pub festivals: Arc<dyn FestivalRepository>,
    pub donations: Arc<dyn DonationRepository>,
    pub expenses: Arc<dyn ExpenseRepository>,
    pub images: Arc<dyn ImageRepository>,
    pub settings: Arc<dyn SettingsRepository>,
    pub invitations: Arc<dyn InvitationRepository>,
    pub audit_logs: Arc<dyn AuditLogRepository>,
}

impl Repositories {
    pub fn rest(client: &BackendClient) -> Self {
        Self {
            organizations: Arc::new(RestOrganizationRepository {
                client: client.clone(),
            }),
            festivals: Arc::new(RestFestivalRepository {
                client: client.clone(),
            }),
            donations: Arc::new(RestDonationRepository {
                client: client.clone(),
            }),
            expenses: Arc::new(RestExpenseRepository {
                client: client.clone(),
            }),
            images: Arc::new(RestImageRepository {
                client: client.clone(),
            }),
            settings: Arc::new(RestSettingsRepository {
                client: client.clone(),
            }),
            invitations: Arc::new(RestInvitationRepository {
                client: client.clone(),
            }),
            audit_logs: Arc::new(RestAuditLogRepository {
                client: client.clone(),
            }),
        }
    }

    #[cfg(test)]
    pub fn mock(db: Arc<mock_db::MockDb>) -> Self {
        Self {
            organizations: db.clone(),
            festivals: db.clone(),
            donations: db.clone(),
            expenses: db.clone(),
            images: db.clone(),
            settings: db.clone(),
            invitations: db.clone(),
            audit_logs: db,
        }
    }
}
