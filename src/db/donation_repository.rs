use async_trait::async_trait;
use uuid::Uuid;

use crate::db::rest_client::BackendError;
use crate::models::donation::{Donation, DonationCategory, DonationUpdate, NewDonation};

#[async_trait]
pub trait DonationRepository: Send + Sync {
    async fn list_donations(
        &self,
        festival_id: Uuid,
        category: Option<DonationCategory>,
    ) -> Result<Vec<Donation>, BackendError>;

    /// Case-insensitive match on the name or its Telugu rendering.
    async fn search_donations(
        &self,
        festival_id: Uuid,
        term: &str,
    ) -> Result<Vec<Donation>, BackendError>;

    async fn create_donation(&self, donation: &NewDonation) -> Result<Donation, BackendError>;

    async fn update_donation(
        &self,
        donation_id: Uuid,
        update: &DonationUpdate,
    ) -> Result<Donation, BackendError>;

    async fn update_received_amount(
        &self,
        donation_id: Uuid,
        received_amount: f64,
    ) -> Result<Donation, BackendError>;

    async fn delete_donation(&self, donation_id: Uuid) -> Result<(), BackendError>;
}
