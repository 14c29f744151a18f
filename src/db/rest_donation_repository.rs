use async_trait::async_trait;
use serde_json::json;
use uuid::Uuid;

use crate::db::donation_repository::DonationRepository;
use crate::db::rest_client::{BackendClient, BackendError};
use crate::models::donation::{Donation, DonationCategory, DonationUpdate, NewDonation};

pub struct RestDonationRepository {
    pub client: BackendClient,
}

/// Characters that would break out of a PostgREST `or=(...)` group.
fn sanitize_term(term: &str) -> String {
    term.chars()
        .filter(|c| !matches!(c, ',' | '(' | ')' | '*' | '.'))
        .collect::<String>()
        .trim()
        .to_string()
}

impl RestDonationRepository {
    async fn single_update(
        &self,
        donation_id: Uuid,
        body: &serde_json::Value,
    ) -> Result<Donation, BackendError> {
        let rows: Vec<Donation> = self
            .client
            .from("donations")
            .eq("id", donation_id)
            .update(body)
            .await?;
        rows.into_iter().next().ok_or_else(|| {
            BackendError::InvalidResponse(format!("donation {donation_id} not updated"))
        })
    }
}

#[async_trait]
impl DonationRepository for RestDonationRepository {
    async fn list_donations(
        &self,
        festival_id: Uuid,
        category: Option<DonationCategory>,
    ) -> Result<Vec<Donation>, BackendError> {
        let mut query = self
            .client
            .from("donations")
            .select("*")
            .eq("festival_id", festival_id);
        if let Some(category) = category {
            query = query.eq("category", category.as_str());
        }
        query.order("created_at", false).fetch().await
    }

    async fn search_donations(
        &self,
        festival_id: Uuid,
        term: &str,
    ) -> Result<Vec<Donation>, BackendError> {
        let term = sanitize_term(term);
        if term.is_empty() {
            return self.list_donations(festival_id, None).await;
        }
        self.client
            .from("donations")
            .select("*")
            .eq("festival_id", festival_id)
            .or(&format!("name.ilike.*{term}*,name_telugu.ilike.*{term}*"))
            .order("created_at", false)
            .fetch()
            .await
    }

    async fn create_donation(&self, donation: &NewDonation) -> Result<Donation, BackendError> {
        self.client.from("donations").insert(donation).await
    }

    async fn update_donation(
        &self,
        donation_id: Uuid,
        update: &DonationUpdate,
    ) -> Result<Donation, BackendError> {
        let body = serde_json::to_value(update)
            .map_err(|err| BackendError::InvalidResponse(err.to_string()))?;
        self.single_update(donation_id, &body).await
    }

    async fn update_received_amount(
        &self,
        donation_id: Uuid,
        received_amount: f64,
    ) -> Result<Donation, BackendError> {
        self.single_update(donation_id, &json!({ "received_amount": received_amount }))
            .await
    }

    async fn delete_donation(&self, donation_id: Uuid) -> Result<(), BackendError> {
        self.client
            .from("donations")
            .eq("id", donation_id)
            .delete()
            .await
    }
}
