use async_trait::async_trait;
use uuid::Uuid;

use crate::db::festival_repository::FestivalRepository;
use crate::db::rest_client::{BackendClient, BackendError};
use crate::models::festival::{Festival, FestivalUpdate, NewFestival};

/// Two rows are enough to tell "exactly one" from "ambiguous".
const NAME_YEAR_LOOKUP_LIMIT: usize = 2;

pub struct RestFestivalRepository {
    pub client: BackendClient,
}

#[async_trait]
impl FestivalRepository for RestFestivalRepository {
    async fn list_festivals(&self, organization_id: Uuid) -> Result<Vec<Festival>, BackendError> {
        self.client
            .from("festivals")
            .select("*")
            .eq("organization_id", organization_id)
            .order("year", false)
            .fetch()
            .await
    }

    async fn find_by_name_and_year(
        &self,
        organization_id: Option<Uuid>,
        name: &str,
        year: i32,
    ) -> Result<Vec<Festival>, BackendError> {
        let mut query = self
            .client
            .from("festivals")
            .select("*")
            .eq("name", name)
            .eq("year", year);
        if let Some(org) = organization_id {
            query = query.eq("organization_id", org);
        }
        query.limit(NAME_YEAR_LOOKUP_LIMIT).fetch().await
    }

    async fn find_active(&self, organization_id: Uuid) -> Result<Option<Festival>, BackendError> {
        self.client
            .from("festivals")
            .select("*")
            .eq("organization_id", organization_id)
            .eq("is_active", true)
            .order("year", false)
            .maybe_single()
            .await
    }

    async fn create_festival(&self, festival: &NewFestival) -> Result<Festival, BackendError> {
        self.client.from("festivals").insert(festival).await
    }

    async fn update_festival(
        &self,
        festival_id: Uuid,
        update: &FestivalUpdate,
    ) -> Result<Festival, BackendError> {
        let rows: Vec<Festival> = self
            .client
            .from("festivals")
            .eq("id", festival_id)
            .update(update)
            .await?;
        rows.into_iter().next().ok_or_else(|| {
            BackendError::InvalidResponse(format!("festival {festival_id} not updated"))
        })
    }

    async fn delete_festival(&self, festival_id: Uuid) -> Result<(), BackendError> {
        self.client
            .from("festivals")
            .eq("id", festival_id)
            .delete()
            .await
    }
}
