use async_trait::async_trait;
use uuid::Uuid;

use crate::db::rest_client::BackendError;
use crate::models::festival::{Festival, FestivalUpdate, NewFestival};

#[async_trait]
pub trait FestivalRepository: Send + Sync {
    async fn list_festivals(&self, organization_id: Uuid) -> Result<Vec<Festival>, BackendError>;

    /// Every festival sharing the human key. Callers decide what to do with
    /// zero or several matches.
    async fn find_by_name_and_year(
        &self,
        organization_id: Option<Uuid>,
        name: &str,
        year: i32,
    ) -> Result<Vec<Festival>, BackendError>;

    async fn find_active(&self, organization_id: Uuid) -> Result<Option<Festival>, BackendError>;

    async fn create_festival(&self, festival: &NewFestival) -> Result<Festival, BackendError>;

    async fn update_festival(
        &self,
        festival_id: Uuid,
        update: &FestivalUpdate,
    ) -> Result<Festival, BackendError>;

    async fn delete_festival(&self, festival_id: Uuid) -> Result<(), BackendError>;
}
