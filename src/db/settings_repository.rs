use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::db::rest_client::BackendError;
use crate::models::setting::Setting;

#[async_trait]
pub trait SettingsRepository: Send + Sync {
    async fn get_setting(
        &self,
        organization_id: Uuid,
        key: &str,
    ) -> Result<Option<Setting>, BackendError>;

    async fn list_settings(&self, organization_id: Uuid) -> Result<Vec<Setting>, BackendError>;

    async fn upsert_setting(
        &self,
        organization_id: Uuid,
        key: &str,
        value: Value,
    ) -> Result<Setting, BackendError>;
}
