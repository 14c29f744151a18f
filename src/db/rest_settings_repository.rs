use async_trait::async_trait;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::db::rest_client::{BackendClient, BackendError};
use crate::db::settings_repository::SettingsRepository;
use crate::models::setting::Setting;

pub struct RestSettingsRepository {
    pub client: BackendClient,
}

#[async_trait]
impl SettingsRepository for RestSettingsRepository {
    async fn get_setting(
        &self,
        organization_id: Uuid,
        key: &str,
    ) -> Result<Option<Setting>, BackendError> {
        self.client
            .from("settings")
            .select("*")
            .eq("organization_id", organization_id)
            .eq("key", key)
            .maybe_single()
            .await
    }

    async fn list_settings(&self, organization_id: Uuid) -> Result<Vec<Setting>, BackendError> {
        self.client
            .from("settings")
            .select("*")
            .eq("organization_id", organization_id)
            .order("key", true)
            .fetch()
            .await
    }

    async fn upsert_setting(
        &self,
        organization_id: Uuid,
        key: &str,
        value: Value,
    ) -> Result<Setting, BackendError> {
        self.client
            .from("settings")
            .upsert(
                &json!({ "organization_id": organization_id, "key": key, "value": value }),
                "organization_id,key",
            )
            .await
    }
}
