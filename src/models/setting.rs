use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

pub const SETTING_VOTING_ENABLED: &str = "voting_enabled";
pub const SETTING_DEFAULT_FESTIVAL: &str = "default_festival";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setting {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub organization_id: Uuid,
    pub key: String,
    pub value: Value,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}
