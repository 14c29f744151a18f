use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditAction {
    Insert,
    Update,
    Delete,
}

/// Row written by backend triggers. Read-only from this side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLog {
    pub id: Uuid,
    pub table_name: String,
    pub action: AuditAction,
    #[serde(default)]
    pub old_data: Option<Value>,
    #[serde(default)]
    pub new_data: Option<Value>,
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub user_email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AuditLog {
    /// The snapshot that best describes the row: the new one, or the old one
    /// for deletions.
    pub fn snapshot(&self) -> Option<&Value> {
        match self.action {
            AuditAction::Delete => self.old_data.as_ref(),
            _ => self.new_data.as_ref().or(self.old_data.as_ref()),
        }
    }
}
