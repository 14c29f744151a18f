use async_trait::async_trait;
use uuid::Uuid;

use crate::db::rest_client::{BackendClient, BackendError};
use crate::models::audit_log::AuditLog;

pub const DEFAULT_ACTIVITY_LIMIT: usize = 50;

#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    async fn list_recent(
        &self,
        organization_id: Uuid,
        limit: usize,
    ) -> Result<Vec<AuditLog>, BackendError>;
}

pub struct RestAuditLogRepository {
    pub client: BackendClient,
}

#[async_trait]
impl AuditLogRepository for RestAuditLogRepository {
    async fn list_recent(
        &self,
        organization_id: Uuid,
        limit: usize,
    ) -> Result<Vec<AuditLog>, BackendError> {
        self.client
            .from("audit_logs")
            .select("*")
            .eq("organization_id", organization_id)
            .order("created_at", false)
            .limit(limit)
            .fetch()
            .await
    }
}
