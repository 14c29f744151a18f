use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::context::local_store::{org_access_key, LocalStore, StoreError};
use crate::db::organization_repository::OrganizationRepository;
use crate::models::organization::Organization;

#[derive(Debug, Clone, PartialEq)]
pub enum AccessState {
    Loading,
    Ready(Organization),
    /// The slug resolves to nothing. A valid end state, not a failure.
    NotFound,
    Failed(String),
}

/// Organization access for a publicly shared page, resolved from the URL
/// slug. Each slug keeps its own unlock flag so two shared links opened on
/// the same device do not unlock each other.
pub struct OrganizationAccessContext {
    slug: String,
    repo: Arc<dyn OrganizationRepository>,
    store: Arc<dyn LocalStore>,
    state: RwLock<AccessState>,
    authenticated: RwLock<bool>,
}

impl OrganizationAccessContext {
    pub fn new(
        slug: &str,
        repo: Arc<dyn OrganizationRepository>,
        store: Arc<dyn LocalStore>,
    ) -> Self {
        let authenticated = store.get(&org_access_key(slug)).as_deref() == Some("true");
        Self {
            slug: slug.to_string(),
            repo,
            store,
            state: RwLock::new(AccessState::Loading),
            authenticated: RwLock::new(authenticated),
        }
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub async fn load(&self) -> AccessState {
        let next = match self.repo.find_by_slug(&self.slug).await {
            Ok(Some(org)) => AccessState::Ready(org.sanitized()),
            Ok(None) => {
                info!(slug = %self.slug, "shared organization not found");
                AccessState::NotFound
            }
            Err(err) => {
                warn!(slug = %self.slug, %err, "could not load shared organization");
                AccessState::Failed(err.to_string())
            }
        };
        *self.state.write().await = next.clone();
        next
    }

    pub async fn state(&self) -> AccessState {
        self.state.read().await.clone()
    }

    pub async fn is_loading(&self) -> bool {
        matches!(*self.state.read().await, AccessState::Loading)
    }

    pub async fn organization(&self) -> Option<Organization> {
        match &*self.state.read().await {
            AccessState::Ready(org) => Some(org.clone()),
            _ => None,
        }
    }

    pub async fn is_authenticated(&self) -> bool {
        *self.authenticated.read().await
    }

    pub async fn authenticate(&self, passcode: &str) -> bool {
        let Some(org) = self.organization().await else {
            warn!(slug = %self.slug, "passcode entered before organization resolved");
            return false;
        };
        match self.repo.verify_passcode(org.id, passcode).await {
            Ok(true) => {}
            Ok(false) => {
                info!(slug = %self.slug, "incorrect organization passcode");
                return false;
            }
            Err(err) => {
                error!(slug = %self.slug, %err, "passcode verification failed");
                return false;
            }
        }

        let mut authenticated = self.authenticated.write().await;
        if let Err(err) = self.store.set(&org_access_key(&self.slug), "true") {
            error!(slug = %self.slug, %err, "could not persist unlock state");
            return false;
        }
        *authenticated = true;
        true
    }

    pub async fn logout(&self) -> Result<(), StoreError> {
        let mut authenticated = self.authenticated.write().await;
        self.store.remove(&org_access_key(&self.slug))?;
        *authenticated = false;
        Ok(())
    }
}
