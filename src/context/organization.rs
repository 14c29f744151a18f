use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::context::local_store::{
    LocalStore, StoreError, KEY_AUTHENTICATED_ORG_ID, KEY_CURRENT_ORGANIZATION,
    KEY_ORG_AUTHENTICATED,
};
use crate::db::organization_repository::OrganizationRepository;
use crate::errors::AppError;
use crate::models::organization::Organization;

#[derive(Debug, Default)]
struct OrganizationState {
    current: Option<Organization>,
    authenticated: bool,
}

/// The organization the whole app is working on, plus whether this device
/// has been unlocked for edits by the organization passcode.
pub struct OrganizationContext {
    repo: Arc<dyn OrganizationRepository>,
    store: Arc<dyn LocalStore>,
    state: RwLock<OrganizationState>,
}

impl OrganizationContext {
    pub fn new(repo: Arc<dyn OrganizationRepository>, store: Arc<dyn LocalStore>) -> Self {
        let current = store
            .get(KEY_CURRENT_ORGANIZATION)
            .and_then(|raw| match serde_json::from_str::<Organization>(&raw) {
                Ok(org) => Some(org.sanitized()),
                Err(err) => {
                    warn!(%err, "ignoring unreadable persisted organization");
                    None
                }
            });
        let authenticated = current
            .as_ref()
            .is_some_and(|org| unlocked_for(store.as_ref(), org));
        Self {
            repo,
            store,
            state: RwLock::new(OrganizationState {
                current,
                authenticated,
            }),
        }
    }

    pub async fn current_organization(&self) -> Option<Organization> {
        self.state.read().await.current.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.authenticated
    }

    /// Stores a passcode-free copy and re-derives the unlock state. Moving to
    /// a different organization leaves the device locked unless that
    /// organization was the one last unlocked.
    pub async fn set_current_organization(&self, org: Organization) -> Result<(), StoreError> {
        let clean = org.sanitized();
        let mut state = self.state.write().await;
        self.store
            .set(KEY_CURRENT_ORGANIZATION, &serde_json::to_string(&clean)?)?;
        state.authenticated = unlocked_for(self.store.as_ref(), &clean);
        info!(org_id = %clean.id, slug = %clean.slug, unlocked = state.authenticated, "organization selected");
        state.current = Some(clean);
        Ok(())
    }

    /// Resolves the slug and selects the result. An unknown slug is an empty
    /// result, not an error.
    pub async fn select_by_slug(&self, slug: &str) -> Result<Option<Organization>, AppError> {
        let Some(org) = self.repo.find_by_slug(slug).await? else {
            info!(slug, "organization slug not found");
            return Ok(None);
        };
        self.set_current_organization(org).await?;
        Ok(self.current_organization().await)
    }

    /// One verification attempt against the backend. Errors count as a wrong
    /// passcode.
    pub async fn authenticate(&self, passcode: &str) -> bool {
        let Some(org) = self.current_organization().await else {
            warn!("passcode entered with no organization selected");
            return false;
        };

        match self.repo.verify_passcode(org.id, passcode).await {
            Ok(true) => {}
            Ok(false) => {
                info!(org_id = %org.id, "incorrect organization passcode");
                return false;
            }
            Err(err) => {
                error!(org_id = %org.id, %err, "passcode verification failed");
                return false;
            }
        }

        let mut state = self.state.write().await;
        if state.current.as_ref().map(|o| o.id) != Some(org.id) {
            warn!(org_id = %org.id, "organization changed during verification");
            return false;
        }
        let persisted = self
            .store
            .set(KEY_ORG_AUTHENTICATED, "true")
            .and_then(|_| self.store.set(KEY_AUTHENTICATED_ORG_ID, &org.id.to_string()));
        if let Err(err) = persisted {
            error!(org_id = %org.id, %err, "could not persist unlock state");
            return false;
        }
        state.authenticated = true;
        info!(org_id = %org.id, "organization unlocked");
        true
    }

    /// Locks the device again. The selected organization stays selected.
    pub async fn logout(&self) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        self.store.remove(KEY_ORG_AUTHENTICATED)?;
        self.store.remove(KEY_AUTHENTICATED_ORG_ID)?;
        state.authenticated = false;
        Ok(())
    }

    pub async fn clear_organization(&self) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        self.store.remove(KEY_CURRENT_ORGANIZATION)?;
        self.store.remove(KEY_ORG_AUTHENTICATED)?;
        self.store.remove(KEY_AUTHENTICATED_ORG_ID)?;
        *state = OrganizationState::default();
        Ok(())
    }

    pub async fn require_unlocked(&self) -> Result<Organization, AppError> {
        let state = self.state.read().await;
        let org = state.current.clone().ok_or(AppError::NoOrganization)?;
        if !state.authenticated {
            return Err(AppError::Locked);
        }
        Ok(org)
    }
}

fn unlocked_for(store: &dyn LocalStore, org: &Organization) -> bool {
    store.get(KEY_ORG_AUTHENTICATED).as_deref() == Some("true")
        && store.get(KEY_AUTHENTICATED_ORG_ID) == Some(org.id.to_string())
}
