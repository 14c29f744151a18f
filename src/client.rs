use std::sync::Arc;

use reqwest::Client;
use tracing::{info, warn};

use crate::config::Config;
use crate::context::festival::FestivalContext;
use crate::context::local_store::{FileLocalStore, LocalStore, StoreError};
use crate::context::organization::OrganizationContext;
use crate::context::organization_access::OrganizationAccessContext;
use crate::context::preferences::PreferencesContext;
use crate::context::session::SessionContext;
use crate::db::rest_client::BackendClient;
use crate::db::Repositories;
use crate::flows::guarded_editor::{GuardedEditor, PasscodePrompt};
use crate::flows::invitation_accept::InvitationAcceptance;
use crate::flows::invitations::InvitationAdmin;
use crate::flows::onboarding::Onboarding;
use crate::services::auth::RestAuthService;
use crate::services::smtp_mailer::{Mailer, SmtpMailer};
use crate::services::storage::{ObjectStorage, RestStorage};
use crate::services::translation::{FunctionTranslator, Translator};

pub const FUNCTIONS_PATH: &str = "functions/v1";

/// Everything a front end needs, wired once per process. Contexts are shared;
/// flows are cheap to build on demand.
pub struct AppCore {
    pub backend: BackendClient,
    pub repos: Repositories,
    pub store: Arc<dyn LocalStore>,
    pub session: Arc<SessionContext>,
    pub organization: Arc<OrganizationContext>,
    pub festival: Arc<FestivalContext>,
    pub preferences: Arc<PreferencesContext>,
    pub storage: Arc<dyn ObjectStorage>,
    pub translator: Arc<dyn Translator>,
    mailer: Option<Arc<dyn Mailer>>,
    app_origin: String,
}

impl AppCore {
    pub fn from_config(config: &Config) -> Result<Self, StoreError> {
        let store: Arc<dyn LocalStore> = Arc::new(FileLocalStore::open(&config.local_store_path)?);
        let backend = BackendClient::new(
            Client::new(),
            &config.backend_url,
            &config.backend_anon_key,
        );

        let mailer: Option<Arc<dyn Mailer>> = match SmtpMailer::from_env() {
            Ok(mailer) => Some(Arc::new(mailer)),
            Err(err) => {
                warn!(%err, "SMTP is not configured, invitation emails are disabled");
                None
            }
        };

        let core = Self::assemble(backend, store, &config.app_origin).with_mailer(mailer);
        info!(backend = %config.backend_url, "client core ready");
        Ok(core)
    }

    fn assemble(backend: BackendClient, store: Arc<dyn LocalStore>, app_origin: &str) -> Self {
        let repos = Repositories::rest(&backend);
        let session = Arc::new(SessionContext::new(
            Arc::new(RestAuthService {
                client: backend.clone(),
            }),
            backend.clone(),
            store.clone(),
            app_origin,
        ));
        Self {
            organization: Arc::new(OrganizationContext::new(
                repos.organizations.clone(),
                store.clone(),
            )),
            festival: Arc::new(FestivalContext::new(repos.festivals.clone(), store.clone())),
            preferences: Arc::new(PreferencesContext::new(store.clone())),
            storage: Arc::new(RestStorage::images(backend.clone())),
            translator: Arc::new(FunctionTranslator {
                client: backend.clone(),
                base_path: FUNCTIONS_PATH.to_string(),
            }),
            mailer: None,
            app_origin: app_origin.to_string(),
            session,
            repos,
            store,
            backend,
        }
    }

    pub fn with_mailer(mut self, mailer: Option<Arc<dyn Mailer>>) -> Self {
        self.mailer = mailer;
        self
    }

    /// Restores the persisted session and backfills the selected festival.
    pub async fn start(&self) -> Result<(), StoreError> {
        self.session.restore().await?;
        self.festival.initialize().await?;
        Ok(())
    }

    pub fn organization_access(&self, slug: &str) -> OrganizationAccessContext {
        OrganizationAccessContext::new(slug, self.repos.organizations.clone(), self.store.clone())
    }

    pub fn invitation_acceptance(&self) -> InvitationAcceptance {
        InvitationAcceptance::new(
            self.session.clone(),
            self.repos.invitations.clone(),
            self.repos.organizations.clone(),
        )
    }

    /// `None` when no mailer is configured.
    pub fn invitation_admin(&self) -> Option<InvitationAdmin> {
        let mailer = self.mailer.clone()?;
        Some(InvitationAdmin::new(
            self.repos.invitations.clone(),
            mailer,
            &self.app_origin,
        ))
    }

    pub fn onboarding(&self) -> Onboarding {
        Onboarding::new(self.repos.organizations.clone())
    }

    pub fn guarded_editor(&self, prompt: Arc<dyn PasscodePrompt>) -> GuardedEditor {
        GuardedEditor::new(
            self.organization.clone(),
            prompt,
            self.repos.clone(),
            self.storage.clone(),
        )
        .with_translator(self.translator.clone())
    }
}
