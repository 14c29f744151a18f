use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::context::local_store::{LocalStore, StoreError, KEY_AUTH_RETURN_TO, KEY_AUTH_SESSION};
use crate::db::rest_client::BackendClient;
use crate::errors::AppError;
use crate::models::user::{AuthSession, SessionUser};
use crate::services::auth::{AuthError, AuthService};
use crate::utils::email::is_valid_email;

pub const SIGN_IN_PATH: &str = "/auth";
pub const AUTH_CALLBACK_PATH: &str = "/auth/callback";
const DEFAULT_RETURN_TO: &str = "/";
const DEFAULT_EXPIRES_IN_SECONDS: i64 = 3600;
const MAX_EXPIRES_IN_SECONDS: i64 = 7 * 24 * 3600;

/// `/auth?redirect=<return_to>`, the sign-in page that brings the user back
/// where they started.
pub fn sign_in_url(return_to: &str) -> String {
    format!("{SIGN_IN_PATH}?redirect={}", urlencoding::encode(return_to))
}

#[derive(Debug)]
struct SessionState {
    session: Option<AuthSession>,
    loading: bool,
}

/// Account session: who is signed in, persisted across restarts.
pub struct SessionContext {
    auth: Arc<dyn AuthService>,
    client: BackendClient,
    store: Arc<dyn LocalStore>,
    app_origin: String,
    state: RwLock<SessionState>,
}

impl SessionContext {
    pub fn new(
        auth: Arc<dyn AuthService>,
        client: BackendClient,
        store: Arc<dyn LocalStore>,
        app_origin: &str,
    ) -> Self {
        let session = store
            .get(KEY_AUTH_SESSION)
            .and_then(|raw| match serde_json::from_str::<AuthSession>(&raw) {
                Ok(session) => Some(session),
                Err(err) => {
                    warn!(%err, "ignoring unreadable persisted session");
                    None
                }
            });
        Self {
            auth,
            client,
            store,
            app_origin: app_origin.trim_end_matches('/').to_string(),
            state: RwLock::new(SessionState {
                session,
                loading: true,
            }),
        }
    }

    /// Brings the persisted session back to life, refreshing it when it has
    /// expired. A session that cannot be refreshed is dropped.
    pub async fn restore(&self) -> Result<Option<SessionUser>, StoreError> {
        let mut state = self.state.write().await;
        let Some(session) = state.session.clone() else {
            state.loading = false;
            self.client.set_access_token(None).await;
            return Ok(None);
        };

        if !session.is_expired(Utc::now()) {
            self.client
                .set_access_token(Some(session.access_token.clone()))
                .await;
            state.loading = false;
            return Ok(Some(session.user));
        }

        match self.auth.refresh_session(&session.refresh_token).await {
            Ok(fresh) => {
                self.store
                    .set(KEY_AUTH_SESSION, &serde_json::to_string(&fresh)?)?;
                self.client
                    .set_access_token(Some(fresh.access_token.clone()))
                    .await;
                let user = fresh.user.clone();
                state.session = Some(fresh);
                state.loading = false;
                Ok(Some(user))
            }
            Err(err) => {
                warn!(%err, user_id = %session.user.id, "session refresh failed, signing out");
                self.store.remove(KEY_AUTH_SESSION)?;
                self.client.set_access_token(None).await;
                state.session = None;
                state.loading = false;
                Ok(None)
            }
        }
    }

    pub async fn current_user(&self) -> Option<SessionUser> {
        self.state.read().await.session.as_ref().map(|s| s.user.clone())
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }

    pub async fn access_token(&self) -> Option<String> {
        self.state
            .read()
            .await
            .session
            .as_ref()
            .map(|s| s.access_token.clone())
    }

    /// Where the user should land after the magic link brings them back.
    pub fn remember_return_to(&self, return_to: &str) -> Result<(), StoreError> {
        self.store.set(KEY_AUTH_RETURN_TO, return_to)
    }

    pub fn sign_in_url(&self, return_to: &str) -> String {
        sign_in_url(return_to)
    }

    pub async fn sign_in_with_magic_link(
        &self,
        email: &str,
        return_to: Option<&str>,
    ) -> Result<(), AppError> {
        let email = email.trim();
        if !is_valid_email(email) {
            return Err(AuthError::InvalidEmail(email.to_string()).into());
        }
        if let Some(return_to) = return_to {
            self.remember_return_to(return_to)?;
        }
        let redirect_to = format!("{}{}", self.app_origin, AUTH_CALLBACK_PATH);
        self.auth.send_magic_link(email, &redirect_to).await?;
        info!(email, "magic link sent");
        Ok(())
    }

    /// Finishes a magic-link sign-in from the callback URL the user landed
    /// on. Returns the path remembered before sign-in started.
    pub async fn complete_sign_in(&self, callback_url: &str) -> Result<String, AppError> {
        let params = callback_params(callback_url);
        let lookup = |name: &str| {
            params
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone())
        };

        if let Some(description) = lookup("error_description") {
            return Err(AuthError::MagicLinkFailed(description).into());
        }
        let access_token = lookup("access_token").ok_or(AuthError::InvalidCallback("access_token"))?;
        let refresh_token =
            lookup("refresh_token").ok_or(AuthError::InvalidCallback("refresh_token"))?;
        let expires_at = session_expiry(Utc::now(), lookup("expires_in").as_deref());

        let user = self.auth.get_user(&access_token).await?;
        let session = AuthSession {
            access_token,
            refresh_token,
            expires_at,
            user,
        };

        let mut state = self.state.write().await;
        self.store
            .set(KEY_AUTH_SESSION, &serde_json::to_string(&session).map_err(StoreError::from)?)?;
        self.client
            .set_access_token(Some(session.access_token.clone()))
            .await;
        info!(user_id = %session.user.id, "signed in");
        state.session = Some(session);
        state.loading = false;
        drop(state);

        let return_to = self
            .store
            .get(KEY_AUTH_RETURN_TO)
            .filter(|path| is_in_app_path(path))
            .unwrap_or_else(|| DEFAULT_RETURN_TO.to_string());
        self.store.remove(KEY_AUTH_RETURN_TO)?;
        Ok(return_to)
    }

    pub async fn sign_out(&self) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if let Some(session) = &state.session {
            if let Err(err) = self.auth.sign_out(&session.access_token).await {
                warn!(%err, "backend sign-out failed, clearing local session anyway");
            }
        }
        self.store.remove(KEY_AUTH_SESSION)?;
        self.client.set_access_token(None).await;
        state.session = None;
        Ok(())
    }
}

/// Expiry for a fresh session. Values outside `1..=MAX_EXPIRES_IN_SECONDS`
/// or unparsable ones fall back to the default lifetime.
fn session_expiry(now: DateTime<Utc>, expires_in: Option<&str>) -> DateTime<Utc> {
    let seconds = expires_in
        .and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|s| (1..=MAX_EXPIRES_IN_SECONDS).contains(s))
        .unwrap_or(DEFAULT_EXPIRES_IN_SECONDS);
    Duration::try_seconds(seconds)
        .and_then(|d| now.checked_add_signed(d))
        .unwrap_or(now)
}

/// Only same-origin paths: a leading `/` that is not `//` or `/\`.
fn is_in_app_path(path: &str) -> bool {
    path.starts_with('/') && !path.starts_with("//") && !path.starts_with("/\\")
}

/// Key/value pairs from the fragment of a callback URL, falling back to the
/// query string.
fn callback_params(url: &str) -> Vec<(String, String)> {
    let raw = match url.split_once('#') {
        Some((_, fragment)) => fragment,
        None => url.split_once('?').map(|(_, q)| q).unwrap_or(""),
    };
    raw.split('&')
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| {
            let value = urlencoding::decode(&v.replace('+', " "))
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| v.to_string());
            (k.to_string(), value)
        })
        .collect()
}
