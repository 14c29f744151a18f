use super::{AuthError, AuthService};
use crate::models::user::{AuthSession, SessionUser};
use chrono::{Duration, Utc};
use std::sync::Mutex;

/// Records magic-link requests and serves canned sessions.
#[derive(Default)]
pub struct MockAuth {
    pub user: Option<SessionUser>,
    pub refresh_fails: bool,
    pub magic_links: Mutex<Vec<(String, String)>>,
    pub signed_out: Mutex<Vec<String>>,
}

impl MockAuth {
    pub fn with_user(user: SessionUser) -> Self {
        Self {
            user: Some(user),
            ..Default::default()
        }
    }
}

#[async_trait::async_trait]
impl AuthService for MockAuth {
    async fn send_magic_link(&self, email: &str, redirect_to: &str) -> Result<(), AuthError> {
        self.magic_links
            .lock()
            .unwrap()
            .push((email.to_string(), redirect_to.to_string()));
        Ok(())
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, AuthError> {
        if self.refresh_fails {
            return Err(AuthError::RefreshFailed);
        }
        let user = self.user.clone().ok_or(AuthError::RefreshFailed)?;
        Ok(AuthSession {
            access_token: format!("refreshed-{refresh_token}"),
            refresh_token: refresh_token.to_string(),
            expires_at: Utc::now() + Duration::hours(1),
            user,
        })
    }

    async fn get_user(&self, _access_token: &str) -> Result<SessionUser, AuthError> {
        self.user.clone().ok_or(AuthError::UserFetchFailed)
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        self.signed_out
            .lock()
            .unwrap()
            .push(access_token.to_string());
        Ok(())
    }
}
