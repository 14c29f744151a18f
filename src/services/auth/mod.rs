use async_trait::async_trait;
use std::fmt;

use crate::models::user::{AuthSession, SessionUser};

mod rest_auth;
#[cfg(test)]
mod mock_auth;

#[cfg(test)]
pub use mock_auth::MockAuth;
pub use rest_auth::RestAuthService;

#[derive(Debug)]
pub enum AuthError {
    InvalidEmail(String),
    MagicLinkFailed(String),
    RefreshFailed,
    InvalidSession,
    UserFetchFailed,
    InvalidCallback(&'static str),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use AuthError::*;
        match self {
            InvalidEmail(email) => write!(f, "Invalid email address: {}", email),
            MagicLinkFailed(msg) => write!(f, "Could not send sign-in link: {}", msg),
            RefreshFailed => write!(f, "Session refresh failed"),
            InvalidSession => write!(f, "Invalid session response"),
            UserFetchFailed => write!(f, "Failed to fetch signed-in user"),
            InvalidCallback(what) => write!(f, "Sign-in callback is missing {}", what),
        }
    }
}

impl std::error::Error for AuthError {}

/// Account session operations of the hosted backend (passwordless sign-in).
#[async_trait]
pub trait AuthService: Send + Sync {
    async fn send_magic_link(&self, email: &str, redirect_to: &str) -> Result<(), AuthError>;
    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, AuthError>;
    async fn get_user(&self, access_token: &str) -> Result<SessionUser, AuthError>;
    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;
}
