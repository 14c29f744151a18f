use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;

use crate::db::rest_client::BackendClient;
use crate::models::user::{AuthSession, SessionUser};
use crate::services::auth::{AuthError, AuthService};

pub struct RestAuthService {
    pub client: BackendClient,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
    user: SessionUser,
}

#[async_trait]
impl AuthService for RestAuthService {
    async fn send_magic_link(&self, email: &str, redirect_to: &str) -> Result<(), AuthError> {
        let res = self
            .client
            .request(Method::POST, "auth/v1/otp")
            .await
            .query(&[("redirect_to", redirect_to)])
            .json(&json!({ "email": email, "create_user": true }))
            .send()
            .await
            .map_err(|e| AuthError::MagicLinkFailed(e.to_string()))?;

        if !res.status().is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(AuthError::MagicLinkFailed(body));
        }
        Ok(())
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, AuthError> {
        let res = self
            .client
            .request(Method::POST, "auth/v1/token")
            .await
            .query(&[("grant_type", "refresh_token")])
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await
            .map_err(|_| AuthError::RefreshFailed)?;

        if !res.status().is_success() {
            return Err(AuthError::RefreshFailed);
        }

        let token: TokenResponse = res.json().await.map_err(|_| AuthError::InvalidSession)?;
        Ok(AuthSession {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_at: Utc::now() + Duration::seconds(token.expires_in),
            user: token.user,
        })
    }

    async fn get_user(&self, access_token: &str) -> Result<SessionUser, AuthError> {
        let res = self
            .client
            .request_as(Method::GET, "auth/v1/user", access_token)
            .send()
            .await
            .map_err(|_| AuthError::UserFetchFailed)?;

        if !res.status().is_success() {
            return Err(AuthError::UserFetchFailed);
        }

        res.json().await.map_err(|_| AuthError::UserFetchFailed)
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let res = self
            .client
            .request_as(Method::POST, "auth/v1/logout", access_token)
            .send()
            .await
            .map_err(|_| AuthError::InvalidSession)?;

        if !res.status().is_success() {
            return Err(AuthError::InvalidSession);
        }
        Ok(())
    }
}
