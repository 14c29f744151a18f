use std::sync::Arc;

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

const REST_PATH: &str = "rest/v1";

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("backend responded with status {status}: {message}")]
    Api {
        status: StatusCode,
        message: String,
        code: Option<String>,
    },
    #[error("backend returned an invalid response: {0}")]
    InvalidResponse(String),
}

impl BackendError {
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            BackendError::Api { status, .. }
                if *status == StatusCode::UNAUTHORIZED || *status == StatusCode::FORBIDDEN
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, BackendError::Api { status, .. } if *status == StatusCode::NOT_FOUND)
    }
}

#[derive(Debug, Deserialize)]
struct BackendErrorBody {
    message: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
    code: Option<Value>,
}

/// HTTP handle on the hosted backend. Cheap to clone; clones share the
/// signed-in access token.
#[derive(Clone)]
pub struct BackendClient {
    http: Client,
    base_url: String,
    anon_key: String,
    access_token: Arc<RwLock<Option<String>>>,
}

impl BackendClient {
    pub fn new(http: Client, base_url: &str, anon_key: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            access_token: Arc::new(RwLock::new(None)),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn set_access_token(&self, token: Option<String>) {
        *self.access_token.write().await = token;
    }

    pub async fn access_token(&self) -> Option<String> {
        self.access_token.read().await.clone()
    }

    /// Request with the project key and the caller's bearer token, falling
    /// back to the anon key when nobody is signed in.
    pub async fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let bearer = self
            .access_token()
            .await
            .unwrap_or_else(|| self.anon_key.clone());
        self.request_as(method, path, &bearer)
    }

    /// Request authorized with an explicit token instead of the shared one.
    pub fn request_as(&self, method: Method, path: &str, bearer: &str) -> RequestBuilder {
        self.http
            .request(method, self.url(path))
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
            .header(reqwest::header::ACCEPT, "application/json")
    }

    pub fn from(&self, table: &str) -> TableQuery<'_> {
        TableQuery {
            client: self,
            table: table.to_string(),
            params: Vec::new(),
        }
    }

    pub async fn rpc<T: DeserializeOwned>(
        &self,
        function: &str,
        args: &Value,
    ) -> Result<T, BackendError> {
        let request = self
            .request(Method::POST, &format!("{REST_PATH}/rpc/{function}"))
            .await
            .json(args);
        send_json(request).await
    }
}

/// Filtered table request in PostgREST query syntax.
pub struct TableQuery<'a> {
    client: &'a BackendClient,
    table: String,
    params: Vec<(String, String)>,
}

impl<'a> TableQuery<'a> {
    pub fn select(mut self, columns: &str) -> Self {
        self.params.push(("select".into(), columns.into()));
        self
    }

    pub fn eq(mut self, column: &str, value: impl ToString) -> Self {
        self.params
            .push((column.into(), format!("eq.{}", value.to_string())));
        self
    }

    pub fn ilike(mut self, column: &str, pattern: &str) -> Self {
        self.params.push((column.into(), format!("ilike.{pattern}")));
        self
    }

    /// Raw `or=(...)` filter, e.g. `name.ilike.*ravi*,name_telugu.ilike.*ravi*`.
    pub fn or(mut self, filters: &str) -> Self {
        self.params.push(("or".into(), format!("({filters})")));
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        let direction = if ascending { "asc" } else { "desc" };
        self.params
            .push(("order".into(), format!("{column}.{direction}")));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.params.push(("limit".into(), limit.to_string()));
        self
    }

    async fn builder(&self, method: Method) -> RequestBuilder {
        self.client
            .request(method, &format!("{REST_PATH}/{}", self.table))
            .await
            .query(&self.params)
    }

    pub async fn fetch<T: DeserializeOwned>(self) -> Result<Vec<T>, BackendError> {
        debug!(table = %self.table, "select");
        send_json(self.builder(Method::GET).await).await
    }

    /// First row or `None`; a missing row is an empty state, not an error.
    pub async fn maybe_single<T: DeserializeOwned>(self) -> Result<Option<T>, BackendError> {
        let rows: Vec<T> = self.limit(1).fetch().await?;
        Ok(rows.into_iter().next())
    }

    pub async fn insert<B: Serialize + ?Sized, T: DeserializeOwned>(
        self,
        body: &B,
    ) -> Result<T, BackendError> {
        debug!(table = %self.table, "insert");
        let request = self
            .builder(Method::POST)
            .await
            .header("Prefer", "return=representation")
            .json(body);
        first_row(send_json(request).await?)
    }

    pub async fn upsert<B: Serialize + ?Sized, T: DeserializeOwned>(
        self,
        body: &B,
        on_conflict: &str,
    ) -> Result<T, BackendError> {
        debug!(table = %self.table, "upsert");
        let request = self
            .builder(Method::POST)
            .await
            .query(&[("on_conflict", on_conflict)])
            .header(
                "Prefer",
                "resolution=merge-duplicates,return=representation",
            )
            .json(body);
        first_row(send_json(request).await?)
    }

    pub async fn update<B: Serialize + ?Sized, T: DeserializeOwned>(
        self,
        body: &B,
    ) -> Result<Vec<T>, BackendError> {
        debug!(table = %self.table, "update");
        let request = self
            .builder(Method::PATCH)
            .await
            .header("Prefer", "return=representation")
            .json(body);
        send_json(request).await
    }

    pub async fn delete(self) -> Result<(), BackendError> {
        debug!(table = %self.table, "delete");
        let response = self.builder(Method::DELETE).await.send().await?;
        check_status(response).await.map(|_| ())
    }
}

fn first_row<T>(rows: Vec<T>) -> Result<T, BackendError> {
    rows.into_iter()
        .next()
        .ok_or_else(|| BackendError::InvalidResponse("mutation returned no rows".into()))
}

pub(crate) async fn check_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let parsed = serde_json::from_str::<BackendErrorBody>(&body).ok();
    let message = parsed
        .as_ref()
        .and_then(|err| {
            err.message
                .clone()
                .or_else(|| err.msg.clone())
                .or_else(|| err.error_description.clone())
        })
        .map(|msg| msg.trim().to_string())
        .filter(|msg| !msg.is_empty())
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                status.canonical_reason().unwrap_or("error").to_string()
            } else {
                trimmed.to_string()
            }
        });
    let code = parsed.and_then(|err| err.code).map(|code| match code {
        Value::String(s) => s,
        other => other.to_string(),
    });

    Err(BackendError::Api {
        status,
        message,
        code,
    })
}

pub(crate) async fn send_json<T: DeserializeOwned>(
    request: RequestBuilder,
) -> Result<T, BackendError> {
    let response = check_status(request.send().await?).await?;
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|err| BackendError::InvalidResponse(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::GET, Method::PATCH, Method::POST, MockServer};
    use serde_json::json;

    fn client(server: &MockServer) -> BackendClient {
        BackendClient::new(Client::new(), &server.base_url(), "anon-key")
    }

    #[tokio::test]
    async fn select_sends_filters_and_anon_bearer() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/rest/v1/festivals")
                    .query_param("select", "*")
                    .query_param("name", "eq.Dasara")
                    .query_param("order", "year.desc")
                    .header("apikey", "anon-key")
                    .header("authorization", "Bearer anon-key");
                then.status(200).json_body(json!([{"name": "Dasara", "year": 2024}]));
            })
            .await;

        let rows: Vec<Value> = client(&server)
            .from("festivals")
            .select("*")
            .eq("name", "Dasara")
            .order("year", false)
            .fetch()
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn signed_in_requests_use_access_token() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(PATCH)
                    .path("/rest/v1/donations")
                    .query_param("id", "eq.42")
                    .header("authorization", "Bearer user-token")
                    .header("Prefer", "return=representation")
                    .json_body(json!({"received_amount": 10.0}));
                then.status(200).json_body(json!([{"id": 42}]));
            })
            .await;

        let backend = client(&server);
        backend.set_access_token(Some("user-token".into())).await;
        let rows: Vec<Value> = backend
            .from("donations")
            .eq("id", 42)
            .update(&json!({"received_amount": 10.0}))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(rows, vec![json!({"id": 42})]);
    }

    #[tokio::test]
    async fn api_errors_carry_backend_message_and_code() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/rest/v1/rpc/verify_organization_passcode");
                then.status(400)
                    .json_body(json!({"message": "function not found", "code": "PGRST202"}));
            })
            .await;

        let err = client(&server)
            .rpc::<bool>("verify_organization_passcode", &json!({}))
            .await
            .expect_err("400 should surface as an api error");

        match err {
            BackendError::Api {
                status,
                message,
                code,
            } => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert_eq!(message, "function not found");
                assert_eq!(code.as_deref(), Some("PGRST202"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn maybe_single_returns_none_for_empty_result() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/rest/v1/organizations")
                    .query_param("limit", "1");
                then.status(200).json_body(json!([]));
            })
            .await;

        let row: Option<Value> = client(&server)
            .from("organizations")
            .eq("slug", "missing")
            .maybe_single()
            .await
            .unwrap();
        assert!(row.is_none());
    }
}
