use async_trait::async_trait;
use chrono::Utc;
use rand::distr::Alphanumeric;
use rand::Rng;
use reqwest::Method;
use serde_json::json;
use thiserror::Error;

use crate::db::rest_client::{check_status, BackendClient, BackendError};

pub const IMAGE_BUCKET: &str = "festival-images";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage request failed: {0}")]
    Backend(#[from] BackendError),
    #[error("unsupported file name: {0}")]
    InvalidFileName(String),
}

impl From<reqwest::Error> for StorageError {
    fn from(err: reqwest::Error) -> Self {
        StorageError::Backend(BackendError::Http(err))
    }
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str)
        -> Result<(), StorageError>;
    async fn remove(&self, path: &str) -> Result<(), StorageError>;
    fn public_url(&self, path: &str) -> String;
}

/// Object path for a fresh upload: upload time plus a random suffix, keeping
/// the original extension.
pub fn upload_path(original_name: &str) -> Result<String, StorageError> {
    let extension = original_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.trim().to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .ok_or_else(|| StorageError::InvalidFileName(original_name.to_string()))?;
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    Ok(format!(
        "{}-{}.{}",
        Utc::now().timestamp_millis(),
        suffix.to_ascii_lowercase(),
        extension
    ))
}

pub fn content_type_for(path: &str) -> &'static str {
    match path.rsplit('.').next().unwrap_or_default() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

pub struct RestStorage {
    pub client: BackendClient,
    pub bucket: String,
}

impl RestStorage {
    pub fn images(client: BackendClient) -> Self {
        Self {
            client,
            bucket: IMAGE_BUCKET.to_string(),
        }
    }
}

#[async_trait]
impl ObjectStorage for RestStorage {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let request = self
            .client
            .request(
                Method::POST,
                &format!("storage/v1/object/{}/{}", self.bucket, path),
            )
            .await
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .header("x-upsert", "false")
            .body(bytes);
        check_status(request.send().await?).await?;
        Ok(())
    }

    async fn remove(&self, path: &str) -> Result<(), StorageError> {
        let request = self
            .client
            .request(Method::DELETE, &format!("storage/v1/object/{}", self.bucket))
            .await
            .json(&json!({ "prefixes": [path] }));
        check_status(request.send().await?).await?;
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        self.client
            .url(&format!("storage/v1/object/public/{}/{}", self.bucket, path))
    }
}
