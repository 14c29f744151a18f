use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::warn;

use crate::db::rest_client::BackendClient;

pub const GEMINI_DEFAULT_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent";

#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("translation request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("translation service responded with status {0}")]
    Status(reqwest::StatusCode),
    #[error("translation service returned no text")]
    EmptyResponse,
    #[error("translation service is not configured")]
    NotConfigured,
}

/// Both operations fall back to the input text, so callers never see an
/// error: a failed translation is just an untranslated string.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate_name(&self, name: &str) -> String;
    async fn translate_search(&self, term: &str) -> String;
}

pub fn name_prompt(name: &str) -> String {
    format!(
        "Transliterate the following person or business name into Telugu script. \
         Reply with only the Telugu text and nothing else.\n\nName: {name}"
    )
}

pub fn search_prompt(term: &str) -> String {
    format!(
        "The following search term is a name written either in English or in Telugu. \
         If it is in English, transliterate it into Telugu script; if it is in Telugu, \
         transliterate it into English letters. Reply with only the converted text.\n\nTerm: {term}"
    )
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

/// Calls the generative-language API with a single prompt.
pub struct GeminiTranslator {
    pub client: Client,
    pub api_url: String,
    pub api_key: Option<String>,
}

impl GeminiTranslator {
    pub async fn generate(&self, prompt: &str) -> Result<String, TranslateError> {
        let key = self
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(TranslateError::NotConfigured)?;

        let res = self
            .client
            .post(&self.api_url)
            .query(&[("key", key)])
            .json(&json!({ "contents": [{ "parts": [{ "text": prompt }] }] }))
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(TranslateError::Status(res.status()));
        }

        let body: GeminiResponse = res.json().await?;
        body.candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .filter_map(|p| p.text)
            .map(|t| t.trim().to_string())
            .find(|t| !t.is_empty())
            .ok_or(TranslateError::EmptyResponse)
    }

    async fn generate_or_original(&self, prompt: String, original: &str) -> String {
        if original.trim().is_empty() {
            return original.to_string();
        }
        match self.generate(&prompt).await {
            Ok(text) => text,
            Err(err) => {
                warn!(%err, "translation failed, returning original text");
                original.to_string()
            }
        }
    }
}

#[async_trait]
impl Translator for GeminiTranslator {
    async fn translate_name(&self, name: &str) -> String {
        self.generate_or_original(name_prompt(name), name).await
    }

    async fn translate_search(&self, term: &str) -> String {
        self.generate_or_original(search_prompt(term), term).await
    }
}

/// Client side of the two translation endpoints.
pub struct FunctionTranslator {
    pub client: BackendClient,
    pub base_path: String,
}

impl FunctionTranslator {
    async fn call(&self, endpoint: &str, body: Value, field: &str, original: &str) -> String {
        let path = format!("{}/{}", self.base_path.trim_end_matches('/'), endpoint);
        let result = async {
            let res = self
                .client
                .request(Method::POST, &path)
                .await
                .json(&body)
                .send()
                .await?;
            if !res.status().is_success() {
                return Err(TranslateError::Status(res.status()));
            }
            let value: Value = res.json().await?;
            value[field]
                .as_str()
                .map(str::to_string)
                .filter(|s| !s.trim().is_empty())
                .ok_or(TranslateError::EmptyResponse)
        }
        .await;

        result.unwrap_or_else(|err| {
            warn!(%err, endpoint, "translation endpoint failed, keeping original");
            original.to_string()
        })
    }
}

#[async_trait]
impl Translator for FunctionTranslator {
    async fn translate_name(&self, name: &str) -> String {
        self.call("translate-name", json!({ "name": name }), "translatedName", name)
            .await
    }

    async fn translate_search(&self, term: &str) -> String {
        self.call(
            "translate-search",
            json!({ "searchTerm": term }),
            "translatedTerm",
            term,
        )
        .await
    }
}
