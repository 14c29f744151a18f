use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

use crate::services::translation::GEMINI_DEFAULT_URL;

pub const DEFAULT_APP_ORIGIN: &str = "http://localhost:5173";
pub const DEFAULT_LOCAL_STORE_PATH: &str = ".utsav/local_store.json";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_RATE_LIMIT_MS: u64 = 200;
pub const DEFAULT_RATE_LIMIT_BURST: u32 = 20;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub backend_url: String,
    pub backend_anon_key: String,
    pub app_origin: String,
    pub local_store_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub gemini_api_key: Option<String>,
    pub gemini_api_url: String,
    pub rate_limit_ms: u64,
    pub rate_limit_burst: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same rules as `from_env`, reading values from `lookup`. Blank values
    /// count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let bind_raw = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.parse().map_err(|_| ConfigError::Invalid {
            name: "BIND_ADDR",
            value: bind_raw.clone(),
        })?;

        Ok(Config {
            backend_url: required("BACKEND_URL")?.trim_end_matches('/').to_string(),
            backend_anon_key: required("BACKEND_ANON_KEY")?,
            app_origin: get("APP_ORIGIN")
                .unwrap_or_else(|| DEFAULT_APP_ORIGIN.to_string())
                .trim_end_matches('/')
                .to_string(),
            local_store_path: get("LOCAL_STORE_PATH")
                .unwrap_or_else(|| DEFAULT_LOCAL_STORE_PATH.to_string())
                .into(),
            bind_addr,
            gemini_api_key: get("GEMINI_API_KEY"),
            gemini_api_url: get("GEMINI_API_URL").unwrap_or_else(|| GEMINI_DEFAULT_URL.to_string()),
            rate_limit_ms: parse_or(&get, "RATE_LIMITER_MILLISECONDS", DEFAULT_RATE_LIMIT_MS)?,
            rate_limit_burst: parse_or(&get, "RATE_LIMITER_BURST", DEFAULT_RATE_LIMIT_BURST)?,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match get(name) {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}
