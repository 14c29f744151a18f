use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::context::local_store::{LocalStore, StoreError, KEY_DEVICE_ID, KEY_LANGUAGE, KEY_THEME};
use crate::errors::AppError;
use crate::utils::token::random_device_id;

pub const DEFAULT_THEME: &str = "light";
pub const THEMES: [&str; 4] = ["light", "dark", "festive", "traditional"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    English,
    Telugu,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Telugu => "te",
        }
    }

    pub fn toggled(&self) -> Language {
        match self {
            Language::English => Language::Telugu,
            Language::Telugu => Language::English,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Language::English),
            "te" | "telugu" => Ok(Language::Telugu),
            other => Err(AppError::Validation(format!("unknown language: {other}"))),
        }
    }
}

#[derive(Debug)]
struct Preferences {
    theme: String,
    language: Language,
}

/// Theme and language choice for this device. No server interaction.
pub struct PreferencesContext {
    store: Arc<dyn LocalStore>,
    state: RwLock<Preferences>,
}

impl PreferencesContext {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        let theme = store
            .get(KEY_THEME)
            .filter(|t| THEMES.contains(&t.as_str()))
            .unwrap_or_else(|| DEFAULT_THEME.to_string());
        let language = store
            .get(KEY_LANGUAGE)
            .and_then(|l| l.parse().ok())
            .unwrap_or_default();
        Self {
            store,
            state: RwLock::new(Preferences { theme, language }),
        }
    }

    pub async fn theme(&self) -> String {
        self.state.read().await.theme.clone()
    }

    pub async fn set_theme(&self, theme: &str) -> Result<(), AppError> {
        if !THEMES.contains(&theme) {
            return Err(AppError::Validation(format!("unknown theme: {theme}")));
        }
        let mut state = self.state.write().await;
        self.store.set(KEY_THEME, theme)?;
        state.theme = theme.to_string();
        Ok(())
    }

    pub async fn language(&self) -> Language {
        self.state.read().await.language
    }

    pub async fn set_language(&self, language: Language) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        self.store.set(KEY_LANGUAGE, language.code())?;
        state.language = language;
        Ok(())
    }

    pub async fn toggle_language(&self) -> Result<Language, StoreError> {
        let mut state = self.state.write().await;
        let next = state.language.toggled();
        self.store.set(KEY_LANGUAGE, next.code())?;
        state.language = next;
        Ok(next)
    }

    /// Stable per-device identifier, created on first use. Anonymous voting
    /// uses it in place of a phone number.
    pub fn device_id(&self) -> Result<String, StoreError> {
        if let Some(id) = self.store.get(KEY_DEVICE_ID) {
            return Ok(id);
        }
        let id = random_device_id();
        self.store.set(KEY_DEVICE_ID, &id)?;
        Ok(id)
    }
}
