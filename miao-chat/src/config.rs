use crate::error::{ChatError, Result};
use serde::Serialize;

pub const API_KEY_ENV: &str = "DEEPSEEK_API_KEY";
pub const BASE_URL_ENV: &str = "DEEPSEEK_BASE_URL";
pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com";
pub const DEFAULT_MODEL: &str = "deepseek-chat";
pub const DEFAULT_TEMPERATURE: f32 = 0.6;
pub const DEFAULT_MAX_TOKENS: u32 = 1024;
/// Messages of history sent in multi-turn mode (five exchanges).
pub const DEFAULT_HISTORY_WINDOW: usize = 10;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Configuration for the completion client and prompt assembly.
#[derive(Clone, Serialize)]
pub struct ChatConfig {
    #[serde(serialize_with = "serialize_masked")]
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Send recent history instead of only the latest message
    pub multi_turn: bool,
    pub history_window: usize,
    pub timeout_secs: u64,
}

impl std::fmt::Debug for ChatConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatConfig")
            .field("api_key", &self.masked_api_key())
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("multi_turn", &self.multi_turn)
            .field("history_window", &self.history_window)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            multi_turn: false,
            history_window: DEFAULT_HISTORY_WINDOW,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ChatConfig {
    /// Defaults overlaid with `DEEPSEEK_API_KEY` and `DEEPSEEK_BASE_URL`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Self {
        let mut config = Self::default();
        if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            config.api_key = Some(key.trim().to_string());
        }
        if let Some(url) = lookup(BASE_URL_ENV).filter(|u| !u.trim().is_empty()) {
            config.base_url = url.trim().to_string();
        }
        config
    }

    pub fn with_api_key<S: Into<String>>(mut self, api_key: S) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model<S: Into<String>>(mut self, model: S) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_multi_turn(mut self, multi_turn: bool) -> Self {
        self.multi_turn = multi_turn;
        self
    }

    /// The API key for display: first 8 and last 4 characters.
    pub fn masked_api_key(&self) -> String {
        match &self.api_key {
            Some(key) => mask_api_key(key),
            None => "<not set>".to_string(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ChatError::invalid_config(format!(
                "base_url must be an http(s) URL, got '{}'",
                self.base_url
            )));
        }
        if self.model.trim().is_empty() {
            return Err(ChatError::invalid_config("model must not be empty"));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ChatError::invalid_config(format!(
                "temperature must be within [0, 2], got {}",
                self.temperature
            )));
        }
        if self.max_tokens == 0 {
            return Err(ChatError::invalid_config("max_tokens must be greater than 0"));
        }
        if self.history_window == 0 {
            return Err(ChatError::invalid_config("history_window must be at least 1"));
        }
        Ok(())
    }
}

/// Mask a secret as `first8...last4`; short keys are fully masked.
pub fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 12 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..8].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

fn serialize_masked<S: serde::Serializer>(
    key: &Option<String>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match key {
        Some(key) => serializer.serialize_some(&mask_api_key(key)),
        None => serializer.serialize_none(),
    }
}
