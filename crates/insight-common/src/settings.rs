use crate::{InsightError, Result};
use std::fmt;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com/v1";
pub const DEFAULT_MODEL: &str = "deepseek-chat";

/// Keys checked for the API key, in order.
const API_KEY_VARS: [&str; 2] = ["deepseek_api_key", "DEEPSEEK_API_KEY"];
const BASE_URL_VAR: &str = "DEEPSEEK_BASE_URL";
const MODEL_VAR: &str = "DEEPSEEK_MODEL";

/// Runtime settings resolved from the process environment and `.env`.
#[derive(Clone, PartialEq)]
pub struct Settings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

impl Settings {
    /// Load `.env` from the working directory (if any) and read the environment.
    pub fn from_env() -> Self {
        match dotenv::dotenv() {
            Ok(path) => debug!("Loaded environment from {}", path.display()),
            Err(e) => debug!("No .env file loaded: {}", e),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve settings through an arbitrary lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_key = API_KEY_VARS.iter().find_map(|key| non_blank(*key));

        Self {
            api_key,
            base_url: non_blank(BASE_URL_VAR).unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: non_blank(MODEL_VAR).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }

    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            InsightError::Config(
                "DeepSeek API key not found, check the .env file (deepseek_api_key)".to_string(),
            )
        })
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

// Keeps the key out of logs.
impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}
