use serde::{Deserialize, Serialize};

/// Fallback when no base URL is configured anywhere.
pub const DEFAULT_API_BASE: &str = "http://localhost:3001";

/// Environment variable consulted by [`ApiConfig::from_env`].
pub const API_URL_ENV: &str = "LINKCHAT_API_URL";

/// Connection settings for the ingestion service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Base URL from `LINKCHAT_API_URL`, falling back to the default host.
    pub fn from_env() -> Self {
        match std::env::var(API_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => Self::new(url),
            _ => Self::default(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE)
    }
}
