use crate::shared::errors::{AppError, AppResult};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.pokemontcg.io/v2";

/// Connection settings for the upstream card catalog
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
    pub user_agent: String,
}

impl CatalogConfig {
    pub fn new(base_url: &str, api_key: Option<String>) -> Self {
        Self {
            base_url: Self::normalize_base_url(base_url),
            api_key,
            ..Self::default()
        }
    }

    /// Strip trailing slashes and make sure the path ends in the `/v2` API root
    pub fn normalize_base_url(raw: &str) -> String {
        let trimmed = raw.trim().trim_end_matches('/');
        if trimmed.ends_with("/v2") {
            trimmed.to_string()
        } else {
            format!("{}/v2", trimmed)
        }
    }

    pub fn cards_url(&self) -> String {
        format!("{}/cards", self.base_url)
    }

    pub fn validate(&self) -> AppResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(AppError::ConfigError(format!(
                "Catalog base URL must be http(s), got '{}'",
                self.base_url
            )));
        }
        if self.timeout.is_zero() {
            return Err(AppError::ConfigError(
                "Catalog request timeout must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(30),
            user_agent: "cardsearch/0.1".to_string(),
        }
    }
}
