//! Process configuration, read from the environment (and `.env` when present)

use crate::modules::catalog::CatalogConfig;
use crate::modules::search::{RankingConfig, SearchConfig};
use crate::shared::errors::{AppError, AppResult};
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const API_URL_ENV: &str = "POKEMON_TCG_API_URL";
pub const API_KEY_ENV: &str = "POKEMON_TCG_API_KEY";
pub const TIMEOUT_ENV: &str = "CARDSEARCH_TIMEOUT_SECS";
pub const DEBOUNCE_ENV: &str = "CARDSEARCH_DEBOUNCE_MS";
pub const CACHE_TTL_ENV: &str = "CARDSEARCH_CACHE_TTL_SECS";
pub const PAGE_SIZE_ENV: &str = "CARDSEARCH_PAGE_SIZE";
pub const POPULAR_PAGE_SIZE_ENV: &str = "CARDSEARCH_POPULAR_PAGE_SIZE";

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub catalog: CatalogConfig,
    pub search: SearchConfig,
    pub ranking: RankingConfig,
}

impl AppConfig {
    /// Build from environment variables, falling back to defaults for anything unset
    pub fn from_env() -> AppResult<Self> {
        // Load environment variables
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = non_empty(lookup(API_URL_ENV)) {
            config.catalog.base_url = CatalogConfig::normalize_base_url(&url);
        }
        config.catalog.api_key = non_empty(lookup(API_KEY_ENV));
        if let Some(secs) = parse_var::<u64>(&lookup, TIMEOUT_ENV)? {
            config.catalog.timeout = Duration::from_secs(secs);
        }

        if let Some(ms) = parse_var::<u64>(&lookup, DEBOUNCE_ENV)? {
            config.search.debounce = Duration::from_millis(ms);
        }
        if let Some(secs) = parse_var::<u64>(&lookup, CACHE_TTL_ENV)? {
            config.search.cache_ttl = Duration::from_secs(secs);
        }
        if let Some(size) = parse_var::<u32>(&lookup, PAGE_SIZE_ENV)? {
            config.search.page_size = size;
        }
        if let Some(size) = parse_var::<u32>(&lookup, POPULAR_PAGE_SIZE_ENV)? {
            config.search.popular_page_size = size;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        self.catalog.validate()?;
        self.search.validate()?;
        self.ranking.validate()?;
        Ok(())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> AppResult<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match non_empty(lookup(key)) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| AppError::ConfigError(format!("{} = '{}': {}", key, raw, e))),
    }
}
