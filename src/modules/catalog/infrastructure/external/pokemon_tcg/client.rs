use crate::modules::catalog::domain::entities::{CatalogConfig, Card};
use crate::modules::catalog::domain::repositories::CatalogRepository;
use crate::modules::catalog::infrastructure::http_client::RateLimitClient;
use crate::shared::errors::AppResult;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::dto::{CardListResponse, CARD_FIELDS};

/// Wildcard searches never ask for fewer than this many cards
pub const MIN_SEARCH_PAGE_SIZE: u32 = 100;
/// Largest page the catalog serves
pub const MAX_PAGE_SIZE: u32 = 250;

pub struct PokemonTcgClient {
    http: RateLimitClient,
    config: CatalogConfig,
}

impl PokemonTcgClient {
    pub fn new(config: CatalogConfig) -> AppResult<Self> {
        config.validate()?;
        let http = RateLimitClient::for_catalog(&config)?;
        Ok(Self { http, config })
    }

    /// `GET /cards?q=name:*term*&pageSize=n&select=...`
    pub fn search_url(&self, term: &str, page_size: u32) -> String {
        let page_size = page_size.max(MIN_SEARCH_PAGE_SIZE).min(MAX_PAGE_SIZE);
        format!(
            "{}?q=name:*{}*&pageSize={}&select={}",
            self.config.cards_url(),
            urlencoding::encode(term.trim()),
            page_size,
            CARD_FIELDS
        )
    }

    /// `GET /cards?pageSize=n&orderBy=-set.releaseDate&select=...`
    pub fn recent_url(&self, page_size: u32) -> String {
        format!(
            "{}?pageSize={}&orderBy=-set.releaseDate&select={}",
            self.config.cards_url(),
            page_size.clamp(1, MAX_PAGE_SIZE),
            CARD_FIELDS
        )
    }

    /// Connectivity check. Returns the catalog's total card count when reported.
    pub async fn check_connection(&self, cancel: &CancellationToken) -> AppResult<Option<u64>> {
        let url = format!("{}?page=1&pageSize=1", self.config.cards_url());
        let response: CardListResponse = self.http.get_json(&url, cancel).await?;
        info!(
            "Catalog reachable at {} (total cards: {})",
            self.config.base_url,
            response
                .total_count
                .map_or_else(|| "unknown".to_string(), |c| c.to_string())
        );
        Ok(response.total_count)
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }
}

#[async_trait]
impl CatalogRepository for PokemonTcgClient {
    async fn search_cards(
        &self,
        term: &str,
        page_size: u32,
        cancel: &CancellationToken,
    ) -> AppResult<Vec<Card>> {
        let url = self.search_url(term, page_size);
        let response: CardListResponse = self.http.get_json(&url, cancel).await?;
        let cards = response.into_cards();
        debug!("Catalog search '{}' returned {} cards", term, cards.len());
        Ok(cards)
    }

    async fn recent_cards(
        &self,
        page_size: u32,
        cancel: &CancellationToken,
    ) -> AppResult<Vec<Card>> {
        let url = self.recent_url(page_size);
        let response: CardListResponse = self.http.get_json(&url, cancel).await?;
        let cards = response.into_cards();
        debug!("Catalog recent page returned {} cards", cards.len());
        Ok(cards)
    }
}
