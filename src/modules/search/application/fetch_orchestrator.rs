use crate::modules::catalog::{Card, CatalogRepository};
use crate::modules::search::domain::config::SearchConfig;
use crate::modules::search::domain::services::ranking::has_usable_price;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::{LogContext, TimedOperation};
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Cancellation handle of the search currently allowed to run
struct InFlight {
    generation: u64,
    token: CancellationToken,
}

/// Issues the catalog requests for one search and merges their responses.
///
/// One token per generation: `begin` cancels the previous generation's token
/// before handing out a new one, so every request of a superseded search
/// observes cancellation.
pub struct FetchOrchestrator {
    repository: Arc<dyn CatalogRepository>,
    page_size: u32,
    popular_page_size: u32,
    current: Mutex<Option<InFlight>>,
}

impl FetchOrchestrator {
    pub fn new(repository: Arc<dyn CatalogRepository>, config: &SearchConfig) -> Self {
        Self {
            repository,
            page_size: config.page_size,
            popular_page_size: config.popular_page_size,
            current: Mutex::new(None),
        }
    }

    /// Cancel whatever is in flight and open `generation`
    pub fn begin(&self, generation: u64) -> CancellationToken {
        let token = CancellationToken::new();
        let previous = self
            .current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .replace(InFlight {
                generation,
                token: token.clone(),
            });

        if let Some(previous) = previous {
            debug!(
                "Generation {} superseded by {}",
                previous.generation, generation
            );
            previous.token.cancel();
        }
        token
    }

    /// Cancel the in-flight generation, if any
    pub fn cancel_all(&self) {
        let previous = self
            .current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(previous) = previous {
            previous.token.cancel();
        }
    }

    /// Generation that `begin` opened last
    pub fn current_generation(&self) -> Option<u64> {
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .as_ref()
            .map(|in_flight| in_flight.generation)
    }

    /// Fetch and merge the results for `queries`.
    ///
    /// No queries means the popularity path: one newest-first page, reduced
    /// to cards with a usable price. Otherwise every query is sent
    /// concurrently; a failed query contributes nothing, so the fan-out
    /// itself never fails short of cancellation and may come back empty.
    /// Merging keeps the first occurrence of each id in query order.
    pub async fn fetch(&self, queries: &[String], token: &CancellationToken) -> AppResult<Vec<Card>> {
        if token.is_cancelled() {
            return Err(AppError::Cancelled("search superseded before fetch".to_string()));
        }

        if queries.is_empty() {
            return self.fetch_popular(token).await;
        }

        let timer = TimedOperation::new("catalog_fetch");
        let results = join_all(
            queries
                .iter()
                .map(|query| self.repository.search_cards(query, self.page_size, token)),
        )
        .await;

        if token.is_cancelled() {
            return Err(AppError::Cancelled("search superseded during fetch".to_string()));
        }

        let mut seen = HashSet::new();
        let mut merged = Vec::new();
        let mut failed = 0usize;

        for (query, result) in queries.iter().zip(results) {
            match result {
                Ok(cards) => {
                    LogContext::search_operation(query, Some("catalog"), Some(cards.len()));
                    for card in cards {
                        if seen.insert(card.id.clone()) {
                            merged.push(card);
                        }
                    }
                }
                Err(e) if e.is_cancelled() => {
                    debug!("Query '{}' cancelled", query);
                }
                Err(e) => {
                    warn!("Query '{}' failed, contributing no results: {}", query, e);
                    failed += 1;
                }
            }
        }

        timer.finish_with_info(&format!(
            "{} queries ({} failed), {} unique cards",
            queries.len(),
            failed,
            merged.len()
        ));
        Ok(merged)
    }

    async fn fetch_popular(&self, token: &CancellationToken) -> AppResult<Vec<Card>> {
        let cards = self
            .repository
            .recent_cards(self.popular_page_size, token)
            .await?;

        if token.is_cancelled() {
            return Err(AppError::Cancelled("popular fetch superseded".to_string()));
        }

        let total = cards.len();
        let priced: Vec<Card> = cards.into_iter().filter(has_usable_price).collect();
        debug!("Popular page: {} of {} cards carry a price", priced.len(), total);
        Ok(priced)
    }
}
