use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::{modules::catalog::domain::entities::Card, shared::errors::AppResult};

/// Repository interface for the upstream card catalog.
///
/// Implementations must observe `cancel`: once it fires they stop waiting and
/// return `AppError::Cancelled`, whatever state the underlying request is in.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Wildcard name search (`name:*term*`) returning at most `page_size` cards
    async fn search_cards(
        &self,
        term: &str,
        page_size: u32,
        cancel: &CancellationToken,
    ) -> AppResult<Vec<Card>>;

    /// Newest-first page of the catalog, uncurated
    async fn recent_cards(&self, page_size: u32, cancel: &CancellationToken)
        -> AppResult<Vec<Card>>;
}
