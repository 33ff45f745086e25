/// In-memory catalog with programmable latency and failures
///
/// Like a real HTTP call, a response is delivered after its delay even when
/// the caller's token fires in the meantime; discarding it is the caller's job.
use async_trait::async_trait;
use cardsearch_lib::modules::catalog::{Card, CatalogRepository};
use cardsearch_lib::shared::errors::{AppError, AppResult};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub const RECENT_CALL: &str = "<recent>";

#[derive(Clone)]
struct Response {
    result: AppResult<Vec<Card>>,
    delay: Duration,
}

impl Default for Response {
    fn default() -> Self {
        Self {
            result: Ok(Vec::new()),
            delay: Duration::from_millis(10),
        }
    }
}

#[derive(Default)]
pub struct FakeCatalog {
    searches: Mutex<HashMap<String, Response>>,
    recent: Mutex<Response>,
    calls: Mutex<Vec<String>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(self, term: &str, cards: Vec<Card>) -> Self {
        self.set_search(term, Ok(cards), Duration::from_millis(10));
        self
    }

    pub fn with_slow_search(self, term: &str, cards: Vec<Card>, delay: Duration) -> Self {
        self.set_search(term, Ok(cards), delay);
        self
    }

    pub fn with_recent(self, cards: Vec<Card>) -> Self {
        self.set_recent(Ok(cards));
        self
    }

    /// Replace the response for `term`
    pub fn set_search(&self, term: &str, result: AppResult<Vec<Card>>, delay: Duration) {
        self.searches
            .lock()
            .unwrap()
            .insert(term.to_string(), Response { result, delay });
    }

    pub fn fail_search(&self, term: &str, error: AppError) {
        self.set_search(term, Err(error), Duration::from_millis(10));
    }

    pub fn set_recent(&self, result: AppResult<Vec<Card>>) {
        let mut recent = self.recent.lock().unwrap();
        recent.result = result;
    }

    /// Every call so far, in issue order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, term: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == term).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl CatalogRepository for FakeCatalog {
    async fn search_cards(
        &self,
        term: &str,
        _page_size: u32,
        _cancel: &CancellationToken,
    ) -> AppResult<Vec<Card>> {
        self.calls.lock().unwrap().push(term.to_string());
        let response = self
            .searches
            .lock()
            .unwrap()
            .get(term)
            .cloned()
            .unwrap_or_default();
        tokio::time::sleep(response.delay).await;
        response.result
    }

    async fn recent_cards(
        &self,
        _page_size: u32,
        _cancel: &CancellationToken,
    ) -> AppResult<Vec<Card>> {
        self.calls.lock().unwrap().push(RECENT_CALL.to_string());
        let response = self.recent.lock().unwrap().clone();
        tokio::time::sleep(response.delay).await;
        response.result
    }
}
