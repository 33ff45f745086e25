use crate::modules::catalog::{Card, CatalogRepository};
use crate::modules::search::application::fetch_orchestrator::FetchOrchestrator;
use crate::modules::search::domain::config::{RankingConfig, SearchConfig};
use crate::modules::search::domain::services::{QueryPlanner, RankingEngine};
use crate::modules::search::infrastructure::cache::{CacheKey, ResultCache};
use crate::shared::utils::LogContext;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Where the current search stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SearchPhase {
    Idle,
    Debouncing,
    Fetching,
    Ready,
}

/// Snapshot published to subscribers after every transition
#[derive(Debug, Clone, Serialize)]
pub struct SearchState {
    /// Text the current phase refers to
    pub query: String,
    /// Ranked, de-duplicated results of the latest committed generation
    pub cards: Vec<Card>,
    pub is_searching: bool,
    pub phase: SearchPhase,
    /// Generation of the last search that fired
    pub generation: u64,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            query: String::new(),
            cards: Vec::new(),
            is_searching: false,
            phase: SearchPhase::Idle,
            generation: 0,
        }
    }
}

/// Everything a firing needs, shared between the debounce loop and the
/// per-generation search tasks
struct Pipeline {
    planner: QueryPlanner,
    ranking: RankingEngine,
    cache: Arc<ResultCache>,
    orchestrator: Arc<FetchOrchestrator>,
    state_tx: watch::Sender<SearchState>,
    debounce: Duration,
}

impl Pipeline {
    fn mark_debouncing(&self, text: String) {
        self.state_tx.send_modify(|state| {
            state.query = text;
            state.phase = SearchPhase::Debouncing;
            state.is_searching = true;
        });
    }

    /// Open a new generation and run the search for `text` in the background.
    ///
    /// The generation bump and the cancellation of the previous generation
    /// both happen here, before the spawned task can touch the network.
    fn fire(self: &Arc<Self>, text: String) {
        let mut generation = 0;
        self.state_tx.send_modify(|state| {
            state.generation += 1;
            generation = state.generation;
            state.query = text.clone();
            state.phase = SearchPhase::Fetching;
            state.is_searching = true;
        });
        let token = self.orchestrator.begin(generation);
        debug!("Search generation {} fired for '{}'", generation, text.trim());

        let pipeline = Arc::clone(self);
        tokio::spawn(async move {
            pipeline.run(text, generation, token).await;
        });
    }

    async fn run(&self, text: String, generation: u64, token: CancellationToken) {
        let key = CacheKey::from_query(&text);
        let query = text.trim();

        if let Some(cached) = self.cache.get(&key) {
            LogContext::search_operation(query, Some("cache"), Some(cached.len()));
            let ranked = self.ranking.rank(cached, query);
            self.commit(generation, ranked, None);
            return;
        }

        let queries = if key.is_popular() {
            Vec::new()
        } else {
            self.planner.plan(query)
        };

        match self.orchestrator.fetch(&queries, &token).await {
            Ok(cards) => {
                let ranked = self.ranking.rank(cards.clone(), query);
                if !self.commit(generation, ranked, Some((key, cards))) {
                    debug!("Discarding results of superseded generation {}", generation);
                }
            }
            Err(e) if e.is_cancelled() => {
                debug!("Search generation {} cancelled: {}", generation, e);
            }
            Err(e) => {
                LogContext::degraded(&format!("search for '{}'", key), &e);
                let fallback = self.cache.get_any(&key).unwrap_or_default();
                let ranked = self.ranking.rank(fallback, query);
                self.commit(generation, ranked, None);
            }
        }
    }

    /// Apply `cards` (and store `fresh` in the cache) only while `generation`
    /// is still the current one. Runs under the state lock, so a concurrent
    /// `fire` cannot interleave between the check and the writes.
    fn commit(
        &self,
        generation: u64,
        cards: Vec<Card>,
        fresh: Option<(CacheKey, Vec<Card>)>,
    ) -> bool {
        self.state_tx.send_if_modified(|state| {
            if state.generation != generation {
                return false;
            }
            if let Some((key, raw)) = fresh {
                self.cache.put(key, raw);
            }
            state.cards = cards;
            // a keystroke since firing keeps the indicator on
            if state.phase == SearchPhase::Fetching {
                state.phase = SearchPhase::Ready;
                state.is_searching = false;
            }
            true
        })
    }
}

/// Trailing-edge debounce over the input text. The text present at start
/// fires immediately.
async fn debounce_loop(pipeline: Arc<Pipeline>, mut input_rx: watch::Receiver<String>) {
    let initial = input_rx.borrow_and_update().clone();
    pipeline.fire(initial);

    loop {
        if input_rx.changed().await.is_err() {
            break;
        }
        pipeline.mark_debouncing(input_rx.borrow_and_update().clone());

        loop {
            tokio::select! {
                changed = input_rx.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    pipeline.mark_debouncing(input_rx.borrow_and_update().clone());
                }
                _ = tokio::time::sleep(pipeline.debounce) => break,
            }
        }

        let text = input_rx.borrow_and_update().clone();
        pipeline.fire(text);
    }

    debug!("Search input closed, debounce loop finished");
}

/// Debounced search state machine: text in, ranked cards out.
///
/// Must be created inside a tokio runtime; the debounce loop is spawned on it.
pub struct SearchController {
    input_tx: watch::Sender<String>,
    state_rx: watch::Receiver<SearchState>,
    pipeline: Arc<Pipeline>,
    debounce_task: JoinHandle<()>,
}

impl SearchController {
    pub fn new(
        repository: Arc<dyn CatalogRepository>,
        cache: Arc<ResultCache>,
        search_config: &SearchConfig,
        ranking_config: RankingConfig,
    ) -> Self {
        let (input_tx, input_rx) = watch::channel(String::new());
        let (state_tx, state_rx) = watch::channel(SearchState::default());

        let pipeline = Arc::new(Pipeline {
            planner: QueryPlanner::new(),
            ranking: RankingEngine::new(ranking_config),
            cache,
            orchestrator: Arc::new(FetchOrchestrator::new(repository, search_config)),
            state_tx,
            debounce: search_config.debounce,
        });

        let debounce_task = tokio::spawn(debounce_loop(Arc::clone(&pipeline), input_rx));
        info!(
            "Search controller started (debounce {:?}, cache ttl {:?})",
            search_config.debounce,
            pipeline.cache.ttl()
        );

        Self {
            input_tx,
            state_rx,
            pipeline,
            debounce_task,
        }
    }

    /// Replace the input text. Setting the current text again is a no-op.
    pub fn set_search_query(&self, text: impl Into<String>) {
        let text = text.into();
        self.input_tx.send_if_modified(|current| {
            if *current == text {
                false
            } else {
                *current = text;
                true
            }
        });
    }

    pub fn search_query(&self) -> String {
        self.input_tx.borrow().clone()
    }

    /// Reset the input; the popular cards come back through the usual debounce
    pub fn clear_search(&self) {
        self.set_search_query(String::new());
    }

    pub fn cards(&self) -> Vec<Card> {
        self.state_rx.borrow().cards.clone()
    }

    pub fn is_searching(&self) -> bool {
        self.state_rx.borrow().is_searching
    }

    pub fn state(&self) -> SearchState {
        self.state_rx.borrow().clone()
    }

    /// Receiver notified on every state transition
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state_rx.clone()
    }

    pub fn cache(&self) -> &Arc<ResultCache> {
        &self.pipeline.cache
    }
}

impl Drop for SearchController {
    fn drop(&mut self) {
        self.debounce_task.abort();
        self.pipeline.orchestrator.cancel_all();
    }
}
