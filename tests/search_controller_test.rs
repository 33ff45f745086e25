/// End-to-end behaviour of the debounced search pipeline against an
/// in-memory catalog, on a paused tokio clock
mod utils;

use cardsearch_lib::modules::search::{
    CacheKey, RankingConfig, ResultCache, SearchConfig, SearchController, SearchPhase, SearchState,
};
use cardsearch_lib::shared::errors::AppError;
use cardsearch_lib::shared::utils::ManualClock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::timeout;
use utils::factories::priced;
use utils::fake_catalog::RECENT_CALL;
use utils::{CardFactory, FakeCatalog};

fn build(catalog: &Arc<FakeCatalog>, cache: Arc<ResultCache>) -> SearchController {
    SearchController::new(
        catalog.clone(),
        cache,
        &SearchConfig::default(),
        RankingConfig::default(),
    )
}

fn fresh_cache() -> Arc<ResultCache> {
    Arc::new(ResultCache::with_ttl(Duration::from_secs(300)))
}

/// Wait until the search for `query` has published its results
async fn settle(rx: &mut watch::Receiver<SearchState>, query: &str) -> SearchState {
    timeout(
        Duration::from_secs(30),
        rx.wait_for(|s| s.phase == SearchPhase::Ready && s.query.trim() == query),
    )
    .await
    .expect("search never settled")
    .expect("controller dropped")
    .clone()
}

fn ids(state: &SearchState) -> Vec<&str> {
    state.cards.iter().map(|c| c.id.as_str()).collect()
}

#[tokio::test(start_paused = true)]
async fn popular_cards_load_on_start() {
    let catalog = Arc::new(FakeCatalog::new().with_recent(vec![
        priced("cheap", "Pidgey", 1.0),
        CardFactory::new().id("unpriced").name("Rattata").build(),
        priced("pricey", "Umbreon VMAX", 50.0),
    ]));
    let controller = build(&catalog, fresh_cache());
    let mut rx = controller.subscribe();

    let state = settle(&mut rx, "").await;

    assert_eq!(ids(&state), vec!["pricey", "cheap"]);
    assert!(!state.is_searching);
    assert_eq!(catalog.calls(), vec![RECENT_CALL.to_string()]);
    assert!(controller.cache().get(&CacheKey::Popular).is_some());
}

#[tokio::test(start_paused = true)]
async fn repeated_query_within_ttl_makes_no_network_call() {
    let catalog = Arc::new(
        FakeCatalog::new()
            .with_search("Pikachu", vec![priced("base1-58", "Pikachu", 3.0)])
            .with_search("Mewtwo", vec![priced("base1-10", "Mewtwo", 40.0)]),
    );
    let controller = build(&catalog, fresh_cache());
    let mut rx = controller.subscribe();
    settle(&mut rx, "").await;

    controller.set_search_query("Pikachu");
    let first = settle(&mut rx, "Pikachu").await;
    controller.set_search_query("Mewtwo");
    settle(&mut rx, "Mewtwo").await;
    controller.set_search_query("  Pikachu ");
    let second = settle(&mut rx, "Pikachu").await;

    assert_eq!(first.cards, second.cards);
    assert_eq!(ids(&second), vec!["base1-58"]);
    assert_eq!(catalog.call_count("Pikachu"), 1);
    assert_eq!(catalog.call_count("Mewtwo"), 1);
}

#[tokio::test(start_paused = true)]
async fn expired_entry_is_fetched_again() {
    let clock = Arc::new(ManualClock::default());
    let cache = Arc::new(ResultCache::new(Duration::from_secs(300), clock.clone()));
    let catalog = Arc::new(
        FakeCatalog::new()
            .with_search("Pikachu", vec![priced("base1-58", "Pikachu", 3.0)])
            .with_search("Mewtwo", vec![priced("base1-10", "Mewtwo", 40.0)]),
    );
    let controller = build(&catalog, cache);
    let mut rx = controller.subscribe();
    settle(&mut rx, "").await;

    controller.set_search_query("Pikachu");
    settle(&mut rx, "Pikachu").await;
    controller.set_search_query("Mewtwo");
    settle(&mut rx, "Mewtwo").await;

    clock.advance(chrono::Duration::seconds(301));
    controller.set_search_query("Pikachu");
    settle(&mut rx, "Pikachu").await;

    assert_eq!(catalog.call_count("Pikachu"), 2);
}

#[tokio::test(start_paused = true)]
async fn rapid_typing_fires_one_search() {
    let catalog = Arc::new(FakeCatalog::new().with_search("Mew", vec![priced("mew", "Mew", 9.0)]));
    let controller = build(&catalog, fresh_cache());
    let mut rx = controller.subscribe();
    settle(&mut rx, "").await;

    for text in ["M", "Me", "Mew"] {
        controller.set_search_query(text);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(controller.is_searching());
    }
    let state = settle(&mut rx, "Mew").await;

    assert_eq!(state.generation, 2);
    assert_eq!(catalog.call_count("M"), 0);
    assert_eq!(catalog.call_count("Me"), 0);
    assert_eq!(catalog.call_count("Mew"), 1);
}

#[tokio::test(start_paused = true)]
async fn latest_search_wins_when_earlier_response_arrives_last() {
    let catalog = Arc::new(
        FakeCatalog::new()
            .with_slow_search(
                "Lugia",
                vec![priced("lugia", "Lugia", 80.0)],
                Duration::from_millis(500),
            )
            .with_search("Mew", vec![priced("mew", "Mew", 9.0)]),
    );
    let cache = fresh_cache();
    let controller = build(&catalog, cache.clone());
    let mut rx = controller.subscribe();
    settle(&mut rx, "").await;

    controller.set_search_query("Lugia");
    timeout(
        Duration::from_secs(5),
        rx.wait_for(|s| s.phase == SearchPhase::Fetching && s.query == "Lugia"),
    )
    .await
    .expect("Lugia search never fired")
    .expect("controller dropped");

    controller.set_search_query("Mew");
    let state = settle(&mut rx, "Mew").await;
    assert_eq!(ids(&state), vec!["mew"]);

    // let the superseded response come back
    tokio::time::sleep(Duration::from_secs(1)).await;

    let state = controller.state();
    assert_eq!(state.query, "Mew");
    assert_eq!(ids(&state), vec!["mew"]);
    assert_eq!(catalog.call_count("Lugia"), 1);
    assert!(cache.get_any(&CacheKey::from_query("Lugia")).is_none());
}

#[tokio::test(start_paused = true)]
async fn merged_results_are_unique_by_id() {
    let catalog = Arc::new(
        FakeCatalog::new()
            .with_search(
                "Lugia",
                vec![
                    priced("swsh12-186", "Lugia V", 5.0),
                    priced("sm8-1", "Lugia GX", 100.0),
                ],
            )
            .with_search(
                "Lugia V",
                vec![
                    priced("swsh12-186", "Lugia V", 5.0),
                    priced("swsh12-138", "Lugia V", 20.0),
                ],
            ),
    );
    let controller = build(&catalog, fresh_cache());
    let mut rx = controller.subscribe();
    settle(&mut rx, "").await;

    controller.set_search_query("Lugia V");
    let state = settle(&mut rx, "Lugia V").await;

    // exact names first, price breaking the tie; the GX only after them
    assert_eq!(ids(&state), vec!["swsh12-138", "swsh12-186", "sm8-1"]);
    assert_eq!(catalog.call_count("Lugia"), 1);
    assert_eq!(catalog.call_count("Lugia V"), 1);
}

#[tokio::test(start_paused = true)]
async fn failed_query_still_publishes_other_results() {
    let catalog = Arc::new(
        FakeCatalog::new().with_search("Lugia V", vec![priced("swsh12-138", "Lugia V", 20.0)]),
    );
    catalog.fail_search("Lugia", AppError::ExternalServiceError("502".to_string()));
    let controller = build(&catalog, fresh_cache());
    let mut rx = controller.subscribe();
    settle(&mut rx, "").await;

    controller.set_search_query("Lugia V");
    let state = settle(&mut rx, "Lugia V").await;

    assert_eq!(ids(&state), vec!["swsh12-138"]);
    assert!(controller.cache().get(&CacheKey::from_query("Lugia V")).is_some());
}

#[tokio::test(start_paused = true)]
async fn failure_falls_back_to_stale_cache() {
    let clock = Arc::new(ManualClock::default());
    let cache = Arc::new(ResultCache::new(Duration::from_secs(300), clock.clone()));
    let catalog = Arc::new(
        FakeCatalog::new()
            .with_recent(vec![priced("pop", "Charizard ex", 120.0)])
            .with_search("Mew", vec![priced("mew", "Mew", 9.0)]),
    );
    let controller = build(&catalog, cache);
    let mut rx = controller.subscribe();
    settle(&mut rx, "").await;

    controller.set_search_query("Mew");
    settle(&mut rx, "Mew").await;

    clock.advance(chrono::Duration::minutes(10));
    catalog.set_recent(Err(AppError::RateLimitError("429".to_string())));
    controller.clear_search();
    let state = settle(&mut rx, "").await;

    assert_eq!(catalog.call_count(RECENT_CALL), 2);
    assert_eq!(ids(&state), vec!["pop"]);
    assert!(!state.is_searching);
}

#[tokio::test(start_paused = true)]
async fn popular_failure_without_cache_publishes_nothing() {
    let catalog = Arc::new(FakeCatalog::new());
    catalog.set_recent(Err(AppError::ExternalServiceError("timeout".to_string())));
    let controller = build(&catalog, fresh_cache());
    let mut rx = controller.subscribe();

    let state = settle(&mut rx, "").await;

    assert!(state.cards.is_empty());
    assert!(!state.is_searching);
    assert!(controller.cache().get_any(&CacheKey::Popular).is_none());
}

#[tokio::test(start_paused = true)]
async fn search_with_every_query_failing_caches_empty_result() {
    let catalog = Arc::new(FakeCatalog::new().with_search("Mew", vec![priced("mew", "Mew", 9.0)]));
    catalog.fail_search("Zapdos", AppError::ExternalServiceError("timeout".to_string()));
    let controller = build(&catalog, fresh_cache());
    let mut rx = controller.subscribe();
    settle(&mut rx, "").await;

    controller.set_search_query("Zapdos");
    let state = settle(&mut rx, "Zapdos").await;
    assert!(state.cards.is_empty());
    assert!(!state.is_searching);
    assert_eq!(
        controller
            .cache()
            .get(&CacheKey::from_query("Zapdos"))
            .map(|cards| cards.len()),
        Some(0)
    );

    controller.set_search_query("Mew");
    settle(&mut rx, "Mew").await;
    controller.set_search_query("Zapdos");
    let state = settle(&mut rx, "Zapdos").await;

    assert!(state.cards.is_empty());
    assert_eq!(catalog.call_count("Zapdos"), 1);
}

#[tokio::test(start_paused = true)]
async fn clear_search_returns_to_popular_cards() {
    let catalog = Arc::new(
        FakeCatalog::new()
            .with_recent(vec![priced("pop", "Charizard ex", 120.0)])
            .with_search("Mew", vec![priced("mew", "Mew", 9.0)]),
    );
    let controller = build(&catalog, fresh_cache());
    let mut rx = controller.subscribe();
    settle(&mut rx, "").await;

    controller.set_search_query("Mew");
    settle(&mut rx, "Mew").await;

    controller.clear_search();
    assert_eq!(controller.search_query(), "");
    let state = settle(&mut rx, "").await;

    assert_eq!(ids(&state), vec!["pop"]);
    assert_eq!(catalog.call_count(RECENT_CALL), 1);
}
