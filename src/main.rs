use anyhow::Context;
use cardsearch_lib::modules::search::price_score;
use cardsearch_lib::shared::utils::init_logger;
use cardsearch_lib::{AppConfig, PokemonTcgClient, ResultCache, SearchController, SearchPhase};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

const SHOWN_RESULTS: usize = 10;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger();

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    let client = Arc::new(
        PokemonTcgClient::new(config.catalog.clone()).context("Failed to build catalog client")?,
    );

    if let Err(e) = client.check_connection(&CancellationToken::new()).await {
        warn!("Catalog unreachable, results will come from cache only: {}", e);
    }

    let cache = Arc::new(ResultCache::with_ttl(config.search.cache_ttl));
    let controller = SearchController::new(client, cache, &config.search, config.ranking.clone());

    let mut states = controller.subscribe();
    let printer = tokio::spawn(async move {
        while states.changed().await.is_ok() {
            let state = states.borrow_and_update().clone();
            if state.phase != SearchPhase::Ready {
                continue;
            }
            let label = if state.query.trim().is_empty() {
                "popular cards"
            } else {
                state.query.trim()
            };
            println!("== {} ({} results)", label, state.cards.len());
            for card in state.cards.iter().take(SHOWN_RESULTS) {
                println!(
                    "  {:<36} {:<24} ${:.2}",
                    card.name,
                    card.set.name,
                    price_score(card)
                );
            }
        }
    });

    info!("Type a card name to search; ':clear', ':stats' or ':quit'");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            ":quit" => break,
            ":clear" => controller.clear_search(),
            ":stats" => {
                let stats = controller.cache().stats();
                println!(
                    "cache: {} entries, {} hits, {} misses ({:.0}% hit rate)",
                    stats.entries_count,
                    stats.hits,
                    stats.misses,
                    stats.hit_rate() * 100.0
                );
            }
            _ => controller.set_search_query(line.clone()),
        }
    }

    drop(controller);
    printer.abort();
    Ok(())
}
