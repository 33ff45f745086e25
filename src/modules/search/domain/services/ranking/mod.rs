//! Relevance ordering for merged catalog results
//!
//! Two tiers: a weighted fuzzy pass over the card name and a combined
//! name/subtypes/supertype string, and, only when that pass accepts nothing,
//! a plain substring scorer. Price breaks ties in both tiers and is the sole
//! key when there is no query text.

pub mod match_strategy;
pub mod price;

use crate::modules::catalog::Card;
use crate::modules::search::domain::config::RankingConfig;
use std::cmp::Ordering;
use tracing::debug;

pub use match_strategy::{ApproximateSubstringStrategy, MatchStrategy};
pub use price::{has_usable_price, price_score, PRICE_TIER_PRECEDENCE};

/// Stand-in for a perfect field score so the weighted product stays ordered
const PERFECT_SCORE_FLOOR: f64 = f64::EPSILON;

/// A card with its fuzzy score (lower is better) and cached price score
#[derive(Debug, Clone)]
pub struct ScoredCard {
    pub card: Card,
    pub score: f64,
    pub price: f64,
}

impl ScoredCard {
    pub fn new(card: Card, score: f64) -> Self {
        let price = price_score(&card);
        Self { card, score, price }
    }
}

pub struct RankingEngine {
    config: RankingConfig,
    strategy: Box<dyn MatchStrategy>,
}

impl RankingEngine {
    pub fn new(config: RankingConfig) -> Self {
        Self::with_strategy(config, Box::new(ApproximateSubstringStrategy))
    }

    pub fn with_strategy(config: RankingConfig, strategy: Box<dyn MatchStrategy>) -> Self {
        Self { config, strategy }
    }

    pub fn config(&self) -> &RankingConfig {
        &self.config
    }

    /// Reorder `cards` for `query`. Pure and deterministic for fixed inputs.
    pub fn rank(&self, cards: Vec<Card>, query: &str) -> Vec<Card> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Self::by_price(cards);
        }

        let total = cards.len();
        let matches: Vec<ScoredCard> = cards
            .iter()
            .filter_map(|card| {
                self.fuzzy_score(card, &query)
                    .map(|score| ScoredCard::new(card.clone(), score))
            })
            .collect();

        if !matches.is_empty() {
            debug!(
                "Fuzzy ranking ({}) accepted {}/{} cards for '{}'",
                self.strategy.name(),
                matches.len(),
                total,
                query
            );
            return self
                .sort_by_relevance(matches)
                .into_iter()
                .map(|scored| scored.card)
                .collect();
        }

        let ranked = self.fallback_rank(cards, &query);
        debug!(
            "Fuzzy ranking accepted nothing for '{}'; substring fallback kept {}/{}",
            query,
            ranked.len(),
            total
        );
        ranked
    }

    /// Lower-cased name, subtypes and supertype joined by spaces, blanks dropped
    pub fn searchable_text(card: &Card) -> String {
        std::iter::once(card.name.as_str())
            .chain(card.subtypes.iter().flatten().map(String::as_str))
            .chain(card.supertype.as_deref())
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }

    /// Weighted fuzzy score of a card, `None` when no field matches.
    ///
    /// `query` must already be lower-cased. Matching fields combine as a
    /// product of `score ^ weight`, so a card matching on both fields ranks
    /// ahead of one matching on a single field with the same score.
    pub fn fuzzy_score(&self, card: &Card, query: &str) -> Option<f64> {
        let name = card.name.to_lowercase();
        let combined = Self::searchable_text(card);
        let query_len = query.chars().count();

        let fields = [
            (name.as_str(), self.config.name_weight),
            (combined.as_str(), self.config.combined_weight),
        ];

        let mut total = 1.0;
        let mut matched = false;

        for (text, weight) in fields {
            if text.is_empty() {
                continue;
            }
            let score = self.strategy.score(query, text);
            let matched_chars = query_len as f64 * (1.0 - score);
            if score <= self.config.fuzzy_threshold
                && matched_chars >= self.config.min_match_char_length as f64
            {
                matched = true;
                total *= score.max(PERFECT_SCORE_FLOOR).powf(weight);
            }
        }

        matched.then_some(total)
    }

    /// Ascending fuzzy score; scores within the tie tolerance order by price
    /// descending instead.
    ///
    /// The tolerance makes the comparison non-transitive, which the standard
    /// library sorts may reject with a panic, so this uses a stable insertion
    /// sort that only ever swaps strictly out-of-order neighbours.
    pub fn sort_by_relevance(&self, mut scored: Vec<ScoredCard>) -> Vec<ScoredCard> {
        for i in 1..scored.len() {
            let mut j = i;
            while j > 0 && self.compare_relevance(&scored[j - 1], &scored[j]) == Ordering::Greater {
                scored.swap(j - 1, j);
                j -= 1;
            }
        }
        scored
    }

    fn compare_relevance(&self, a: &ScoredCard, b: &ScoredCard) -> Ordering {
        if (a.score - b.score).abs() <= self.config.tie_tolerance {
            b.price.total_cmp(&a.price)
        } else {
            a.score.total_cmp(&b.score)
        }
    }

    /// Substring score: name hit, else combined-text hit, plus a bonus for
    /// every query word found in the combined text
    pub fn fallback_score(&self, card: &Card, query: &str) -> u32 {
        let name = card.name.to_lowercase();
        let combined = Self::searchable_text(card);

        let mut score = if name.contains(query) {
            self.config.name_substring_score
        } else if combined.contains(query) {
            self.config.combined_substring_score
        } else {
            0
        };

        let word_hits = query
            .split_whitespace()
            .filter(|word| combined.contains(word))
            .count() as u32;
        score += word_hits * self.config.word_score;

        score
    }

    fn fallback_rank(&self, cards: Vec<Card>, query: &str) -> Vec<Card> {
        let mut scored: Vec<(u32, f64, Card)> = cards
            .into_iter()
            .filter_map(|card| {
                let score = self.fallback_score(&card, query);
                (score > 0).then(|| (score, price_score(&card), card))
            })
            .collect();

        scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| b.1.total_cmp(&a.1)));
        scored.into_iter().map(|(_, _, card)| card).collect()
    }

    /// Popularity ordering: price descending, stable for equal prices
    fn by_price(cards: Vec<Card>) -> Vec<Card> {
        let mut priced: Vec<(f64, Card)> = cards
            .into_iter()
            .map(|card| (price_score(&card), card))
            .collect();
        priced.sort_by(|a, b| b.0.total_cmp(&a.0));
        priced.into_iter().map(|(_, card)| card).collect()
    }
}

impl Default for RankingEngine {
    fn default() -> Self {
        Self::new(RankingConfig::default())
    }
}
