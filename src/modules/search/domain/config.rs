use crate::shared::errors::{AppError, AppResult};
use std::time::Duration;

/// Timing and sizing knobs of the search pipeline
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Quiet period after the last keystroke before a search fires
    pub debounce: Duration,
    /// How long a cached result set counts as fresh
    pub cache_ttl: Duration,
    /// Requested page size per planned query (the client raises it to at least 100)
    pub page_size: u32,
    /// Size of the newest-first page used by the popularity path
    pub popular_page_size: u32,
}

impl SearchConfig {
    pub fn validate(&self) -> AppResult<()> {
        if self.debounce.is_zero() {
            return Err(AppError::ConfigError(
                "Debounce delay must be positive".to_string(),
            ));
        }
        if self.cache_ttl.is_zero() {
            return Err(AppError::ConfigError("Cache TTL must be positive".to_string()));
        }
        if self.page_size == 0 || self.popular_page_size == 0 {
            return Err(AppError::ConfigError(
                "Page sizes must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(150),
            cache_ttl: Duration::from_secs(5 * 60),
            page_size: 20,
            popular_page_size: 250,
        }
    }
}

/// Configuration for the ranking engine
///
/// Externalizes the weights and thresholds so they can be tuned and tested.
#[derive(Debug, Clone)]
pub struct RankingConfig {
    /// Weight of the card name field in the fuzzy pass
    pub name_weight: f64,
    /// Weight of the combined name/subtypes/supertype field
    pub combined_weight: f64,
    /// Largest fuzzy score (0 = perfect) still counted as a match
    pub fuzzy_threshold: f64,
    /// Fuzzy scores closer than this are ordered by price instead
    pub tie_tolerance: f64,
    /// Minimum number of pattern characters that must line up
    pub min_match_char_length: usize,

    // Substring fallback weights
    pub name_substring_score: u32,
    pub combined_substring_score: u32,
    pub word_score: u32,
}

impl RankingConfig {
    pub fn validate(&self) -> AppResult<()> {
        let weight_sum = self.name_weight + self.combined_weight;
        if (weight_sum - 1.0).abs() > 0.01 {
            return Err(AppError::ConfigError(format!(
                "Fuzzy field weights must sum to 1.0, got {}",
                weight_sum
            )));
        }
        if self.name_weight < 0.0 || self.combined_weight < 0.0 {
            return Err(AppError::ConfigError(
                "Fuzzy field weights must be non-negative".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.fuzzy_threshold) {
            return Err(AppError::ConfigError(format!(
                "Fuzzy threshold must be within 0.0..=1.0, got {}",
                self.fuzzy_threshold
            )));
        }
        if self.tie_tolerance < 0.0 {
            return Err(AppError::ConfigError(
                "Tie tolerance cannot be negative".to_string(),
            ));
        }
        if self.min_match_char_length == 0 {
            return Err(AppError::ConfigError(
                "Minimum match length must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            name_weight: 0.7,
            combined_weight: 0.3,
            fuzzy_threshold: 0.55,
            tie_tolerance: 0.05,
            min_match_char_length: 1,
            name_substring_score: 1000,
            combined_substring_score: 800,
            word_score: 100,
        }
    }
}
