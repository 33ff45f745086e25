pub mod application;
pub mod domain;
pub mod infrastructure;

// Re-exports for easy external access
pub use application::{FetchOrchestrator, SearchController, SearchPhase, SearchState};
pub use domain::services::{price_score, MatchStrategy};
pub use domain::{QueryPlanner, RankingConfig, RankingEngine, SearchConfig};
pub use infrastructure::{CacheKey, CacheStats, ResultCache};
