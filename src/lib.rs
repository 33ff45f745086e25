pub mod modules;
pub mod shared;

pub use modules::catalog::{Card, CatalogRepository, PokemonTcgClient};
pub use modules::search::{
    CacheKey, FetchOrchestrator, QueryPlanner, RankingEngine, ResultCache, SearchController,
    SearchPhase, SearchState,
};
pub use shared::{AppConfig, AppError, AppResult};
