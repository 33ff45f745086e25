pub mod config;
pub mod services;

pub use config::{RankingConfig, SearchConfig};
pub use services::{QueryPlanner, RankingEngine};
