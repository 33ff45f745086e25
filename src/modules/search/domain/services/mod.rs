pub mod query_planner;
pub mod ranking;

pub use query_planner::QueryPlanner;
pub use ranking::{
    has_usable_price, price_score, ApproximateSubstringStrategy, MatchStrategy, RankingEngine,
    ScoredCard,
};
