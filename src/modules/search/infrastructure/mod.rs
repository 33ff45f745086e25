pub mod cache;

pub use cache::{CacheKey, CacheStats, ResultCache};
