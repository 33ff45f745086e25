pub mod result_cache;

pub use result_cache::{CacheEntry, CacheKey, CacheStats, ResultCache, POPULAR_KEY};
