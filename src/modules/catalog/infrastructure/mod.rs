pub mod external;
pub mod http_client;

// Re-export commonly used types
pub use external::PokemonTcgClient;
pub use http_client::{RateLimitClient, RetryPolicy};
