pub mod domain;
pub mod infrastructure;

// Re-exports for easy external access
pub use domain::{CatalogConfig, CatalogRepository, Card, CardImages, CardSet, PriceTier, TcgPlayer};
pub use infrastructure::{PokemonTcgClient, RateLimitClient, RetryPolicy};

#[cfg(test)]
pub use domain::repositories::MockCatalogRepository;
