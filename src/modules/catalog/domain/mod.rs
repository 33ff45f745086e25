pub mod entities;
pub mod repositories;

pub use entities::{CatalogConfig, Card, CardImages, CardSet, PriceTier, TcgPlayer};
pub use repositories::CatalogRepository;
