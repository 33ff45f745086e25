pub mod card;
pub mod catalog_config;

pub use card::{Card, CardImages, CardSet, PriceTier, TcgPlayer};
pub use catalog_config::CatalogConfig;
