pub mod client;
pub mod dto;

pub use client::PokemonTcgClient;
pub use dto::CardListResponse;
