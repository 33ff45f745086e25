pub mod pokemon_tcg;

pub use pokemon_tcg::PokemonTcgClient;
