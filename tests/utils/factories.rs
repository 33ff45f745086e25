/// Test data factories using builder pattern
///
/// Provides convenient methods to create cards with sensible defaults
use cardsearch_lib::modules::catalog::{Card, PriceTier};

pub struct CardFactory {
    id: String,
    name: String,
    set_name: String,
    subtypes: Vec<String>,
    supertype: Option<String>,
    prices: Vec<(String, PriceTier)>,
}

impl Default for CardFactory {
    fn default() -> Self {
        Self {
            id: format!("test-{}", rand::random::<u32>() % 1_000_000),
            name: "Test Card".to_string(),
            set_name: "Test Set".to_string(),
            subtypes: Vec::new(),
            supertype: Some("Pokémon".to_string()),
            prices: Vec::new(),
        }
    }
}

impl CardFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn set_name(mut self, set_name: impl Into<String>) -> Self {
        self.set_name = set_name.into();
        self
    }

    pub fn subtypes(mut self, subtypes: &[&str]) -> Self {
        self.subtypes = subtypes.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn trainer(mut self) -> Self {
        self.supertype = Some("Trainer".to_string());
        self
    }

    pub fn holofoil(mut self, market: f64) -> Self {
        self.prices.push((
            "holofoil".to_string(),
            PriceTier {
                market: Some(market),
                ..PriceTier::default()
            },
        ));
        self
    }

    pub fn normal(mut self, market: f64) -> Self {
        self.prices.push((
            "normal".to_string(),
            PriceTier {
                market: Some(market),
                ..PriceTier::default()
            },
        ));
        self
    }

    pub fn build(self) -> Card {
        let subtypes: Vec<&str> = self.subtypes.iter().map(String::as_str).collect();
        let mut card = Card::new(self.id, self.name).with_set(self.set_name);
        if !subtypes.is_empty() {
            card = card.with_subtypes(&subtypes);
        }
        if let Some(supertype) = self.supertype {
            card = card.with_supertype(supertype);
        }
        for (tier, price) in self.prices {
            card = card.with_price_tier(tier, price);
        }
        card
    }
}

/// Shorthand for a priced card
pub fn priced(id: &str, name: &str, market: f64) -> Card {
    CardFactory::new().id(id).name(name).holofoil(market).build()
}
