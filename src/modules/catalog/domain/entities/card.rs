use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// One catalog item as returned by the upstream API.
///
/// Cards are produced only by deserializing upstream responses and are never
/// mutated afterwards; the search pipeline only reorders and filters them.
/// `id` is the identity used for de-duplication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: CardImages,
    #[serde(default, deserialize_with = "null_as_default")]
    pub set: CardSet,
    #[serde(default)]
    pub rarity: Option<String>,
    #[serde(default)]
    pub subtypes: Option<Vec<String>>,
    #[serde(default)]
    pub supertype: Option<String>,
    #[serde(default)]
    pub tcgplayer: Option<TcgPlayer>,
}

/// Upstream sends `null` for some blocks it normally fills; treat it as absent
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardImages {
    #[serde(default)]
    pub small: Option<String>,
    #[serde(default)]
    pub large: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardSet {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub release_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TcgPlayer {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    /// Price tiers keyed by upstream name (`holofoil`, `normal`, ...)
    #[serde(default)]
    pub prices: Option<BTreeMap<String, PriceTier>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceTier {
    #[serde(default)]
    pub low: Option<f64>,
    #[serde(default)]
    pub mid: Option<f64>,
    #[serde(default)]
    pub high: Option<f64>,
    #[serde(default)]
    pub market: Option<f64>,
    #[serde(default)]
    pub direct_low: Option<f64>,
}

impl Card {
    /// Minimal card, mostly useful for fixtures
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            images: CardImages::default(),
            set: CardSet::default(),
            rarity: None,
            subtypes: None,
            supertype: None,
            tcgplayer: None,
        }
    }

    pub fn with_set(mut self, set_name: impl Into<String>) -> Self {
        self.set.name = set_name.into();
        self
    }

    pub fn with_subtypes(mut self, subtypes: &[&str]) -> Self {
        self.subtypes = Some(subtypes.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn with_supertype(mut self, supertype: impl Into<String>) -> Self {
        self.supertype = Some(supertype.into());
        self
    }

    /// Attach a price tier, creating the tcgplayer block if needed
    pub fn with_price_tier(mut self, tier: impl Into<String>, price: PriceTier) -> Self {
        self.tcgplayer
            .get_or_insert_with(TcgPlayer::default)
            .prices
            .get_or_insert_with(BTreeMap::new)
            .insert(tier.into(), price);
        self
    }

    /// Shorthand for a tier carrying only a market price
    pub fn with_market_price(self, tier: impl Into<String>, market: f64) -> Self {
        self.with_price_tier(
            tier,
            PriceTier {
                market: Some(market),
                ..PriceTier::default()
            },
        )
    }

    /// Price tier by upstream name, if the card carries one
    pub fn price_tier(&self, tier: &str) -> Option<&PriceTier> {
        self.tcgplayer.as_ref()?.prices.as_ref()?.get(tier)
    }
}
