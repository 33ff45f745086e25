//! Price scoring used for tie-breaks and for the popularity ordering

use crate::modules::catalog::{Card, PriceTier};

/// Tier precedence, most representative printing first
pub const PRICE_TIER_PRECEDENCE: [&str; 5] = [
    "holofoil",
    "reverseHolofoil",
    "unlimitedHolofoil",
    "1stEditionHolofoil",
    "normal",
];

/// Representative price of a card, 0.0 when none is known.
///
/// Only the first tier present (in precedence order) is consulted; within it
/// `market` wins over `mid`, which wins over `high`. Zero, negative and
/// non-finite values count as missing.
pub fn price_score(card: &Card) -> f64 {
    PRICE_TIER_PRECEDENCE
        .iter()
        .find_map(|tier| card.price_tier(tier))
        .and_then(tier_value)
        .unwrap_or(0.0)
}

/// Whether the card carries a price the popularity path can rank by
pub fn has_usable_price(card: &Card) -> bool {
    price_score(card) > 0.0
}

fn tier_value(tier: &PriceTier) -> Option<f64> {
    [tier.market, tier.mid, tier.high]
        .into_iter()
        .flatten()
        .find(|v| v.is_finite() && *v > 0.0)
}
