use crate::modules::catalog::domain::entities::Card;
use serde::{Deserialize, Serialize};

/// Fields requested from the catalog; everything else is dropped upstream
pub const CARD_FIELDS: &str = "id,name,images,set,rarity,subtypes,supertype,tcgplayer";

/// Envelope of `GET /cards`. A missing `data` array means "no results".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardListResponse {
    #[serde(default)]
    pub data: Option<Vec<Card>>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
    #[serde(default)]
    pub count: Option<u32>,
    #[serde(default)]
    pub total_count: Option<u64>,
}

impl CardListResponse {
    pub fn into_cards(self) -> Vec<Card> {
        self.data.unwrap_or_default()
    }
}
