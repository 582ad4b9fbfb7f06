//! Listing records

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use nh_core::{Expires, Item, PlayerId};

/// Unsold listings expire after this many minutes.
pub const LISTING_TTL_MINUTES: i64 = 30;

/// One item up for sale. The item lives inside the listing while it is
/// active; neither seller nor buyer holds it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketListing {
    pub id: Uuid,
    pub seller: PlayerId,
    pub seller_name: String,
    /// Bot listings are money sinks: no payout, no refund.
    pub is_bot: bool,
    pub item: Item,
    pub price: u64,
    pub listed_at: DateTime<Utc>,
}

impl MarketListing {
    pub fn new(
        seller: PlayerId,
        seller_name: impl Into<String>,
        is_bot: bool,
        item: Item,
        price: u64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            seller,
            seller_name: seller_name.into(),
            is_bot,
            item,
            price,
            listed_at: now,
        }
    }
}

impl Expires for MarketListing {
    fn expires_at(&self) -> Option<DateTime<Utc>> {
        Some(self.listed_at + Duration::minutes(LISTING_TTL_MINUTES))
    }
}
