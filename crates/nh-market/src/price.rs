//! Per-rarity price caps
//!
//! Floors are deliberately high relative to spin costs so the market never
//! undercuts the slot machine as a credit source.

use nh_core::{GameError, GameResult, Rarity};

/// Allowed listing price range for a rarity tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceCaps {
    pub min: u64,
    pub max: u64,
}

pub fn price_caps(rarity: Rarity) -> PriceCaps {
    match rarity {
        Rarity::Common => PriceCaps {
            min: 5_000,
            max: 15_000,
        },
        Rarity::Uncommon => PriceCaps {
            min: 15_000,
            max: 35_000,
        },
        Rarity::Rare => PriceCaps {
            min: 60_000,
            max: 120_000,
        },
        Rarity::Epic => PriceCaps {
            min: 200_000,
            max: 500_000,
        },
        Rarity::Legendary => PriceCaps {
            min: 1_200_000,
            max: 3_000_000,
        },
    }
}

/// Reject prices outside the rarity's cap range.
pub fn validate_price(rarity: Rarity, price: u64) -> GameResult<()> {
    let caps = price_caps(rarity);
    if price < caps.min {
        return Err(GameError::InvalidState(format!(
            "price {price} below minimum {} for {rarity:?} items",
            caps.min
        )));
    }
    if price > caps.max {
        return Err(GameError::InvalidState(format!(
            "price {price} above maximum {} for {rarity:?} items",
            caps.max
        )));
    }
    Ok(())
}
