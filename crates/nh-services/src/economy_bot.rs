//! Economy bot
//!
//! Drips one bot listing onto the market every 30 minutes. The rarity roll
//! is heavily bottom-weighted; legendaries appear at market-cap prices so
//! they act as long-term credit sinks.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{info, warn};
use rand::Rng;
use rand::rngs::StdRng;
use rand::SeedableRng;

use nh_core::{GameError, GameResult, PlayerId, Rarity};
use nh_market::{MarketBoard, MarketListing};
use nh_slots::reward_pool;

pub const LISTING_INTERVAL_MINUTES: u64 = 30;

const BOT_NAMES: [&str; 5] = [
    "Trader_X",
    "Ghost_Seller",
    "Dark_Trader",
    "Cipher_Merchant",
    "ByteBroker",
];

/// Roll a bot listing: item template code, rarity, and price range.
fn roll_template<R: Rng>(rng: &mut R) -> (&'static str, Rarity, (u64, u64)) {
    let roll = rng.random::<f64>() * 100.0;
    if roll < 40.0 {
        ("rusty_ram", Rarity::Common, (6_000, 12_000))
    } else if roll < 60.0 {
        ("rusty_cooling", Rarity::Common, (5_000, 10_000))
    } else if roll < 75.0 {
        ("rusty_cpu", Rarity::Common, (8_000, 15_000))
    } else if roll < 90.0 {
        ("vpn_active", Rarity::Rare, (60_000, 120_000))
    } else if roll < 97.0 {
        ("rtx_4090_mining", Rarity::Epic, (200_000, 500_000))
    } else if roll < 99.0 {
        ("quantum_cpu", Rarity::Legendary, (1_200_000, 3_000_000))
    } else {
        ("zero_day", Rarity::Legendary, (1_200_000, 3_000_000))
    }
}

/// Build one bot listing from the shared reward templates.
pub fn generate_bot_listing<R: Rng>(
    rng: &mut R,
    now: DateTime<Utc>,
) -> GameResult<MarketListing> {
    let (code, rarity, (min, max)) = roll_template(rng);
    let item = reward_pool(rarity, now)
        .into_iter()
        .find(|i| i.code == code)
        .ok_or_else(|| GameError::System(format!("no reward template for {code}")))?;
    let seller_name = BOT_NAMES[rng.random_range(0..BOT_NAMES.len())];
    let price = rng.random_range(min..=max);
    // Bot sellers have no backing player record
    Ok(MarketListing::new(
        PlayerId::new_v4(),
        seller_name,
        true,
        item,
        price,
        now,
    ))
}

/// Generate and post one bot listing.
pub fn inject_bot_listing<R: Rng>(
    board: &MarketBoard,
    rng: &mut R,
    now: DateTime<Utc>,
) -> GameResult<MarketListing> {
    let listing = generate_bot_listing(rng, now)?;
    info!(
        "economy bot: {} lists {} for {}",
        listing.seller_name, listing.item.name, listing.price
    );
    board.insert(listing.clone());
    Ok(listing)
}

/// The 30-minute drip driver. Posts once immediately on startup.
pub struct EconomyBot {
    board: Arc<MarketBoard>,
}

impl EconomyBot {
    pub fn new(board: Arc<MarketBoard>) -> Self {
        Self { board }
    }

    pub async fn run(self) {
        let mut rng = StdRng::from_os_rng();
        let interval = std::time::Duration::from_secs(LISTING_INTERVAL_MINUTES * 60);
        info!("economy bot started ({LISTING_INTERVAL_MINUTES}m interval)");
        loop {
            if let Err(e) = inject_bot_listing(&self.board, &mut rng, Utc::now()) {
                warn!("economy bot listing failed: {e}");
            }
            tokio::time::sleep(interval).await;
        }
    }
}
