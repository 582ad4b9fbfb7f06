//! Bot buyer
//!
//! The demand side of the simulated economy: every 20 minutes bots scan the
//! board and buy a few genuinely underpriced listings, so player listings
//! can actually sell instead of only expiring. A deal is a listing priced
//! 10–20% below the average for its item type; when no type has enough
//! price history, anything at or below the rarity floor counts. Listings
//! near the rarity ceiling are never touched, so bots cannot be used to
//! launder cap-priced items. The purchased item is discarded; the seller is
//! paid the price net of the normal sales tax.

use std::collections::HashMap;
use std::sync::Arc;

use log::{info, warn};
use uuid::Uuid;

use nh_events::{EventBus, GameEvent};
use nh_market::{MarketBoard, MarketListing, price_caps, sale_payout};
use nh_store::PlayerStore;

pub const BUY_INTERVAL_MINUTES: u64 = 20;

/// At most this many purchases per tick.
pub const MAX_DEALS_PER_TICK: usize = 3;

/// Accepted deal band relative to the per-type average price.
const DEAL_BAND: (f64, f64) = (0.8, 0.9);

/// Listings at or above this share of the rarity's max cap are never bought.
const NEAR_CAP_RATIO: f64 = 0.85;

fn near_max_cap(listing: &MarketListing) -> bool {
    let cap = price_caps(listing.item.rarity).max;
    listing.price >= (cap as f64 * NEAR_CAP_RATIO).floor() as u64
}

/// Listings priced 10–20% below their item type's average, cheapest first.
fn pick_deals(listings: &[MarketListing]) -> Vec<Uuid> {
    let mut groups: HashMap<&str, Vec<&MarketListing>> = HashMap::new();
    for l in listings {
        groups.entry(l.item.code.as_str()).or_default().push(l);
    }

    let mut deals: Vec<&MarketListing> = Vec::new();
    for group in groups.values() {
        let avg = group.iter().map(|l| l.price).sum::<u64>() / group.len() as u64;
        if avg == 0 {
            continue;
        }
        let min_accept = (avg as f64 * DEAL_BAND.0).floor() as u64;
        let max_accept = (avg as f64 * DEAL_BAND.1).floor() as u64;
        for l in group {
            if !near_max_cap(l) && l.price >= min_accept && l.price <= max_accept {
                deals.push(l);
            }
        }
    }
    deals.sort_by_key(|l| l.price);
    deals.iter().take(MAX_DEALS_PER_TICK).map(|l| l.id).collect()
}

/// Without usable price history, anything at or below the rarity floor is a
/// deal.
fn pick_fallback_deals(listings: &[MarketListing]) -> Vec<Uuid> {
    let mut deals: Vec<&MarketListing> = listings
        .iter()
        .filter(|l| !near_max_cap(l) && l.price <= price_caps(l.item.rarity).min)
        .collect();
    deals.sort_by_key(|l| l.price);
    deals.iter().take(MAX_DEALS_PER_TICK).map(|l| l.id).collect()
}

/// One buying pass. Returns the number of listings purchased.
pub fn bot_buy_tick<S: PlayerStore>(board: &MarketBoard, store: &S, bus: &EventBus) -> usize {
    let listings = board.all();
    let mut deals = pick_deals(&listings);
    if deals.is_empty() {
        deals = pick_fallback_deals(&listings);
    }

    let mut bought = 0;
    for id in deals {
        // A player may have beaten the bot to it
        let Ok(listing) = board.take(id) else {
            continue;
        };
        let payout = sale_payout(listing.price);
        if !listing.is_bot {
            let result = store.update(listing.seller, |seller| {
                seller.credits = seller.credits.saturating_add(payout);
            });
            if let Err(e) = result {
                warn!(
                    "bot buyer: seller {} unreachable, payout dropped: {e}",
                    listing.seller_name
                );
            }
        }
        info!(
            "bot buyer: bought {} for {} (payout {payout} to {})",
            listing.item.name, listing.price, listing.seller_name
        );
        bus.emit(GameEvent::MarketListingRemoved {
            listing_id: listing.id,
            expired: false,
        });
        bought += 1;
    }
    bought
}

/// The 20-minute buying driver.
pub struct BotBuyer<S> {
    board: Arc<MarketBoard>,
    store: Arc<S>,
    bus: EventBus,
}

impl<S: PlayerStore + 'static> BotBuyer<S> {
    pub fn new(board: Arc<MarketBoard>, store: Arc<S>, bus: EventBus) -> Self {
        Self { board, store, bus }
    }

    pub async fn run(self) {
        let interval = std::time::Duration::from_secs(BUY_INTERVAL_MINUTES * 60);
        info!("bot buyer started ({BUY_INTERVAL_MINUTES}m interval)");
        loop {
            bot_buy_tick(&*self.board, &*self.store, &self.bus);
            tokio::time::sleep(interval).await;
        }
    }
}
