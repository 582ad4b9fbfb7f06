//! Expired-listing sweep
//!
//! Runs every minute. Listings past their 30-minute TTL are removed; a
//! real seller gets the listing fee back and the item returned to their
//! inventory, a bot listing just disappears. A vanished seller account
//! turns the refund into a money sink rather than failing the sweep.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{info, warn};

use nh_events::{EventBus, GameEvent};
use nh_market::{MarketBoard, listing_fee};
use nh_store::PlayerStore;

pub const SWEEP_INTERVAL_SECS: u64 = 60;

/// One sweep pass. Returns the number of listings removed.
pub fn sweep<S: PlayerStore>(
    board: &MarketBoard,
    store: &S,
    bus: &EventBus,
    now: DateTime<Utc>,
) -> usize {
    let expired = board.take_expired(now);
    let removed = expired.len();
    for listing in expired {
        if !listing.is_bot {
            let refund = listing_fee(listing.price);
            let mut item = listing.item.clone();
            item.acquired_at = now;
            let result = store.update(listing.seller, move |seller| {
                seller.credits = seller.credits.saturating_add(refund);
                seller.inventory.push(item);
            });
            match result {
                Ok(()) => bus.emit(GameEvent::MarketListingRefunded {
                    listing_id: listing.id,
                    seller: listing.seller,
                    seller_name: listing.seller_name.clone(),
                    refund,
                }),
                Err(e) => warn!(
                    "expired listing {}: seller {} unreachable, refund dropped: {e}",
                    listing.id, listing.seller_name
                ),
            }
        }
        bus.emit(GameEvent::MarketListingRemoved {
            listing_id: listing.id,
            expired: true,
        });
    }
    if removed > 0 {
        info!("market cleaner: removed {removed} expired listings");
    }
    removed
}

/// The minutely sweep driver.
pub struct MarketCleaner<S> {
    board: Arc<MarketBoard>,
    store: Arc<S>,
    bus: EventBus,
}

impl<S: PlayerStore + 'static> MarketCleaner<S> {
    pub fn new(board: Arc<MarketBoard>, store: Arc<S>, bus: EventBus) -> Self {
        Self { board, store, bus }
    }

    pub async fn run(self) {
        let interval = std::time::Duration::from_secs(SWEEP_INTERVAL_SECS);
        info!("market cleaner started ({SWEEP_INTERVAL_SECS}s interval)");
        loop {
            sweep(&*self.board, &*self.store, &self.bus, Utc::now());
            tokio::time::sleep(interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use nh_core::Player;
    use nh_market::sell;
    use nh_store::MemoryStore;
    use nh_slots::reward_pool;

    fn seller_with_listing(
        store: &MemoryStore,
        board: &MarketBoard,
        listed_at: DateTime<Utc>,
    ) -> nh_core::PlayerId {
        let mut p = Player::new("neo", listed_at);
        p.credits = 10_000;
        p.inventory
            .push(reward_pool(nh_core::Rarity::Common, listed_at).remove(0));
        let id = p.id;
        let listing = sell(&mut p, board, 0, 10_000, listed_at).unwrap();
        assert_eq!(listing.price, 10_000);
        store.insert(p).unwrap();
        id
    }

    #[test]
    fn test_sweep_refunds_fee_and_returns_item() {
        let store = MemoryStore::new();
        let board = MarketBoard::new();
        let bus = EventBus::new();
        let listed_at = Utc::now() - Duration::minutes(31);
        let seller = seller_with_listing(&store, &board, listed_at);

        let now = Utc::now();
        assert_eq!(sweep(&board, &store, &bus, now), 1);
        assert!(board.is_empty());

        let p = store.get(seller).unwrap();
        // 10_000 - 500 fee at listing time, +500 refund on expiry
        assert_eq!(p.credits, 10_000);
        assert_eq!(p.inventory.len(), 1);
        assert_eq!(p.inventory[0].acquired_at, now);
    }

    #[test]
    fn test_sweep_leaves_fresh_listings() {
        let store = MemoryStore::new();
        let board = MarketBoard::new();
        let bus = EventBus::new();
        let seller = seller_with_listing(&store, &board, Utc::now());

        assert_eq!(sweep(&board, &store, &bus, Utc::now()), 0);
        assert_eq!(board.len(), 1);
        assert_eq!(store.get(seller).unwrap().credits, 9_500);
    }

    #[test]
    fn test_sweep_drops_bot_listings_without_refund() {
        let store = MemoryStore::new();
        let board = MarketBoard::new();
        let bus = EventBus::new();
        use rand::SeedableRng;
        let mut rng = rand::rngs::StdRng::seed_from_u64(2);
        let listing =
            crate::economy_bot::generate_bot_listing(&mut rng, Utc::now() - Duration::minutes(40))
                .unwrap();
        board.insert(listing);

        // Bot seller has no store record; sweep must not error
        assert_eq!(sweep(&board, &store, &bus, Utc::now()), 1);
        assert!(board.is_empty());
    }

    #[tokio::test]
    async fn test_sweep_emits_removed_event() {
        let store = MemoryStore::new();
        let board = MarketBoard::new();
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        let listed_at = Utc::now() - Duration::minutes(31);
        seller_with_listing(&store, &board, listed_at);

        sweep(&board, &store, &bus, Utc::now());
        match rx.recv().await.unwrap() {
            GameEvent::MarketListingRefunded { refund, .. } => assert_eq!(refund, 500),
            other => panic!("unexpected event: {other:?}"),
        }
        match rx.recv().await.unwrap() {
            GameEvent::MarketListingRemoved { expired, .. } => assert!(expired),
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
