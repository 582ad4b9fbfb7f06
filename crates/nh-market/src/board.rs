//! Shared listing board
//!
//! A single lock over the listing set; market traffic is low relative to
//! spins, so per-listing locking is not worth the bookkeeping.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use uuid::Uuid;

use nh_core::{Expires, GameError, GameResult, PlayerId};

use crate::listing::MarketListing;

#[derive(Default)]
pub struct MarketBoard {
    listings: RwLock<Vec<MarketListing>>,
}

impl MarketBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, listing: MarketListing) {
        self.listings.write().push(listing);
    }

    pub fn get(&self, id: Uuid) -> GameResult<MarketListing> {
        self.listings
            .read()
            .iter()
            .find(|l| l.id == id)
            .cloned()
            .ok_or_else(|| GameError::NotFound(format!("listing {id}")))
    }

    /// Remove and return a listing, failing if it is already gone (sold or
    /// swept concurrently).
    pub fn take(&self, id: Uuid) -> GameResult<MarketListing> {
        let mut listings = self.listings.write();
        match listings.iter().position(|l| l.id == id) {
            Some(idx) => Ok(listings.remove(idx)),
            None => Err(GameError::NotFound(format!("listing {id}"))),
        }
    }

    /// Newest first.
    pub fn all(&self) -> Vec<MarketListing> {
        let mut listings = self.listings.read().clone();
        listings.sort_by(|a, b| b.listed_at.cmp(&a.listed_at));
        listings
    }

    pub fn active_count_for(&self, seller: PlayerId) -> usize {
        self.listings
            .read()
            .iter()
            .filter(|l| l.seller == seller)
            .count()
    }

    /// Remove and return every listing past its TTL.
    pub fn take_expired(&self, now: DateTime<Utc>) -> Vec<MarketListing> {
        let mut listings = self.listings.write();
        let mut expired = Vec::new();
        listings.retain(|l| {
            if l.is_active(now) {
                true
            } else {
                expired.push(l.clone());
                false
            }
        });
        expired
    }

    pub fn len(&self) -> usize {
        self.listings.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use nh_core::{Item, ItemKind, Rarity};

    fn listing(now: DateTime<Utc>, seller: PlayerId) -> MarketListing {
        let item = Item::new(
            "rusty_ram",
            "Rusty RAM",
            Rarity::Common,
            ItemKind::Ram {
                hack_speed: 5,
                stealth_penalty: -2,
            },
            now,
        );
        MarketListing::new(seller, "neo", false, item, 6_000, now)
    }

    #[test]
    fn test_take_removes_once() {
        let board = MarketBoard::new();
        let now = Utc::now();
        let l = listing(now, PlayerId::new_v4());
        let id = l.id;
        board.insert(l);

        assert!(board.take(id).is_ok());
        assert!(board.take(id).is_err());
        assert!(board.is_empty());
    }

    #[test]
    fn test_take_expired_partitions_by_age() {
        let board = MarketBoard::new();
        let now = Utc::now();
        let seller = PlayerId::new_v4();
        board.insert(listing(now - Duration::minutes(31), seller));
        board.insert(listing(now - Duration::minutes(5), seller));

        let expired = board.take_expired(now);
        assert_eq!(expired.len(), 1);
        assert_eq!(board.len(), 1);
        assert_eq!(board.active_count_for(seller), 1);
    }

    #[test]
    fn test_all_sorted_newest_first() {
        let board = MarketBoard::new();
        let now = Utc::now();
        let seller = PlayerId::new_v4();
        board.insert(listing(now - Duration::minutes(10), seller));
        board.insert(listing(now, seller));

        let all = board.all();
        assert_eq!(all.len(), 2);
        assert!(all[0].listed_at > all[1].listed_at);
    }
}
