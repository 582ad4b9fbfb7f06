//! Sell and buy operations
//!
//! `sell` mutates the seller under their own lock and posts the listing.
//! `buy` mutates the buyer and returns a [`BuySettlement`] carrying the
//! seller's payout for the caller to apply under the seller's lock; a
//! missing or bot seller turns the payout into a money sink.

use chrono::{DateTime, Utc};
use log::debug;
use serde::Serialize;
use uuid::Uuid;

use nh_core::{GameError, GameResult, Player};

use crate::board::MarketBoard;
use crate::listing::MarketListing;
use crate::price::validate_price;

/// Non-refundable-on-sale deposit charged when listing.
pub const LISTING_FEE_RATE: f64 = 0.05;

/// Seller payout tax on a completed sale.
pub const SALES_TAX_RATE: f64 = 0.10;

/// Active-listing cap per seller.
pub const MAX_ACTIVE_LISTINGS: usize = 5;

/// Listing fee for a given price.
pub fn listing_fee(price: u64) -> u64 {
    (price as f64 * LISTING_FEE_RATE).floor() as u64
}

/// Seller payout after tax.
pub fn sale_payout(price: u64) -> u64 {
    (price as f64 * (1.0 - SALES_TAX_RATE)).floor() as u64
}

/// List an inventory item for sale. The item moves into the listing; the
/// fee is charged immediately and only refunded if the listing expires.
pub fn sell(
    seller: &mut Player,
    board: &MarketBoard,
    item_index: usize,
    price: u64,
    now: DateTime<Utc>,
) -> GameResult<MarketListing> {
    let item = seller
        .inventory
        .get(item_index)
        .ok_or_else(|| GameError::NotFound(format!("item index {item_index}")))?;
    validate_price(item.rarity, price)?;

    if board.active_count_for(seller.id) >= MAX_ACTIVE_LISTINGS {
        return Err(GameError::InvalidState(format!(
            "listing limit reached (max {MAX_ACTIVE_LISTINGS} active)"
        )));
    }

    let fee = listing_fee(price);
    if seller.credits < fee {
        return Err(GameError::InsufficientFunds {
            needed: fee,
            available: seller.credits,
        });
    }

    seller.credits -= fee;
    let item = seller.inventory.remove(item_index);
    let listing = MarketListing::new(
        seller.id,
        seller.username.clone(),
        seller.is_bot,
        item,
        price,
        now,
    );
    debug!(
        "listing posted: {} sells {} for {price} (fee {fee})",
        seller.username, listing.item.name
    );
    board.insert(listing.clone());
    Ok(listing)
}

/// The seller-side half of a completed purchase.
#[derive(Debug, Clone, Serialize)]
pub struct BuySettlement {
    pub listing: MarketListing,
    pub price: u64,
    /// Post-tax payout; zero for bot listings.
    pub seller_payout: u64,
}

/// Purchase a listing. The buyer pays and receives the item immediately;
/// the returned settlement carries the seller's payout.
pub fn buy(
    buyer: &mut Player,
    board: &MarketBoard,
    listing_id: Uuid,
    now: DateTime<Utc>,
) -> GameResult<BuySettlement> {
    let price = board.get(listing_id)?.price;
    if buyer.credits < price {
        return Err(GameError::InsufficientFunds {
            needed: price,
            available: buyer.credits,
        });
    }

    // Claim the listing only after the funds check; `take` fails cleanly if
    // another buyer won the race.
    let listing = board.take(listing_id)?;
    buyer.credits -= price;
    let mut item = listing.item.clone();
    item.acquired_at = now;
    buyer.inventory.push(item);
    buyer.last_active = now;

    let seller_payout = if listing.is_bot { 0 } else { sale_payout(price) };
    debug!(
        "sale complete: {} bought {} for {price} (payout {seller_payout})",
        buyer.username, listing.item.name
    );
    Ok(BuySettlement {
        listing,
        price,
        seller_payout,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nh_core::{Item, ItemKind, Rarity};

    fn cpu(now: DateTime<Utc>) -> Item {
        Item::new(
            "rusty_cpu",
            "Rusty CPU",
            Rarity::Common,
            ItemKind::Cpu {
                hack_speed: 8,
                overheat_risk_percent: 10,
            },
            now,
        )
    }

    fn seller_with_item(now: DateTime<Utc>) -> Player {
        let mut p = Player::new("neo", now);
        p.inventory.push(cpu(now));
        p
    }

    #[test]
    fn test_sell_charges_fee_and_moves_item() {
        let board = MarketBoard::new();
        let now = Utc::now();
        let mut seller = seller_with_item(now);

        let listing = sell(&mut seller, &board, 0, 10_000, now).unwrap();
        assert_eq!(listing.price, 10_000);
        assert_eq!(seller.credits, 1000 - 500);
        assert!(seller.inventory.is_empty());
        assert_eq!(board.len(), 1);
    }

    #[test]
    fn test_sell_rejects_bad_price_without_side_effects() {
        let board = MarketBoard::new();
        let now = Utc::now();
        let mut seller = seller_with_item(now);

        assert!(sell(&mut seller, &board, 0, 100, now).is_err());
        assert_eq!(seller.credits, 1000);
        assert_eq!(seller.inventory.len(), 1);
        assert!(board.is_empty());
    }

    #[test]
    fn test_sell_requires_fee_funds() {
        let board = MarketBoard::new();
        let now = Utc::now();
        let mut seller = seller_with_item(now);
        seller.credits = 100;

        let err = sell(&mut seller, &board, 0, 10_000, now).unwrap_err();
        assert!(matches!(err, GameError::InsufficientFunds { needed: 500, .. }));
        assert_eq!(seller.inventory.len(), 1);
    }

    #[test]
    fn test_listing_limit_enforced() {
        let board = MarketBoard::new();
        let now = Utc::now();
        let mut seller = Player::new("neo", now);
        seller.credits = 1_000_000;
        for _ in 0..=MAX_ACTIVE_LISTINGS {
            seller.inventory.push(cpu(now));
        }

        for _ in 0..MAX_ACTIVE_LISTINGS {
            sell(&mut seller, &board, 0, 10_000, now).unwrap();
        }
        let err = sell(&mut seller, &board, 0, 10_000, now).unwrap_err();
        assert!(matches!(err, GameError::InvalidState(_)));
    }

    #[test]
    fn test_buy_transfers_item_and_computes_payout() {
        let board = MarketBoard::new();
        let now = Utc::now();
        let mut seller = seller_with_item(now);
        let listing = sell(&mut seller, &board, 0, 10_000, now).unwrap();

        let mut buyer = Player::new("smith", now);
        buyer.credits = 20_000;
        let settlement = buy(&mut buyer, &board, listing.id, now).unwrap();
        assert_eq!(settlement.seller_payout, 9_000);
        assert_eq!(buyer.credits, 10_000);
        assert_eq!(buyer.inventory.len(), 1);
        assert_eq!(buyer.inventory[0].code, "rusty_cpu");
        assert!(board.is_empty());
    }

    #[test]
    fn test_buy_bot_listing_is_money_sink() {
        let board = MarketBoard::new();
        let now = Utc::now();
        let mut bot = Player::bot("vendor", now);
        bot.credits = 10_000;
        bot.inventory.push(cpu(now));
        let listing = sell(&mut bot, &board, 0, 8_000, now).unwrap();
        assert!(listing.is_bot);

        let mut buyer = Player::new("smith", now);
        buyer.credits = 8_000;
        let settlement = buy(&mut buyer, &board, listing.id, now).unwrap();
        assert_eq!(settlement.seller_payout, 0);
    }

    #[test]
    fn test_buy_insufficient_funds() {
        let board = MarketBoard::new();
        let now = Utc::now();
        let mut seller = seller_with_item(now);
        let listing = sell(&mut seller, &board, 0, 10_000, now).unwrap();

        let mut buyer = Player::new("smith", now);
        let err = buy(&mut buyer, &board, listing.id, now).unwrap_err();
        assert!(matches!(err, GameError::InsufficientFunds { .. }));
        // Listing stays on the board
        assert_eq!(board.len(), 1);
    }

    #[test]
    fn test_buy_missing_listing() {
        let board = MarketBoard::new();
        let now = Utc::now();
        let mut buyer = Player::new("smith", now);
        assert!(matches!(
            buy(&mut buyer, &board, Uuid::new_v4(), now).unwrap_err(),
            GameError::NotFound(_)
        ));
    }
}
