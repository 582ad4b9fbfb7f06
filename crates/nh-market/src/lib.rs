//! # nh-market — Player marketplace
//!
//! Listings are item snapshots: selling moves the item out of the seller's
//! inventory into the listing, buying moves it into the buyer's. A 5%
//! listing fee is charged up front; a sale pays the seller the price minus
//! a 10% tax; a listing that sits unsold for 30 minutes expires, returning
//! the item and refunding the fee.
//!
//! Trades follow the same two-phase shape as PvP: the initiating player is
//! mutated under their own lock and the counterparty's delta is returned in
//! the settlement for the caller to apply.

pub mod board;
pub mod listing;
pub mod price;
pub mod trade;

pub use board::MarketBoard;
pub use listing::{LISTING_TTL_MINUTES, MarketListing};
pub use price::{PriceCaps, price_caps, validate_price};
pub use trade::{
    BuySettlement, LISTING_FEE_RATE, MAX_ACTIVE_LISTINGS, SALES_TAX_RATE, buy, listing_fee,
    sale_payout, sell,
};
