//! # nh-services — Background drivers
//!
//! Five independent timer loops sharing the player store and market board:
//!
//! - [`leaderboard`]: 2-hour epoch evaluation and prize payout
//! - [`ghost`]: synthetic-account activity to keep the world alive
//! - [`economy_bot`]: periodic bot listings feeding the market
//! - [`bot_buyer`]: bots purchasing underpriced player listings
//! - [`market_cleaner`]: minutely sweep of expired listings
//!
//! Each loop wraps a synchronous tick function that is unit-testable on its
//! own; the async wrappers only add scheduling. Tick errors are logged and
//! swallowed — a background failure never crashes the process.

pub mod bot_buyer;
pub mod economy_bot;
pub mod ghost;
pub mod leaderboard;
pub mod market_cleaner;

pub use bot_buyer::BotBuyer;
pub use economy_bot::EconomyBot;
pub use ghost::GhostEngine;
pub use leaderboard::LeaderboardScheduler;
pub use market_cleaner::MarketCleaner;
