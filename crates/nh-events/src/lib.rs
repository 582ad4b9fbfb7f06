//! # nh-events — Outbound real-time game events
//!
//! Informational broadcasts for UI display: ghost activity, leaderboard
//! payouts, market lifecycle. Fire-and-forget with no delivery guarantee;
//! nothing in the engine's correctness depends on a subscriber existing.

use nh_core::PlayerId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Outbound event payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    GhostLevelUp {
        username: String,
        level: u32,
        message: String,
    },
    GhostBigWin {
        username: String,
        item: String,
        credits: u64,
        message: String,
    },
    LeaderboardWinner {
        username: String,
        rank: u32,
        earnings: u64,
        prize: u64,
        message: String,
    },
    MarketListingRemoved {
        listing_id: uuid::Uuid,
        expired: bool,
    },
    MarketListingRefunded {
        listing_id: uuid::Uuid,
        seller: PlayerId,
        seller_name: String,
        refund: u64,
    },
}

const BUS_CAPACITY: usize = 256;

/// Broadcast bus for game events.
///
/// Cloning shares the underlying channel. `emit` never blocks and ignores
/// the no-subscriber case.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<GameEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BUS_CAPACITY);
        Self { tx }
    }

    /// Broadcast an event. No delivery guarantee.
    pub fn emit(&self, event: GameEvent) {
        let _ = self.tx.send(event);
    }

    /// Subscribe for UI plumbing (sockets, logs, tests).
    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
