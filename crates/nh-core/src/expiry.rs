//! Timestamp-gated state
//!
//! Buffs, used consumables, exposure windows, freeze windows and market
//! listings all expire by wall-clock comparison at read time (lazy expiry,
//! no active cancellation). Every call site goes through this module instead
//! of re-implementing the comparison.

use chrono::{DateTime, Utc};

/// Anything that stops being effective at a known instant.
pub trait Expires {
    /// The instant this state stops being effective, if bounded.
    fn expires_at(&self) -> Option<DateTime<Utc>>;

    /// Active iff `now` is strictly before the expiry instant.
    fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().map(|t| now < t).unwrap_or(false)
    }
}

/// Predicate for bare `Option<DateTime>` deadline fields (exposure, freeze).
pub fn deadline_active(deadline: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    deadline.map(|t| now < t).unwrap_or(false)
}
