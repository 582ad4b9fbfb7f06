//! Player record
//!
//! Identity plus mutable economic state. All mutation helpers keep the
//! record's invariants: `level` always derives from `xp`, currencies never
//! underflow, the intrusion log stays bounded, and timed state is purged
//! lazily on access.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::expiry::{Expires, deadline_active};
use crate::item::{Buff, BuffKind, EquipSlot, Item};
use crate::level::level_for_xp;

pub type PlayerId = Uuid;

/// Leaderboard scoring period: 2 hours.
pub fn epoch() -> Duration {
    Duration::hours(2)
}

/// Starting credit balance for a fresh account.
pub const STARTING_CREDITS: u64 = 1000;

/// Earnings accumulated since `period_start`; reset when an epoch closes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodEarnings {
    pub period_start: DateTime<Utc>,
    pub earnings: u64,
}

impl PeriodEarnings {
    pub fn fresh(now: DateTime<Utc>) -> Self {
        Self {
            period_start: now,
            earnings: 0,
        }
    }

    /// Add a positive credit gain, rolling the period forward first if it
    /// went stale (earnings never silently carry across an epoch boundary).
    pub fn accumulate(&mut self, gain: u64, now: DateTime<Utc>) {
        if now - self.period_start >= epoch() {
            self.period_start = now;
            self.earnings = 0;
        }
        self.earnings = self.earnings.saturating_add(gain);
    }

    pub fn reset(&mut self, now: DateTime<Utc>) {
        self.period_start = now;
        self.earnings = 0;
    }
}

/// Attack result recorded in the target's intrusion log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntrusionResult {
    Success,
    Blocked,
}

/// One entry of the bounded (last-10) intrusion log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntrusionEntry {
    pub attacker_name: String,
    pub at: DateTime<Utc>,
    pub result: IntrusionResult,
    pub attack_score: u64,
    pub defense_score: u64,
}

const INTRUSION_LOG_CAP: usize = 10;

/// Identity + mutable economic state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub username: String,
    pub credits: u64,
    pub gems: u64,
    pub xp: u64,
    /// Always `level_for_xp(xp)`; stored for cheap reads.
    pub level: u32,
    pub reputation: u64,
    /// Index-addressed; indices are not stable across mutation.
    pub inventory: Vec<Item>,
    /// At most one item per slot.
    pub equipped: HashMap<EquipSlot, Item>,
    pub active_buffs: Vec<Buff>,
    pub period_earnings: PeriodEarnings,
    /// While in the future, PvP defense is halved.
    pub exposed_until: Option<DateTime<Utc>>,
    /// Short action-freeze window applied by DDoS-type weapons.
    pub ddos_freeze_until: Option<DateTime<Utc>>,
    pub intrusion_log: Vec<IntrusionEntry>,
    pub is_bot: bool,
    pub last_active: DateTime<Utc>,
}

impl Player {
    pub fn new(username: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            credits: STARTING_CREDITS,
            gems: 0,
            xp: 0,
            level: 1,
            reputation: 0,
            inventory: Vec::new(),
            equipped: HashMap::new(),
            active_buffs: Vec::new(),
            period_earnings: PeriodEarnings::fresh(now),
            exposed_until: None,
            ddos_freeze_until: None,
            intrusion_log: Vec::new(),
            is_bot: false,
            last_active: now,
        }
    }

    pub fn bot(username: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            is_bot: true,
            ..Self::new(username, now)
        }
    }

    /// Add XP and re-derive the level. Returns the number of levels gained.
    pub fn gain_xp(&mut self, amount: u64) -> u32 {
        self.xp = self.xp.saturating_add(amount);
        let new_level = level_for_xp(self.xp);
        let gained = new_level.saturating_sub(self.level);
        self.level = new_level;
        gained
    }

    /// Apply a signed credit delta, flooring at zero.
    pub fn apply_credit_delta(&mut self, delta: i64) {
        if delta >= 0 {
            self.credits = self.credits.saturating_add(delta as u64);
        } else {
            self.credits = self.credits.saturating_sub(delta.unsigned_abs());
        }
    }

    /// Drop expired buffs and used-up consumables. Called lazily on access,
    /// never by a background sweep.
    pub fn purge_expired(&mut self, now: DateTime<Utc>) {
        self.active_buffs.retain(|b| b.is_active(now));
        self.inventory
            .retain(|item| match &item.used {
                Some(used) => used.is_active(now),
                None => true,
            });
    }

    /// Highest level among active buffs of the given kind.
    pub fn buff_level(&self, kind: BuffKind, now: DateTime<Utc>) -> u32 {
        self.active_buffs
            .iter()
            .filter(|b| b.kind == kind && b.is_active(now))
            .map(|b| b.level)
            .max()
            .unwrap_or(0)
    }

    pub fn is_exposed(&self, now: DateTime<Utc>) -> bool {
        deadline_active(self.exposed_until, now)
    }

    pub fn is_frozen(&self, now: DateTime<Utc>) -> bool {
        deadline_active(self.ddos_freeze_until, now)
    }

    /// Append an intrusion entry, keeping only the most recent 10.
    pub fn record_intrusion(&mut self, entry: IntrusionEntry) {
        self.intrusion_log.push(entry);
        if self.intrusion_log.len() > INTRUSION_LOG_CAP {
            let drop = self.intrusion_log.len() - INTRUSION_LOG_CAP;
            self.intrusion_log.drain(..drop);
        }
    }

    /// Move an inventory item into its equip slot. Ownership transfers; the
    /// previous occupant (if any) returns to the inventory.
    pub fn equip(&mut self, item_index: usize, slot: EquipSlot) -> Result<(), crate::GameError> {
        let item = self
            .inventory
            .get(item_index)
            .ok_or_else(|| crate::GameError::NotFound(format!("item index {item_index}")))?;
        if !item.is_equippable() {
            return Err(crate::GameError::InvalidState(format!(
                "{} is not equippable",
                item.name
            )));
        }
        let item = self.inventory.remove(item_index);
        if let Some(prev) = self.equipped.insert(slot, item) {
            self.inventory.push(prev);
        }
        Ok(())
    }
}
