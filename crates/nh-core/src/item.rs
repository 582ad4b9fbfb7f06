//! Item definitions
//!
//! Every reward/equipment unit is a tagged union: the `kind` discriminator
//! selects a variant carrying only the stats relevant to that kind, so no
//! call site ever sniffs icon paths to infer what an item is.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::expiry::Expires;

/// Rarity tier classification driving reward magnitude.
///
/// `Uncommon` participates only in market price caps, never in spin odds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    /// Bonus XP granted for a triple match of this rarity.
    pub fn triple_bonus_xp(&self) -> u64 {
        match self {
            Rarity::Legendary => 1000,
            _ => 50,
        }
    }
}

/// A named equipment socket holding at most one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipSlot {
    #[serde(rename = "core:cpu")]
    CoreCpu,
    #[serde(rename = "core:ram")]
    CoreRam,
    #[serde(rename = "core:cooling")]
    CoreCooling,
    #[serde(rename = "attack:primaryWeapon")]
    AttackPrimaryWeapon,
    #[serde(rename = "attack:exploit")]
    AttackExploit,
    #[serde(rename = "defense:firewall")]
    DefenseFirewall,
    #[serde(rename = "defense:stealth")]
    DefenseStealth,
}

impl EquipSlot {
    pub const ALL: [EquipSlot; 7] = [
        EquipSlot::CoreCpu,
        EquipSlot::CoreRam,
        EquipSlot::CoreCooling,
        EquipSlot::AttackPrimaryWeapon,
        EquipSlot::AttackExploit,
        EquipSlot::DefenseFirewall,
        EquipSlot::DefenseStealth,
    ];

    /// Flat attack-score bonus contributed by an occupied slot.
    ///
    /// The primary weapon contributes its own stated attack power instead.
    pub fn attack_bonus(&self) -> f64 {
        match self {
            EquipSlot::AttackExploit => 30.0,
            EquipSlot::CoreCpu => 20.0,
            EquipSlot::CoreRam => 10.0,
            EquipSlot::CoreCooling => 5.0,
            EquipSlot::DefenseStealth => 10.0,
            _ => 0.0,
        }
    }
}

/// Charge-based wear. The item is destroyed when `current` reaches 0.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Durability {
    pub max: u32,
    pub current: u32,
}

impl Durability {
    pub fn full(max: u32) -> Self {
        Self { max, current: max }
    }

    /// Spend one charge. Returns true if the item is now destroyed.
    pub fn consume(&mut self) -> bool {
        self.current = self.current.saturating_sub(1);
        self.current == 0
    }
}

/// Timed effect classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuffKind {
    /// Stealth/VPN: detection reduction while active
    Stealth,
    /// FlashHacker-style multiplier package (mission boost, spin luck, shield)
    Booster,
    /// Timed defense layer counted into the PvP defense score
    Defense,
}

/// Effect descriptor carried by consumable items.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BuffSpec {
    pub kind: BuffKind,
    /// Effect magnitude (defense level, detection reduction percent, ...)
    pub level: u32,
    pub duration_secs: i64,
}

/// An applied timed effect on a player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Buff {
    pub kind: BuffKind,
    pub level: u32,
    pub expires_at: DateTime<Utc>,
}

impl Expires for Buff {
    fn expires_at(&self) -> Option<DateTime<Utc>> {
        Some(self.expires_at)
    }
}

/// Consumable activation record: "used, cooling down" until the expiry,
/// after which the item is purged from inventory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsedState {
    pub activated_at: DateTime<Utc>,
    pub activated_until: DateTime<Utc>,
}

impl Expires for UsedState {
    fn expires_at(&self) -> Option<DateTime<Utc>> {
        Some(self.activated_until)
    }
}

/// Kind-specific stat payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemKind {
    Cpu {
        hack_speed: u32,
        overheat_risk_percent: u32,
    },
    Ram {
        hack_speed: u32,
        stealth_penalty: i32,
    },
    Cooling {
        cooldown_reduction_percent: u32,
        stealth_penalty: i32,
    },
    Gpu {
        passive_income_per_hour: u32,
        brute_force_boost_percent: u32,
    },
    Weapon {
        attack_power: u32,
        durability: Durability,
        /// DDoS-type weapons freeze the target briefly on a successful hit
        freeze_on_hit: bool,
    },
    Firewall {
        defense_bonus: u32,
    },
    Vpn {
        buff: BuffSpec,
    },
    Exploit {
        charges: u32,
        auto_win: bool,
    },
    Booster {
        buff: BuffSpec,
    },
}

/// A reward/equipment unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    /// Stable template code (e.g. "rusty_cpu", "flash_hacker")
    pub code: String,
    pub name: String,
    pub rarity: Rarity,
    #[serde(flatten)]
    pub kind: ItemKind,
    pub acquired_at: DateTime<Utc>,
    /// Set once a consumable has been activated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used: Option<UsedState>,
}

impl Item {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        rarity: Rarity,
        kind: ItemKind,
        acquired_at: DateTime<Utc>,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            rarity,
            kind,
            acquired_at,
            used: None,
        }
    }

    /// Can this item go into an equipment slot?
    pub fn is_equippable(&self) -> bool {
        matches!(
            &self.kind,
            ItemKind::Cpu { .. }
                | ItemKind::Ram { .. }
                | ItemKind::Cooling { .. }
                | ItemKind::Gpu { .. }
                | ItemKind::Weapon { .. }
                | ItemKind::Firewall { .. }
        )
    }

    /// Can this item be consumed/activated?
    pub fn is_usable(&self) -> bool {
        matches!(
            &self.kind,
            ItemKind::Vpn { .. } | ItemKind::Exploit { .. } | ItemKind::Booster { .. }
        )
    }

    /// The slot this item naturally equips into, if any.
    pub fn natural_slot(&self) -> Option<EquipSlot> {
        match &self.kind {
            ItemKind::Cpu { .. } => Some(EquipSlot::CoreCpu),
            ItemKind::Ram { .. } => Some(EquipSlot::CoreRam),
            ItemKind::Cooling { .. } => Some(EquipSlot::CoreCooling),
            ItemKind::Gpu { .. } => Some(EquipSlot::CoreCpu),
            ItemKind::Weapon { .. } => Some(EquipSlot::AttackPrimaryWeapon),
            ItemKind::Firewall { .. } => Some(EquipSlot::DefenseFirewall),
            _ => None,
        }
    }

    /// Stated primary stat, used when deriving a base attack score from
    /// equipped modules instead of a manual loadout.
    pub fn stated_stat(&self) -> u32 {
        match &self.kind {
            ItemKind::Cpu { hack_speed, .. } => *hack_speed,
            ItemKind::Ram { hack_speed, .. } => *hack_speed,
            ItemKind::Cooling {
                cooldown_reduction_percent,
                ..
            } => *cooldown_reduction_percent,
            ItemKind::Gpu {
                brute_force_boost_percent,
                ..
            } => *brute_force_boost_percent,
            ItemKind::Weapon { attack_power, .. } => *attack_power,
            ItemKind::Firewall { defense_bonus } => *defense_bonus,
            ItemKind::Exploit { charges, .. } => *charges,
            ItemKind::Vpn { buff } | ItemKind::Booster { buff } => buff.level,
        }
    }
}
