//! Outcome categories, icon pools, and reward templates
//!
//! The odds live in two layers: category weights (summing to 100) decide
//! *what kind* of symbol a reel shows, then per-icon weights decide *which*
//! symbol within that category. Reward templates map a winning icon back to
//! a concrete inventory item.

use chrono::{DateTime, Utc};
use nh_core::{BuffKind, BuffSpec, Durability, Item, ItemKind, Rarity};
use serde::Serialize;

/// What a reel symbol resolves to when tripled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeCategory {
    Money,
    Common,
    Rare,
    Epic,
    Legendary,
}

impl OutcomeCategory {
    /// Fixed walk order for cumulative-weight draws.
    pub const ALL: [OutcomeCategory; 5] = [
        OutcomeCategory::Money,
        OutcomeCategory::Common,
        OutcomeCategory::Rare,
        OutcomeCategory::Epic,
        OutcomeCategory::Legendary,
    ];

    pub fn rarity(&self) -> Option<Rarity> {
        match self {
            OutcomeCategory::Money => None,
            OutcomeCategory::Common => Some(Rarity::Common),
            OutcomeCategory::Rare => Some(Rarity::Rare),
            OutcomeCategory::Epic => Some(Rarity::Epic),
            OutcomeCategory::Legendary => Some(Rarity::Legendary),
        }
    }

    /// Bonus XP for a triple of this category.
    pub fn triple_bonus_xp(&self) -> u64 {
        match self.rarity() {
            Some(r) => r.triple_bonus_xp(),
            None => 50,
        }
    }

    /// Categories whose mere appearance on a losing board counts as a
    /// near miss.
    pub fn is_near_miss(&self) -> bool {
        matches!(
            self,
            OutcomeCategory::Rare | OutcomeCategory::Epic | OutcomeCategory::Legendary
        )
    }

    fn index(&self) -> usize {
        match self {
            OutcomeCategory::Money => 0,
            OutcomeCategory::Common => 1,
            OutcomeCategory::Rare => 2,
            OutcomeCategory::Epic => 3,
            OutcomeCategory::Legendary => 4,
        }
    }
}

/// Category weights in [`OutcomeCategory::ALL`] order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryWeights([f64; 5]);

impl CategoryWeights {
    /// Base distribution: money 35, common 25, rare 22, epic 9, legendary 9.
    pub const BASE: CategoryWeights = CategoryWeights([35.0, 25.0, 22.0, 9.0, 9.0]);

    pub fn get(&self, cat: OutcomeCategory) -> f64 {
        self.0[cat.index()]
    }

    pub fn set(&mut self, cat: OutcomeCategory, weight: f64) {
        self.0[cat.index()] = weight;
    }

    pub fn iter(&self) -> impl Iterator<Item = (OutcomeCategory, f64)> + '_ {
        OutcomeCategory::ALL.iter().map(|&c| (c, self.get(c)))
    }
}

pub const MONEY_ICON: &str = "bag_money";
pub const TRASH_ICON: &str = "trash";
pub const DIAMOND_ICON: &str = "diamond";
pub const FLASH_HACKER_ICON: &str = "flash_hacker";
pub const ZERO_DAY_ICON: &str = "zero_day";

/// One reel symbol: a stable code, its category, and its weight within the
/// category's icon pool.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IconDef {
    pub code: &'static str,
    pub name: &'static str,
    pub category: OutcomeCategory,
    pub weight: f64,
}

const fn icon(
    code: &'static str,
    name: &'static str,
    category: OutcomeCategory,
    weight: f64,
) -> IconDef {
    IconDef {
        code,
        name,
        category,
        weight,
    }
}

/// The standard reel strip. Zero-Day is kept visible but almost never
/// drawn; FlashHacker dominates the legendary pool.
const ICONS: [IconDef; 12] = [
    icon(MONEY_ICON, "Money Bag", OutcomeCategory::Money, 1.0),
    icon(TRASH_ICON, "Trash", OutcomeCategory::Common, 1.0),
    icon("rusty_ram", "Rusty RAM", OutcomeCategory::Common, 1.0),
    icon("rusty_cooling", "Rusty Cooling", OutcomeCategory::Common, 1.0),
    icon("rusty_cpu", "Rusty CPU", OutcomeCategory::Common, 1.0),
    icon(DIAMOND_ICON, "Diamond", OutcomeCategory::Rare, 1.0),
    icon("vpn_active", "Military VPN", OutcomeCategory::Rare, 1.0),
    icon("ddos_cannon", "DDoS Cannon", OutcomeCategory::Epic, 1.0),
    icon("rtx_4090_mining", "RTX 4090 Mining Rig", OutcomeCategory::Epic, 1.0),
    icon(FLASH_HACKER_ICON, "FlashHacker", OutcomeCategory::Legendary, 25.0),
    icon("quantum_cpu", "Quantum CPU", OutcomeCategory::Legendary, 1.0),
    icon(ZERO_DAY_ICON, "Zero-Day Exploit", OutcomeCategory::Legendary, 0.5),
];

/// Immutable odds configuration: the icon strip plus base category weights.
#[derive(Debug, Clone)]
pub struct OddsTable {
    icons: Vec<IconDef>,
}

impl OddsTable {
    pub fn standard() -> Self {
        Self {
            icons: ICONS.to_vec(),
        }
    }

    pub fn icons(&self) -> &[IconDef] {
        &self.icons
    }

    pub fn pool(&self, category: OutcomeCategory) -> impl Iterator<Item = &IconDef> {
        self.icons.iter().filter(move |i| i.category == category)
    }

    pub fn find(&self, code: &str) -> Option<&IconDef> {
        self.icons.iter().find(|i| i.code == code)
    }
}

impl Default for OddsTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Concrete item templates per rarity. Codes align with icon codes so a
/// winning triple can award the exact item the reels displayed.
pub fn reward_pool(rarity: Rarity, now: DateTime<Utc>) -> Vec<Item> {
    match rarity {
        Rarity::Common => vec![
            Item::new(
                "rusty_ram",
                "Rusty RAM",
                rarity,
                ItemKind::Ram {
                    hack_speed: 5,
                    stealth_penalty: -2,
                },
                now,
            ),
            Item::new(
                "rusty_cooling",
                "Rusty Cooling",
                rarity,
                ItemKind::Cooling {
                    cooldown_reduction_percent: 5,
                    stealth_penalty: -5,
                },
                now,
            ),
            Item::new(
                "rusty_cpu",
                "Rusty CPU",
                rarity,
                ItemKind::Cpu {
                    hack_speed: 8,
                    overheat_risk_percent: 10,
                },
                now,
            ),
        ],
        Rarity::Rare => vec![Item::new(
            "vpn_active",
            "Military VPN",
            rarity,
            ItemKind::Vpn {
                buff: BuffSpec {
                    kind: BuffKind::Stealth,
                    level: 90,
                    duration_secs: 30 * 60,
                },
            },
            now,
        )],
        Rarity::Epic => vec![
            Item::new(
                "ddos_cannon",
                "DDoS Cannon",
                rarity,
                ItemKind::Weapon {
                    attack_power: 75,
                    durability: Durability::full(15),
                    freeze_on_hit: true,
                },
                now,
            ),
            Item::new(
                "rtx_4090_mining",
                "RTX 4090 Mining Rig",
                rarity,
                ItemKind::Gpu {
                    passive_income_per_hour: 100,
                    brute_force_boost_percent: 40,
                },
                now,
            ),
        ],
        Rarity::Legendary => vec![
            Item::new(
                FLASH_HACKER_ICON,
                "FlashHacker",
                rarity,
                ItemKind::Booster {
                    buff: BuffSpec {
                        kind: BuffKind::Booster,
                        level: 50,
                        duration_secs: 30 * 60,
                    },
                },
                now,
            ),
            Item::new(
                "quantum_cpu",
                "Quantum CPU",
                rarity,
                ItemKind::Cpu {
                    hack_speed: 100,
                    overheat_risk_percent: 0,
                },
                now,
            ),
            Item::new(
                ZERO_DAY_ICON,
                "Zero-Day Exploit",
                rarity,
                ItemKind::Exploit {
                    charges: 1,
                    auto_win: true,
                },
                now,
            ),
        ],
        // Uncommon exists only for market price tiers
        Rarity::Uncommon => Vec::new(),
    }
}
