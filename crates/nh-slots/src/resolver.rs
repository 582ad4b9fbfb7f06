//! Spin settlement
//!
//! [`SpinEngine::spin`] draws three reels against a player snapshot and
//! produces a [`SpinOutcome`]: everything the spin decided, expressed as a
//! delta. Applying the delta to the live record is a separate, replayable
//! step; the level is re-derived from XP at apply time so the stored level
//! never drifts from the curve.

use chrono::{DateTime, Utc};
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use nh_core::{GameError, GameResult, Item, LEVEL_UP_CREDIT_BONUS, Player, spin_cost};

use crate::odds::{
    DIAMOND_ICON, FLASH_HACKER_ICON, IconDef, OddsTable, OutcomeCategory, TRASH_ICON, reward_pool,
};
use crate::reel::draw_reel;

/// XP granted by every spin regardless of outcome.
pub const BASE_SPIN_XP: u64 = 5;

/// Triple-trash penalty in credits.
pub const TRASH_PENALTY: u64 = 200;

/// Payout when an item win has no template to award.
const CONSOLATION_CREDITS: u64 = 150;

const MONEY_TRIPLE_RANGE: (u64, u64) = (100, 500);
const DIAMOND_TRIPLE_RANGE: (u64, u64) = (5_000, 15_000);
const FLASH_HACKER_BONUS_RANGE: (u64, u64) = (25_000, 120_000);

/// How a settled spin resolved.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SpinResult {
    Loss {
        near_miss: bool,
    },
    Money {
        amount: u64,
        diamond: bool,
    },
    Penalty {
        amount: u64,
    },
    Item {
        item: Item,
        bonus_credits: u64,
    },
}

/// The full decision of one spin, expressed as a delta against the player
/// snapshot it was resolved from. Applying twice is a bug; applying after
/// a failed persist retry is the intended use.
#[derive(Debug, Clone, Serialize)]
pub struct SpinOutcome {
    pub reels: [IconDef; 3],
    pub spin_cost: u64,
    pub result: SpinResult,
    /// Base XP plus any triple bonus.
    pub xp_gained: u64,
    /// Net credits from cost, winnings, and penalties. Level-up bonuses are
    /// excluded; they depend on the live record at apply time.
    pub credit_delta: i64,
    /// Positive winnings counted toward the leaderboard period.
    pub earnings_gain: u64,
    pub message: String,
}

impl SpinOutcome {
    /// Commit this outcome to a player record. Returns levels gained.
    ///
    /// Level and level-up credit bonuses are derived from the record's XP
    /// *after* the delta, so concurrent XP changes settle last-writer-wins
    /// without ever leaving `level` inconsistent with `xp`.
    pub fn apply(&self, player: &mut Player, now: DateTime<Utc>) -> u32 {
        player.purge_expired(now);
        player.apply_credit_delta(self.credit_delta);
        let gained = player.gain_xp(self.xp_gained);
        if gained > 0 {
            player.credits = player
                .credits
                .saturating_add(u64::from(gained) * LEVEL_UP_CREDIT_BONUS);
        }
        if let SpinResult::Item { item, .. } = &self.result {
            player.inventory.push(item.clone());
        }
        if self.earnings_gain > 0 {
            player.period_earnings.accumulate(self.earnings_gain, now);
        }
        player.last_active = now;
        gained
    }
}

/// The spin cost for the player's level, or `InsufficientFunds`.
fn affordable_cost(player: &Player) -> GameResult<u64> {
    let cost = spin_cost(player.level);
    if player.credits < cost {
        return Err(GameError::InsufficientFunds {
            needed: cost,
            available: player.credits,
        });
    }
    Ok(cost)
}

/// Reel-drawing and settlement engine. One per worker; seedable for
/// reproducible simulation runs.
pub struct SpinEngine {
    table: OddsTable,
    rng: StdRng,
}

impl SpinEngine {
    pub fn new() -> Self {
        Self {
            table: OddsTable::standard(),
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            table: OddsTable::standard(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn table(&self) -> &OddsTable {
        &self.table
    }

    /// Draw three reels and settle them against the player snapshot. An
    /// unaffordable spin is rejected before any reel is drawn, so the
    /// engine RNG stays untouched.
    pub fn spin(&mut self, player: &Player, now: DateTime<Utc>) -> GameResult<SpinOutcome> {
        affordable_cost(player)?;
        let first = draw_reel(&self.table, &[], &mut self.rng);
        let second = draw_reel(&self.table, &[first], &mut self.rng);
        let third = draw_reel(&self.table, &[first, second], &mut self.rng);
        self.settle(player, [first, second, third], None, now)
    }

    /// Settle a predetermined board. Rolled amounts still come from the
    /// engine RNG.
    pub fn spin_forced(
        &mut self,
        player: &Player,
        reels: [IconDef; 3],
        now: DateTime<Utc>,
    ) -> GameResult<SpinOutcome> {
        self.settle(player, reels, None, now)
    }

    /// Settle a predetermined board with a predetermined rolled amount
    /// (money payout or FlashHacker bonus, whichever the board calls for).
    pub fn spin_forced_with_amount(
        &mut self,
        player: &Player,
        reels: [IconDef; 3],
        amount: u64,
        now: DateTime<Utc>,
    ) -> GameResult<SpinOutcome> {
        self.settle(player, reels, Some(amount), now)
    }

    fn roll(&mut self, range: (u64, u64), forced: Option<u64>) -> u64 {
        match forced {
            Some(v) => v,
            None => self.rng.random_range(range.0..=range.1),
        }
    }

    fn settle(
        &mut self,
        player: &Player,
        reels: [IconDef; 3],
        forced_amount: Option<u64>,
        now: DateTime<Utc>,
    ) -> GameResult<SpinOutcome> {
        let cost = affordable_cost(player)?;

        let triple = reels[0].code == reels[1].code && reels[1].code == reels[2].code;
        let (result, xp_bonus, message) = if triple {
            self.settle_triple(&reels[0], forced_amount, now)
        } else {
            let near_miss = reels.iter().any(|r| r.category.is_near_miss());
            let message = if near_miss {
                ">> SO CLOSE: high-value target spotted".to_string()
            } else {
                ">> BREACH_FAILED: security detected".to_string()
            };
            (SpinResult::Loss { near_miss }, 0, message)
        };

        let win_delta: i64 = match &result {
            SpinResult::Loss { .. } => 0,
            SpinResult::Money { amount, .. } => *amount as i64,
            SpinResult::Penalty { amount } => -(*amount as i64),
            SpinResult::Item { bonus_credits, .. } => *bonus_credits as i64,
        };
        let earnings_gain = win_delta.max(0) as u64;

        debug!(
            "spin settled: reels=[{},{},{}] cost={} delta={}",
            reels[0].code,
            reels[1].code,
            reels[2].code,
            cost,
            win_delta - cost as i64
        );

        Ok(SpinOutcome {
            reels,
            spin_cost: cost,
            result,
            xp_gained: BASE_SPIN_XP + xp_bonus,
            credit_delta: win_delta - cost as i64,
            earnings_gain,
            message,
        })
    }

    fn settle_triple(
        &mut self,
        matched: &IconDef,
        forced_amount: Option<u64>,
        now: DateTime<Utc>,
    ) -> (SpinResult, u64, String) {
        let bonus_xp = matched.category.triple_bonus_xp();
        match matched.category {
            OutcomeCategory::Money => {
                let amount = self.roll(MONEY_TRIPLE_RANGE, forced_amount);
                (
                    SpinResult::Money {
                        amount,
                        diamond: false,
                    },
                    bonus_xp,
                    format!(">> TRIPLE MATCH: {amount} credits"),
                )
            }
            OutcomeCategory::Common if matched.code == TRASH_ICON => (
                SpinResult::Penalty {
                    amount: TRASH_PENALTY,
                },
                bonus_xp,
                format!(">> TRASH PENALTY: -{TRASH_PENALTY} credits"),
            ),
            OutcomeCategory::Rare if matched.code == DIAMOND_ICON => {
                let amount = self.roll(DIAMOND_TRIPLE_RANGE, forced_amount);
                (
                    SpinResult::Money {
                        amount,
                        diamond: true,
                    },
                    bonus_xp,
                    format!(">> TRIPLE DIAMOND: {amount} credits"),
                )
            }
            category => {
                // Item win: award the exact item the reels displayed when a
                // template exists, otherwise any template of the rarity.
                let rarity = match category.rarity() {
                    Some(r) => r,
                    None => unreachable!("money triples handled above"),
                };
                let pool = reward_pool(rarity, now);
                if pool.is_empty() {
                    return (
                        SpinResult::Money {
                            amount: CONSOLATION_CREDITS,
                            diamond: false,
                        },
                        0,
                        format!(">> COMPENSATION: {CONSOLATION_CREDITS} credits"),
                    );
                }
                let item = match pool.iter().position(|i| i.code == matched.code) {
                    Some(idx) => pool[idx].clone(),
                    None => {
                        let idx = self.rng.random_range(0..pool.len());
                        pool[idx].clone()
                    }
                };
                let bonus_credits = if item.code == FLASH_HACKER_ICON {
                    self.roll(FLASH_HACKER_BONUS_RANGE, forced_amount)
                } else {
                    0
                };
                let message = if bonus_credits > 0 {
                    format!(">> TRIPLE FLASHHACKER: {} + {bonus_credits} credits", item.name)
                } else {
                    format!(">> TRIPLE MATCH: {} acquired", item.name)
                };
                (
                    SpinResult::Item {
                        item,
                        bonus_credits,
                    },
                    bonus_xp,
                    message,
                )
            }
        }
    }
}

impl Default for SpinEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::odds::ZERO_DAY_ICON;
    use nh_core::ItemKind;

    fn icon(engine: &SpinEngine, code: &str) -> IconDef {
        *engine.table().find(code).unwrap()
    }

    fn player() -> Player {
        Player::new("neo", Utc::now())
    }

    #[test]
    fn test_insufficient_funds_rejected() {
        let mut engine = SpinEngine::seeded(1);
        let mut p = player();
        p.credits = 0;
        let err = engine.spin(&p, Utc::now()).unwrap_err();
        assert!(matches!(err, GameError::InsufficientFunds { needed: 150, .. }));
    }

    #[test]
    fn test_loss_charges_cost_and_grants_base_xp() {
        let mut engine = SpinEngine::seeded(1);
        let now = Utc::now();
        let reels = [
            icon(&engine, "bag_money"),
            icon(&engine, "trash"),
            icon(&engine, "rusty_ram"),
        ];
        let mut p = player();
        let outcome = engine.spin_forced(&p, reels, now).unwrap();
        assert!(matches!(outcome.result, SpinResult::Loss { near_miss: false }));
        assert_eq!(outcome.credit_delta, -150);
        assert_eq!(outcome.xp_gained, 5);
        assert_eq!(outcome.earnings_gain, 0);

        outcome.apply(&mut p, now);
        assert_eq!(p.credits, 850);
        assert_eq!(p.xp, 5);
        assert_eq!(p.level, 1);
    }

    #[test]
    fn test_near_miss_flagged_on_loss() {
        let mut engine = SpinEngine::seeded(1);
        let reels = [
            icon(&engine, "bag_money"),
            icon(&engine, "diamond"),
            icon(&engine, "trash"),
        ];
        let outcome = engine.spin_forced(&player(), reels, Utc::now()).unwrap();
        assert!(matches!(outcome.result, SpinResult::Loss { near_miss: true }));
    }

    #[test]
    fn test_money_triple_settlement() {
        // Level 1 player, fixed 300-credit payout: 1000 - 150 + 300 = 1150,
        // xp 5 + 50 = 55.
        let mut engine = SpinEngine::seeded(1);
        let now = Utc::now();
        let money = icon(&engine, "bag_money");
        let mut p = player();
        let outcome = engine
            .spin_forced_with_amount(&p, [money, money, money], 300, now)
            .unwrap();
        assert_eq!(outcome.credit_delta, 150);
        assert_eq!(outcome.xp_gained, 55);
        assert_eq!(outcome.earnings_gain, 300);

        outcome.apply(&mut p, now);
        assert_eq!(p.credits, 1150);
        assert_eq!(p.xp, 55);
        assert_eq!(p.period_earnings.earnings, 300);
    }

    #[test]
    fn test_trash_triple_penalty() {
        let mut engine = SpinEngine::seeded(1);
        let now = Utc::now();
        let trash = icon(&engine, "trash");
        let mut p = player();
        let outcome = engine.spin_forced(&p, [trash, trash, trash], now).unwrap();
        assert!(matches!(outcome.result, SpinResult::Penalty { amount: 200 }));
        assert_eq!(outcome.credit_delta, -350);
        // Triple XP still granted on a penalty board
        assert_eq!(outcome.xp_gained, 55);
        assert_eq!(outcome.earnings_gain, 0);

        outcome.apply(&mut p, now);
        assert_eq!(p.credits, 650);
    }

    #[test]
    fn test_diamond_triple_is_big_money() {
        let mut engine = SpinEngine::seeded(1);
        let diamond = icon(&engine, "diamond");
        let outcome = engine
            .spin_forced(&player(), [diamond, diamond, diamond], Utc::now())
            .unwrap();
        match outcome.result {
            SpinResult::Money { amount, diamond } => {
                assert!(diamond);
                assert!((5_000..=15_000).contains(&amount));
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(outcome.xp_gained, 55);
    }

    #[test]
    fn test_item_triple_awards_displayed_item() {
        let mut engine = SpinEngine::seeded(1);
        let now = Utc::now();
        let cannon = icon(&engine, "ddos_cannon");
        let mut p = player();
        let outcome = engine.spin_forced(&p, [cannon, cannon, cannon], now).unwrap();
        match &outcome.result {
            SpinResult::Item {
                item,
                bonus_credits,
            } => {
                assert_eq!(item.code, "ddos_cannon");
                assert_eq!(*bonus_credits, 0);
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(outcome.xp_gained, 55);

        outcome.apply(&mut p, now);
        assert_eq!(p.inventory.len(), 1);
        assert_eq!(p.credits, 850);
    }

    #[test]
    fn test_flash_hacker_triple_pays_bonus() {
        let mut engine = SpinEngine::seeded(1);
        let now = Utc::now();
        let fh = icon(&engine, "flash_hacker");
        let mut p = player();
        let outcome = engine
            .spin_forced_with_amount(&p, [fh, fh, fh], 30_000, now)
            .unwrap();
        match &outcome.result {
            SpinResult::Item {
                item,
                bonus_credits,
            } => {
                assert_eq!(item.code, "flash_hacker");
                assert_eq!(*bonus_credits, 30_000);
            }
            other => panic!("unexpected result: {other:?}"),
        }
        // Legendary triple XP
        assert_eq!(outcome.xp_gained, 1005);
        assert_eq!(outcome.earnings_gain, 30_000);

        outcome.apply(&mut p, now);
        // 1000 - 150 + 30000, plus level-up bonuses for reaching level 5
        // (1005 XP clears the 1000-XP threshold) at 500 per level gained.
        assert_eq!(p.level, 5);
        assert_eq!(p.credits, 1000 - 150 + 30_000 + 4 * 500);
        assert_eq!(p.period_earnings.earnings, 30_000);
    }

    #[test]
    fn test_zero_day_triple_awards_exploit() {
        let mut engine = SpinEngine::seeded(1);
        let zd = icon(&engine, ZERO_DAY_ICON);
        let outcome = engine
            .spin_forced(&player(), [zd, zd, zd], Utc::now())
            .unwrap();
        match &outcome.result {
            SpinResult::Item { item, .. } => {
                assert_eq!(item.code, ZERO_DAY_ICON);
                assert!(matches!(
                    item.kind,
                    ItemKind::Exploit {
                        charges: 1,
                        auto_win: true
                    }
                ));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_rejected_spin_leaves_rng_untouched() {
        let now = Utc::now();
        let mut broke = player();
        broke.credits = 0;
        let rich = player();

        let mut charged = SpinEngine::seeded(7);
        let mut fresh = SpinEngine::seeded(7);
        assert!(charged.spin(&broke, now).is_err());

        // The failed attempt must not have consumed any draws
        let a = charged.spin(&rich, now).unwrap();
        let b = fresh.spin(&rich, now).unwrap();
        assert_eq!(a.reels.map(|r| r.code), b.reels.map(|r| r.code));
    }

    #[test]
    fn test_spin_cost_scales_with_level() {
        let mut engine = SpinEngine::seeded(1);
        let mut p = player();
        p.level = 7;
        p.credits = 10_000;
        let outcome = engine.spin(&p, Utc::now()).unwrap();
        assert_eq!(outcome.spin_cost, 300);
    }

    #[test]
    fn test_random_spins_always_charge_cost() {
        let mut engine = SpinEngine::seeded(99);
        let now = Utc::now();
        let mut p = player();
        p.credits = 1_000_000;
        for _ in 0..500 {
            let outcome = engine.spin(&p, now).unwrap();
            match outcome.result {
                SpinResult::Loss { .. } => assert_eq!(outcome.credit_delta, -150),
                SpinResult::Penalty { amount } => {
                    assert_eq!(outcome.credit_delta, -(150 + amount as i64))
                }
                SpinResult::Money { amount, .. } => {
                    assert_eq!(outcome.credit_delta, amount as i64 - 150)
                }
                SpinResult::Item { bonus_credits, .. } => {
                    assert_eq!(outcome.credit_delta, bonus_credits as i64 - 150)
                }
            }
            assert!(outcome.xp_gained >= 5);
        }
    }
}
