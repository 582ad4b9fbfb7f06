//! # nh-pvp — Attack resolution
//!
//! One attack is resolved against snapshots of both players and produces an
//! [`AttackResolution`]: the roll, both scores, and every side effect as a
//! pair of record deltas. The caller applies each delta under that player's
//! own store lock, so resolution never holds two locks at once.
//!
//! Score model:
//!
//! - attack = skill base (manual loadout, or stats of equipped modules)
//!   + mini-game score (clamped 0–100) + flat per-slot bonuses
//!   + primary weapon attack power
//! - defense = target level × 10 + firewall bonus + active defense buff,
//!   halved while the target is exposed
//! - success chance = clamp(10, 90, attack / (defense + 1) × 100)

use chrono::{DateTime, Duration, Utc};
use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

use nh_core::{
    BuffKind, EquipSlot, GameError, GameResult, IntrusionEntry, IntrusionResult, ItemKind, Player,
};

/// Flat credit cost charged to the attacker, win or lose.
pub const ATTACK_COST: u64 = 100;

/// Share of the target's credits stolen on success.
pub const CREDIT_STEAL_RATE: f64 = 0.25;

/// Share of the target's gems stolen on success.
pub const GEM_STEAL_RATE: f64 = 0.10;

/// Action-freeze window applied by freeze-on-hit weapons.
pub const FREEZE_WINDOW_SECS: i64 = 3;

const FIREWALL_DEFENSE_BONUS: f64 = 30.0;
const MINI_GAME_SCORE_CAP: u32 = 100;
const CHANCE_FLOOR: f64 = 10.0;
const CHANCE_CEIL: f64 = 90.0;

/// Manually declared skill base, used instead of equipped-module stats when
/// supplied.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Loadout {
    pub hardware_level: u32,
    pub software_level: u32,
    pub crew_skill_level: u32,
}

impl Loadout {
    fn skill_base(&self) -> f64 {
        f64::from(self.hardware_level)
            + f64::from(self.software_level)
            + f64::from(self.crew_skill_level) * 2.0
    }
}

/// Attack parameters supplied by the client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttackInput {
    pub loadout: Option<Loadout>,
    /// Client-side mini-game result; clamped to 0–100 server-side.
    pub mini_game_score: u32,
}

/// Everything one resolved attack decided. Apply to each record separately
/// with [`apply_to_attacker`](Self::apply_to_attacker) and
/// [`apply_to_target`](Self::apply_to_target).
#[derive(Debug, Clone, Serialize)]
pub struct AttackResolution {
    pub success: bool,
    pub stolen_credits: u64,
    pub stolen_gems: u64,
    pub attack_score: u64,
    /// Effective (exposure-adjusted) defense, floored.
    pub defense_score: u64,
    pub success_chance: f64,
    pub roll: f64,
    /// The primary weapon spent a durability charge.
    pub weapon_used: bool,
    /// Apply a freeze window to the target (freeze-on-hit weapon, success).
    pub freeze_target: bool,
    pub attacker_name: String,
    pub target_name: String,
    pub at: DateTime<Utc>,
    pub message: String,
}

impl AttackResolution {
    /// Commit the attacker's side: cost, spoils, reputation, weapon wear.
    pub fn apply_to_attacker(&self, attacker: &mut Player) {
        attacker.credits = attacker
            .credits
            .saturating_sub(ATTACK_COST)
            .saturating_add(self.stolen_credits);
        attacker.gems = attacker.gems.saturating_add(self.stolen_gems);
        if self.success {
            attacker.reputation = attacker.reputation.saturating_add(50);
        } else {
            attacker.reputation = attacker.reputation.saturating_sub(10);
        }
        if self.weapon_used {
            consume_weapon(attacker);
        }
        attacker.last_active = self.at;
    }

    /// Commit the target's side: losses, reputation, freeze, intrusion log.
    pub fn apply_to_target(&self, target: &mut Player) {
        if self.success {
            target.credits = target.credits.saturating_sub(self.stolen_credits);
            target.gems = target.gems.saturating_sub(self.stolen_gems);
            target.reputation = target.reputation.saturating_sub(25);
        } else {
            target.reputation = target.reputation.saturating_add(25);
        }
        if self.freeze_target {
            target.ddos_freeze_until = Some(self.at + Duration::seconds(FREEZE_WINDOW_SECS));
        }
        target.record_intrusion(IntrusionEntry {
            attacker_name: self.attacker_name.clone(),
            at: self.at,
            result: if self.success {
                IntrusionResult::Success
            } else {
                IntrusionResult::Blocked
            },
            attack_score: self.attack_score,
            defense_score: self.defense_score,
        });
    }
}

/// Spend one durability charge on the equipped primary weapon, removing it
/// when destroyed.
fn consume_weapon(attacker: &mut Player) {
    let destroyed = match attacker.equipped.get_mut(&EquipSlot::AttackPrimaryWeapon) {
        Some(weapon) => match &mut weapon.kind {
            ItemKind::Weapon { durability, .. } => durability.consume(),
            _ => false,
        },
        None => return,
    };
    if destroyed {
        attacker.equipped.remove(&EquipSlot::AttackPrimaryWeapon);
    }
}

/// Skill base derived from equipped modules when no manual loadout is
/// supplied. The primary weapon is excluded; its attack power enters as the
/// weapon bonus instead.
fn derived_skill_base(attacker: &Player) -> f64 {
    [
        EquipSlot::CoreCpu,
        EquipSlot::CoreRam,
        EquipSlot::CoreCooling,
        EquipSlot::AttackExploit,
    ]
    .iter()
    .filter_map(|slot| attacker.equipped.get(slot))
    .map(|item| f64::from(item.stated_stat()))
    .sum()
}

fn attack_score(attacker: &Player, input: &AttackInput) -> (f64, bool, bool) {
    let skill = match &input.loadout {
        Some(loadout) => loadout.skill_base(),
        None => derived_skill_base(attacker),
    };
    let mini_game = f64::from(input.mini_game_score.min(MINI_GAME_SCORE_CAP));

    let mut equip = 0.0;
    let mut weapon_used = false;
    let mut freeze_on_hit = false;
    for slot in EquipSlot::ALL {
        let Some(item) = attacker.equipped.get(&slot) else {
            continue;
        };
        if slot == EquipSlot::AttackPrimaryWeapon {
            if let ItemKind::Weapon {
                attack_power,
                durability,
                freeze_on_hit: freezes,
            } = &item.kind
            {
                equip += f64::from(*attack_power);
                weapon_used = durability.current > 0;
                freeze_on_hit = *freezes;
            } else {
                equip += 50.0;
            }
        } else {
            equip += slot.attack_bonus();
        }
    }

    (skill + mini_game + equip, weapon_used, freeze_on_hit)
}

fn defense_score(target: &Player, now: DateTime<Utc>) -> f64 {
    let mut score = f64::from(target.level) * 10.0;
    if target.equipped.contains_key(&EquipSlot::DefenseFirewall) {
        score += FIREWALL_DEFENSE_BONUS;
    }
    score += f64::from(target.buff_level(BuffKind::Defense, now));
    if target.is_exposed(now) {
        score *= 0.5;
    }
    score
}

/// Resolve an attack with an engine-drawn roll.
pub fn resolve_attack<R: Rng>(
    attacker: &Player,
    target: &Player,
    input: &AttackInput,
    now: DateTime<Utc>,
    rng: &mut R,
) -> GameResult<AttackResolution> {
    let roll = rng.random::<f64>() * 100.0;
    resolve_attack_with_roll(attacker, target, input, now, roll)
}

/// Resolve an attack with a predetermined roll in `[0, 100)`.
pub fn resolve_attack_with_roll(
    attacker: &Player,
    target: &Player,
    input: &AttackInput,
    now: DateTime<Utc>,
    roll: f64,
) -> GameResult<AttackResolution> {
    if attacker.id == target.id {
        return Err(GameError::InvalidState(
            "cannot attack yourself".to_string(),
        ));
    }
    if attacker.credits < ATTACK_COST {
        return Err(GameError::InsufficientFunds {
            needed: ATTACK_COST,
            available: attacker.credits,
        });
    }

    let (attack, weapon_used, freeze_on_hit) = attack_score(attacker, input);
    let defense = defense_score(target, now);
    let chance = (attack / (defense + 1.0) * 100.0).clamp(CHANCE_FLOOR, CHANCE_CEIL);
    let success = roll <= chance;

    let (stolen_credits, stolen_gems) = if success {
        (
            (target.credits as f64 * CREDIT_STEAL_RATE).floor() as u64,
            (target.gems as f64 * GEM_STEAL_RATE).floor() as u64,
        )
    } else {
        (0, 0)
    };

    debug!(
        "attack {} -> {}: score {attack:.0} vs {defense:.0}, chance {chance:.1}, roll {roll:.1}",
        attacker.username, target.username
    );

    let message = if success {
        format!(
            ">> BREACH_SUCCESSFUL: extracted {stolen_credits} credits + {stolen_gems} gems from {}",
            target.username
        )
    } else {
        format!(">> ATTACK_BLOCKED: {}'s defense held", target.username)
    };

    Ok(AttackResolution {
        success,
        stolen_credits,
        stolen_gems,
        attack_score: attack as u64,
        defense_score: defense as u64,
        success_chance: chance,
        roll,
        weapon_used,
        freeze_target: success && weapon_used && freeze_on_hit,
        attacker_name: attacker.username.clone(),
        target_name: target.username.clone(),
        at: now,
        message,
    })
}
