//! Ghost simulation
//!
//! Synthetic accounts that spin, level, and score big wins on a randomized
//! timer so the leaderboard and activity feed never look dead. Ghost deltas
//! are relaxed approximations of the real primitives (no cost gating), but
//! they flow through the same player record invariants: levels derive from
//! XP and positive gains land in period earnings.
//!
//! Human activity feeds back into ghost pace: the more the real players
//! earn this epoch, the faster (and richer) the ghosts get.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use rand::Rng;
use rand::rngs::StdRng;
use rand::SeedableRng;

use nh_core::{GameResult, LEVEL_UP_CREDIT_BONUS, Player, PlayerId, xp_for_level};
use nh_events::{EventBus, GameEvent};
use nh_store::PlayerStore;

const GHOST_PREFIXES: [&str; 20] = [
    "Dark", "Cyber", "Neon", "Ghost", "Root", "Sudo", "xX", "KSA", "Toxic", "Viper", "Shadow",
    "Phoenix", "Ninja", "Blade", "Storm", "Frost", "Fire", "Elite", "Pro", "Apex",
];

const GHOST_SUFFIXES: [&str; 20] = [
    "Hunter", "Wolf", "99", "Dev", "exe", "007", "X", "Sniper", "Hacker", "Killer", "Master",
    "Lord", "King", "God", "Demon", "420", "666", "Pro", "Elite", "2077",
];

/// Aggregate human earnings at which ghost pace doubles / triples.
pub const ACTIVITY_TIERS: [u64; 2] = [100_000, 200_000];

const TICK_DELAY_SECS: (u64, u64) = (15, 30);

pub fn generate_ghost_username<R: Rng>(rng: &mut R) -> String {
    let prefix = GHOST_PREFIXES[rng.random_range(0..GHOST_PREFIXES.len())];
    let suffix = GHOST_SUFFIXES[rng.random_range(0..GHOST_SUFFIXES.len())];
    format!("{prefix}_{suffix}")
}

/// A fresh synthetic account with plausible mid-game stats.
pub fn generate_ghost<R: Rng>(rng: &mut R, now: DateTime<Utc>) -> Player {
    let mut ghost = Player::bot(generate_ghost_username(rng), now);
    ghost.gain_xp(rng.random_range(0..5_000));
    ghost.reputation = rng.random_range(100..=10_100);
    ghost.credits = rng.random_range(1_000..=51_000);
    ghost
}

/// Seed the store with `count` uniquely named ghosts.
pub fn spawn_ghost_army<S, R>(
    store: &S,
    count: usize,
    rng: &mut R,
    now: DateTime<Utc>,
) -> Vec<PlayerId>
where
    S: PlayerStore,
    R: Rng,
{
    let mut ids = Vec::with_capacity(count);
    while ids.len() < count {
        let ghost = generate_ghost(rng, now);
        let id = ghost.id;
        // Name collisions just retry with a fresh roll
        if store.insert(ghost).is_ok() {
            ids.push(id);
        }
    }
    info!("ghost army online: {} accounts", ids.len());
    ids
}

/// Ghost pace multiplier from aggregate human period earnings:
/// 1x below 100k, 2x below 200k, 3x beyond.
pub fn activity_factor<S: PlayerStore>(store: &S) -> GameResult<u32> {
    let mut human_earnings: u64 = 0;
    for id in store.player_ids() {
        let p = store.get(id)?;
        if !p.is_bot {
            human_earnings = human_earnings.saturating_add(p.period_earnings.earnings);
        }
    }
    Ok(if human_earnings >= ACTIVITY_TIERS[1] {
        3
    } else if human_earnings >= ACTIVITY_TIERS[0] {
        2
    } else {
        1
    })
}

/// What a single ghost tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GhostAction {
    Spin,
    LevelUp,
    BigWin,
}

/// Run one ghost action against a random bot. Returns `None` when the
/// store holds no bots yet.
pub fn ghost_tick<S, R>(
    store: &S,
    bus: &EventBus,
    factor: u32,
    rng: &mut R,
    now: DateTime<Utc>,
) -> GameResult<Option<GhostAction>>
where
    S: PlayerStore,
    R: Rng,
{
    let mut bots = Vec::new();
    for id in store.player_ids() {
        if store.get(id)?.is_bot {
            bots.push(id);
        }
    }
    if bots.is_empty() {
        return Ok(None);
    }
    let bot_id = bots[rng.random_range(0..bots.len())];

    let action = match rng.random_range(0..3) {
        0 => GhostAction::Spin,
        1 => GhostAction::LevelUp,
        _ => GhostAction::BigWin,
    };
    match action {
        GhostAction::Spin => simulate_spin(store, bot_id, factor, rng, now)?,
        GhostAction::LevelUp => simulate_level_up(store, bus, bot_id, now)?,
        GhostAction::BigWin => simulate_big_win(store, bus, bot_id, factor, rng, now)?,
    }
    Ok(Some(action))
}

/// Approximate spin: random XP, a credit swing that can lose, positive
/// swings scaled by the activity factor.
fn simulate_spin<S, R>(
    store: &S,
    bot_id: PlayerId,
    factor: u32,
    rng: &mut R,
    now: DateTime<Utc>,
) -> GameResult<()>
where
    S: PlayerStore,
    R: Rng,
{
    let xp_gain = rng.random_range(5..=54);
    let swing: i64 = rng.random_range(-400..600);
    let delta = if swing > 0 {
        swing * i64::from(factor.max(1))
    } else {
        swing
    };
    store.update(bot_id, |bot| {
        bot.gain_xp(xp_gain);
        bot.apply_credit_delta(delta);
        if delta > 0 {
            bot.period_earnings.accumulate(delta as u64, now);
        }
        bot.last_active = now;
        debug!("ghost spin: {} ({delta:+} credits)", bot.username);
    })
}

/// Jump the bot to its next level boundary and pay the level bonus. The XP
/// is advanced too so the level stays derived from it.
fn simulate_level_up<S: PlayerStore>(
    store: &S,
    bus: &EventBus,
    bot_id: PlayerId,
    now: DateTime<Utc>,
) -> GameResult<()> {
    let (username, level) = store.update(bot_id, |bot| {
        let target = bot.level + 1;
        let needed = xp_for_level(target).saturating_sub(bot.xp);
        bot.gain_xp(needed);
        bot.credits = bot.credits.saturating_add(LEVEL_UP_CREDIT_BONUS);
        bot.last_active = now;
        (bot.username.clone(), bot.level)
    })?;
    info!("ghost level up: {username} reached level {level}");
    bus.emit(GameEvent::GhostLevelUp {
        username: username.clone(),
        level,
        message: format!(">> {username} reached Level {level}!"),
    });
    Ok(())
}

/// Fabricated jackpot, broadcast to make the server feel busy.
fn simulate_big_win<S, R>(
    store: &S,
    bus: &EventBus,
    bot_id: PlayerId,
    factor: u32,
    rng: &mut R,
    now: DateTime<Utc>,
) -> GameResult<()>
where
    S: PlayerStore,
    R: Rng,
{
    let (item, credits) = match rng.random_range(0..3) {
        0 => ("FlashHacker USB", rng.random_range(25_000..=120_000)),
        1 => ("DDoS Cannon", rng.random_range(2_000..=7_000)),
        _ => ("Diamond Jackpot", rng.random_range(5_000..=15_000)),
    };
    let credits = credits * u64::from(factor.max(1));
    let username = store.update(bot_id, |bot| {
        bot.credits = bot.credits.saturating_add(credits);
        bot.reputation = bot.reputation.saturating_add(50);
        bot.period_earnings.accumulate(credits, now);
        bot.last_active = now;
        bot.username.clone()
    })?;
    info!("ghost big win: {username} won {item} (+{credits})");
    bus.emit(GameEvent::GhostBigWin {
        username: username.clone(),
        item: item.to_string(),
        credits,
        message: format!(">> SERVER: {username} just hacked a [{item}]! (+{credits} credits)"),
    });
    Ok(())
}

/// The randomized-timer driver.
pub struct GhostEngine<S> {
    store: Arc<S>,
    bus: EventBus,
}

impl<S: PlayerStore + 'static> GhostEngine<S> {
    pub fn new(store: Arc<S>, bus: EventBus) -> Self {
        Self { store, bus }
    }

    pub async fn run(self) {
        let mut rng = StdRng::from_os_rng();
        info!("ghost engine started");
        loop {
            let factor = match activity_factor(&*self.store) {
                Ok(f) => f,
                Err(e) => {
                    warn!("ghost activity factor failed: {e}");
                    1
                }
            };
            let base = rng.random_range(TICK_DELAY_SECS.0..=TICK_DELAY_SECS.1);
            let delay = std::time::Duration::from_secs(base / u64::from(factor.max(1)));
            tokio::time::sleep(delay).await;
            match ghost_tick(&*self.store, &self.bus, factor, &mut rng, Utc::now()) {
                Ok(Some(action)) => debug!("ghost tick: {action:?}"),
                Ok(None) => debug!("ghost tick: no bots in store"),
                Err(e) => warn!("ghost tick failed: {e}"),
            }
        }
    }
}
