//! Leaderboard epoch scheduler
//!
//! A two-state machine: armed until the 2-hour deadline elapses, then one
//! evaluation pass, then re-armed. Evaluation ranks players by period
//! earnings, pays the top three a level-scaled random prize, and resets
//! every player's period — winners immediately on payout, everyone else at
//! the end of the pass, so earnings never carry into the next epoch.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{info, warn};
use rand::Rng;
use rand::rngs::StdRng;
use rand::SeedableRng;

use nh_core::{GameResult, PlayerId, epoch};
use nh_events::{EventBus, GameEvent};
use nh_store::PlayerStore;

/// Level scaling of the usable prize range: 0.25 at level 1 ramping to 1.0
/// by around level 50.
pub fn level_factor(level: u32) -> f64 {
    (0.25 + f64::from(level.max(1) - 1) * 0.015).clamp(0.25, 1.0)
}

/// Prize bracket for a rank, with the usable maximum scaled by the
/// winner's level factor.
pub fn prize_range(level: u32, rank: u32) -> (u64, u64) {
    let (min, max) = match rank {
        1 => (500_000u64, 2_500_000u64),
        2 => (250_000, 500_000),
        _ => (100_000, 250_000),
    };
    let usable_max = min + ((max - min) as f64 * level_factor(level)).floor() as u64;
    (min, usable_max.max(min))
}

/// One paid-out winner of an evaluation pass.
#[derive(Debug, Clone)]
pub struct Winner {
    pub id: PlayerId,
    pub username: String,
    pub rank: u32,
    pub earnings: u64,
    pub prize: u64,
}

/// One evaluation pass. Safe to trigger manually between scheduled runs;
/// an off-schedule pass simply closes the period early.
pub fn evaluate_period<S, R>(
    store: &S,
    bus: &EventBus,
    rng: &mut R,
    now: DateTime<Utc>,
) -> GameResult<Vec<Winner>>
where
    S: PlayerStore,
    R: Rng,
{
    let ids = store.player_ids();
    let mut ranked: Vec<(PlayerId, String, u32, u64)> = Vec::new();
    for id in &ids {
        let p = store.get(*id)?;
        if p.period_earnings.earnings > 0 {
            ranked.push((p.id, p.username, p.level, p.period_earnings.earnings));
        }
    }
    ranked.sort_by(|a, b| b.3.cmp(&a.3));

    let mut winners = Vec::new();
    for (i, (id, username, level, earnings)) in ranked.into_iter().take(3).enumerate() {
        let rank = (i + 1) as u32;
        let (min, max) = prize_range(level, rank);
        let prize = rng.random_range(min..=max);
        store.update(id, |p| {
            p.credits = p.credits.saturating_add(prize);
            p.period_earnings.reset(now);
        })?;
        info!("leaderboard: rank #{rank} {username} earned {earnings}, prize {prize}");
        bus.emit(GameEvent::LeaderboardWinner {
            username: username.clone(),
            rank,
            earnings,
            prize,
            message: format!(">> {username} takes rank #{rank}: +{prize} credits"),
        });
        winners.push(Winner {
            id,
            username,
            rank,
            earnings,
            prize,
        });
    }

    // Everyone starts the next epoch from zero, winners included.
    for id in ids {
        store.update(id, |p| p.period_earnings.reset(now))?;
    }
    Ok(winners)
}

/// The recurring 2-hour driver.
pub struct LeaderboardScheduler<S> {
    store: Arc<S>,
    bus: EventBus,
}

impl<S: PlayerStore + 'static> LeaderboardScheduler<S> {
    pub fn new(store: Arc<S>, bus: EventBus) -> Self {
        Self { store, bus }
    }

    pub async fn run(self) {
        let period = epoch()
            .to_std()
            .unwrap_or(std::time::Duration::from_secs(2 * 60 * 60));
        let mut rng = StdRng::from_os_rng();
        info!("leaderboard scheduler armed ({}s periods)", period.as_secs());
        loop {
            tokio::time::sleep(period).await;
            if let Err(e) = evaluate_period(&*self.store, &self.bus, &mut rng, Utc::now()) {
                warn!("leaderboard evaluation failed: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nh_core::Player;
    use nh_store::MemoryStore;

    fn earner(store: &MemoryStore, name: &str, earnings: u64, now: DateTime<Utc>) -> PlayerId {
        let mut p = Player::new(name, now);
        p.period_earnings.accumulate(earnings, now);
        let id = p.id;
        store.insert(p).unwrap();
        id
    }

    #[test]
    fn test_level_factor_bounds() {
        assert_eq!(level_factor(1), 0.25);
        assert!(level_factor(25) > 0.25 && level_factor(25) < 1.0);
        assert_eq!(level_factor(51), 1.0);
        assert_eq!(level_factor(200), 1.0);
    }

    #[test]
    fn test_prize_range_scales_with_level() {
        let (min_low, max_low) = prize_range(1, 1);
        let (min_high, max_high) = prize_range(60, 1);
        assert_eq!(min_low, 500_000);
        assert_eq!(min_high, 500_000);
        assert_eq!(max_low, 500_000 + 2_000_000 / 4);
        assert_eq!(max_high, 2_500_000);
        assert!(max_low < max_high);
    }

    #[test]
    fn test_evaluate_pays_top_three_and_resets_everyone() {
        let store = MemoryStore::new();
        let bus = EventBus::new();
        let now = Utc::now();
        let a = earner(&store, "first", 5_000, now);
        let b = earner(&store, "second", 3_000, now);
        let c = earner(&store, "third", 1_000, now);
        let d = earner(&store, "fourth", 500, now);
        let idle = earner(&store, "idle", 0, now);

        let mut rng = StdRng::seed_from_u64(3);
        let winners = evaluate_period(&store, &bus, &mut rng, now).unwrap();
        assert_eq!(winners.len(), 3);
        assert_eq!(winners[0].username, "first");
        assert_eq!(winners[0].rank, 1);
        assert_eq!(winners[2].username, "third");

        for (rank, w) in winners.iter().enumerate() {
            let (min, max) = prize_range(1, rank as u32 + 1);
            assert!((min..=max).contains(&w.prize));
        }

        let paid = store.get(a).unwrap();
        assert!(paid.credits > 1000);
        for id in [a, b, c, d, idle] {
            let p = store.get(id).unwrap();
            assert_eq!(p.period_earnings.earnings, 0);
            assert_eq!(p.period_earnings.period_start, now);
        }
        // Non-winner kept their balance
        assert_eq!(store.get(d).unwrap().credits, 1000);
    }

    #[test]
    fn test_evaluate_with_no_earnings_still_resets() {
        let store = MemoryStore::new();
        let bus = EventBus::new();
        let now = Utc::now();
        let id = earner(&store, "idle", 0, now);

        let mut rng = StdRng::seed_from_u64(3);
        let winners = evaluate_period(&store, &bus, &mut rng, now).unwrap();
        assert!(winners.is_empty());
        assert_eq!(store.get(id).unwrap().period_earnings.period_start, now);
        assert_eq!(store.get(id).unwrap().credits, 1000);
    }

    #[tokio::test]
    async fn test_winner_events_emitted() {
        let store = MemoryStore::new();
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        let now = Utc::now();
        earner(&store, "first", 5_000, now);

        let mut rng = StdRng::seed_from_u64(3);
        evaluate_period(&store, &bus, &mut rng, now).unwrap();
        match rx.recv().await.unwrap() {
            GameEvent::LeaderboardWinner { username, rank, .. } => {
                assert_eq!(username, "first");
                assert_eq!(rank, 1);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
