//! NetHeist engine CLI
//!
//! Usage:
//!   netheist simulate         - Run a batch of spins and print stats
//!   netheist attack           - Resolve one demo attack
//!   netheist evaluate         - Simulate a population and close an epoch
//!   netheist serve            - Run the background services until Ctrl-C

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;

use nh_core::Player;
use nh_events::EventBus;
use nh_market::MarketBoard;
use nh_pvp::{AttackInput, resolve_attack};
use nh_services::ghost::spawn_ghost_army;
use nh_services::leaderboard::evaluate_period;
use nh_services::{BotBuyer, EconomyBot, GhostEngine, LeaderboardScheduler, MarketCleaner};
use nh_slots::{SpinEngine, SpinResult};
use nh_store::{MemoryStore, PlayerStore};

#[derive(Parser)]
#[command(name = "netheist", about = "NetHeist reward engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a batch of spins for one player and print aggregate stats
    Simulate {
        /// Number of spins to attempt
        #[arg(short, long, default_value_t = 1000)]
        spins: u32,
        /// Starting credit balance
        #[arg(short, long, default_value_t = 1_000_000)]
        credits: u64,
        /// RNG seed for a reproducible run
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Resolve one attack between two demo players
    Attack {
        /// Mini-game score fed into the attack (clamped to 0-100)
        #[arg(short, long, default_value_t = 50)]
        mini_game_score: u32,
        /// Target level
        #[arg(short, long, default_value_t = 3)]
        target_level: u32,
        /// RNG seed for a reproducible roll
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Simulate a ghost population, then close the leaderboard epoch now
    Evaluate {
        /// Number of ghost accounts
        #[arg(short, long, default_value_t = 20)]
        ghosts: usize,
        /// Ghost activity ticks before evaluating
        #[arg(short, long, default_value_t = 100)]
        ticks: u32,
        /// RNG seed for a reproducible run
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Run the leaderboard, ghost, economy, and market services
    Serve {
        /// Number of ghost accounts to seed
        #[arg(short, long, default_value_t = 50)]
        ghosts: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            spins,
            credits,
            seed,
        } => simulate(spins, credits, seed),
        Commands::Attack {
            mini_game_score,
            target_level,
            seed,
        } => attack(mini_game_score, target_level, seed),
        Commands::Evaluate {
            ghosts,
            ticks,
            seed,
        } => evaluate(ghosts, ticks, seed),
        Commands::Serve { ghosts } => serve(ghosts).await,
    }
}

fn rng_from(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    }
}

fn simulate(spins: u32, credits: u64, seed: Option<u64>) -> Result<()> {
    let mut engine = match seed {
        Some(s) => SpinEngine::seeded(s),
        None => SpinEngine::new(),
    };
    let store = MemoryStore::new();
    let now = Utc::now();
    let mut player = Player::new("simulant", now);
    player.credits = credits;
    let id = player.id;
    store.insert(player).context("seeding player")?;

    let (mut wins, mut losses, mut penalties, mut items) = (0u32, 0u32, 0u32, 0u32);
    let (mut spent, mut won) = (0u64, 0u64);
    let mut executed = 0u32;
    for _ in 0..spins {
        let snapshot = store.get(id)?;
        let outcome = match engine.spin(&snapshot, now) {
            Ok(o) => o,
            Err(e) => {
                info!("stopping: {e}");
                break;
            }
        };
        store.update(id, |p| outcome.apply(p, now))?;
        executed += 1;
        spent += outcome.spin_cost;
        match outcome.result {
            SpinResult::Loss { .. } => losses += 1,
            SpinResult::Penalty { .. } => penalties += 1,
            SpinResult::Money { amount, .. } => {
                wins += 1;
                won += amount;
            }
            SpinResult::Item { bonus_credits, .. } => {
                items += 1;
                won += bonus_credits;
            }
        }
    }

    let final_state = store.get(id)?;
    println!("spins executed:  {executed}");
    println!("money wins:      {wins}");
    println!("item wins:       {items}");
    println!("penalties:       {penalties}");
    println!("losses:          {losses}");
    println!("credits spent:   {spent}");
    println!("credits won:     {won}");
    println!(
        "final: level {} | {} credits | {} xp | {} items",
        final_state.level,
        final_state.credits,
        final_state.xp,
        final_state.inventory.len()
    );
    Ok(())
}

fn attack(mini_game_score: u32, target_level: u32, seed: Option<u64>) -> Result<()> {
    let mut rng = rng_from(seed);
    let now = Utc::now();
    let mut attacker = Player::new("attacker", now);
    let mut target = Player::new("target", now);
    target.credits = 10_000;
    target.gems = 50;
    target.gain_xp(nh_core::xp_for_level(target_level));

    let input = AttackInput {
        loadout: None,
        mini_game_score,
    };
    let resolution = resolve_attack(&attacker, &target, &input, now, &mut rng)?;
    resolution.apply_to_attacker(&mut attacker);
    resolution.apply_to_target(&mut target);

    println!("{}", serde_json::to_string_pretty(&resolution)?);
    println!(
        "attacker: {} credits, {} gems, {} rep",
        attacker.credits, attacker.gems, attacker.reputation
    );
    println!(
        "target:   {} credits, {} gems, {} rep",
        target.credits, target.gems, target.reputation
    );
    Ok(())
}

fn evaluate(ghosts: usize, ticks: u32, seed: Option<u64>) -> Result<()> {
    let mut rng = rng_from(seed);
    let store = MemoryStore::new();
    let bus = EventBus::new();
    let now = Utc::now();
    spawn_ghost_army(&store, ghosts, &mut rng, now);
    for _ in 0..ticks {
        nh_services::ghost::ghost_tick(&store, &bus, 1, &mut rng, now)?;
    }

    let winners = evaluate_period(&store, &bus, &mut rng, now)?;
    if winners.is_empty() {
        println!("no positive earnings this period");
    }
    for w in winners {
        println!(
            "rank #{}: {} earned {} -> prize {}",
            w.rank, w.username, w.earnings, w.prize
        );
    }
    Ok(())
}

async fn serve(ghosts: usize) -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let board = Arc::new(MarketBoard::new());
    let bus = EventBus::new();
    let mut rng = StdRng::from_os_rng();
    spawn_ghost_army(&*store, ghosts, &mut rng, Utc::now());

    tokio::spawn(LeaderboardScheduler::new(Arc::clone(&store), bus.clone()).run());
    tokio::spawn(GhostEngine::new(Arc::clone(&store), bus.clone()).run());
    tokio::spawn(EconomyBot::new(Arc::clone(&board)).run());
    tokio::spawn(BotBuyer::new(Arc::clone(&board), Arc::clone(&store), bus.clone()).run());
    tokio::spawn(MarketCleaner::new(Arc::clone(&board), Arc::clone(&store), bus.clone()).run());

    // Mirror the event stream into the log
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = rx.recv().await {
            info!("event: {event:?}");
        }
    });

    info!("services running ({ghosts} ghosts); Ctrl-C to stop");
    tokio::signal::ctrl_c().await.context("waiting for Ctrl-C")?;
    info!("shutting down");
    Ok(())
}
