//! # nh-store — Player store boundary
//!
//! The engine treats persistence as an external collaborator reached through
//! [`PlayerStore`]. Each economic mutation is a single read-modify-write
//! against one player record; that update call is the atomicity boundary.
//!
//! [`MemoryStore`] is the in-process implementation: a map of per-player
//! locks, so concurrent spins by different players never contend while a
//! double-submitting player's mutations serialize instead of losing updates.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use nh_core::{GameError, GameResult, Player, PlayerId};

/// Store boundary for player records.
///
/// `update` runs the closure under the per-record lock; a failure before the
/// call leaves no partial mutation visible.
pub trait PlayerStore: Send + Sync {
    fn get(&self, id: PlayerId) -> GameResult<Player>;

    fn insert(&self, player: Player) -> GameResult<()>;

    /// Atomic read-modify-write of one player record.
    fn update<T>(&self, id: PlayerId, f: impl FnOnce(&mut Player) -> T) -> GameResult<T>
    where
        Self: Sized;

    fn player_ids(&self) -> Vec<PlayerId>;

    fn find_by_username(&self, username: &str) -> Option<Player>;
}

/// In-memory player store with one lock per record.
#[derive(Default)]
pub struct MemoryStore {
    players: RwLock<HashMap<PlayerId, Arc<Mutex<Player>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, id: PlayerId) -> GameResult<Arc<Mutex<Player>>> {
        self.players
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| GameError::NotFound(format!("player {id}")))
    }

    pub fn len(&self) -> usize {
        self.players.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.read().is_empty()
    }
}

impl PlayerStore for MemoryStore {
    fn get(&self, id: PlayerId) -> GameResult<Player> {
        Ok(self.slot(id)?.lock().clone())
    }

    fn insert(&self, player: Player) -> GameResult<()> {
        let mut map = self.players.write();
        if map.values().any(|p| p.lock().username == player.username) {
            return Err(GameError::InvalidState(format!(
                "username {} already taken",
                player.username
            )));
        }
        map.insert(player.id, Arc::new(Mutex::new(player)));
        Ok(())
    }

    fn update<T>(&self, id: PlayerId, f: impl FnOnce(&mut Player) -> T) -> GameResult<T> {
        let slot = self.slot(id)?;
        let mut player = slot.lock();
        Ok(f(&mut player))
    }

    fn player_ids(&self) -> Vec<PlayerId> {
        self.players.read().keys().copied().collect()
    }

    fn find_by_username(&self, username: &str) -> Option<Player> {
        self.players
            .read()
            .values()
            .map(|slot| slot.lock())
            .find(|p| p.username == username)
            .map(|p| p.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_insert_get_roundtrip() {
        let store = MemoryStore::new();
        let p = Player::new("neo", Utc::now());
        let id = p.id;
        store.insert(p).unwrap();

        let loaded = store.get(id).unwrap();
        assert_eq!(loaded.username, "neo");
        assert!(store.get(PlayerId::new_v4()).is_err());
    }

    #[test]
    fn test_duplicate_username_rejected() {
        let store = MemoryStore::new();
        store.insert(Player::new("neo", Utc::now())).unwrap();
        assert!(store.insert(Player::new("neo", Utc::now())).is_err());
    }

    #[test]
    fn test_update_is_read_modify_write() {
        let store = MemoryStore::new();
        let p = Player::new("trinity", Utc::now());
        let id = p.id;
        store.insert(p).unwrap();

        let after = store
            .update(id, |p| {
                p.credits += 500;
                p.credits
            })
            .unwrap();
        assert_eq!(after, 1500);
        assert_eq!(store.get(id).unwrap().credits, 1500);
    }

    #[test]
    fn test_concurrent_updates_do_not_lose_writes() {
        let store = Arc::new(MemoryStore::new());
        let p = Player::new("tank", Utc::now());
        let id = p.id;
        store.insert(p).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        store.update(id, |p| p.credits += 1).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(
            store.get(id).unwrap().credits,
            nh_core::STARTING_CREDITS + 800
        );
    }
}
