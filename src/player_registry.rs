use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
    error::TournamentError,
    identifiers::{IdSource, PlayerId},
    player::{Player, PlayerStatus},
};

/// Owns every player that has ever been part of the tournament, keyed by id. Players are never
/// removed from this map, even on withdrawal, so that past matches can still resolve their
/// participants' aliases.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct PlayerRegistry {
    players: HashMap<PlayerId, Player>,
}

impl PlayerRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self { players: HashMap::new() }
    }

    /// Registers a new player under a freshly minted id, regenerating on the (astronomically
    /// unlikely) event of a collision
    pub fn register(&mut self, alias: String, ids: &mut impl IdSource<Player>) -> PlayerId {
        loop {
            let id = ids.next_id();
            if !self.players.contains_key(&id) {
                let mut player = Player::new(alias);
                player.id = id;
                self.players.insert(id, player);
                return id;
            }
        }
    }

    /// Number of players ever registered, regardless of status
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Whether any player has ever been registered
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Number of players still eligible for future pairing
    pub fn active_count(&self) -> usize {
        self.players.values().filter(|p| p.can_play()).count()
    }

    /// Looks up a player by id
    pub fn get(&self, id: PlayerId) -> Result<&Player, TournamentError> {
        self.players.get(&id).ok_or(TournamentError::UnknownPlayer)
    }

    /// Looks up a player by id, mutably
    pub fn get_mut(&mut self, id: PlayerId) -> Result<&mut Player, TournamentError> {
        self.players.get_mut(&id).ok_or(TournamentError::UnknownPlayer)
    }

    /// All players, in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    /// All currently-active players, in arbitrary order
    pub fn active_iter(&self) -> impl Iterator<Item = &Player> {
        self.players.values().filter(|p| p.can_play())
    }

    /// Marks a player withdrawn; their record and history are kept
    pub fn withdraw(&mut self, id: PlayerId) -> Result<(), TournamentError> {
        self.get_mut(id)?.status = PlayerStatus::Withdrawn;
        Ok(())
    }

    /// Snapshots every player, cloned and in arbitrary order, for the controller to sort and hand
    /// back from `standings`
    pub fn snapshot(&self) -> Vec<Player> {
        self.players.values().cloned().collect()
    }

    /// Writes back a full snapshot after tiebreakers have been recomputed on it
    pub fn restore(&mut self, snapshot: Vec<Player>) {
        for player in snapshot {
            self.players.insert(player.id, player);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifiers::UuidSource;

    #[test]
    fn register_assigns_unique_ids() {
        let mut registry = PlayerRegistry::new();
        let mut ids = UuidSource;
        let a = registry.register("Alice".into(), &mut ids);
        let b = registry.register("Bob".into(), &mut ids);
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.active_count(), 2);
    }

    #[test]
    fn withdraw_keeps_the_record_but_drops_eligibility() {
        let mut registry = PlayerRegistry::new();
        let mut ids = UuidSource;
        let a = registry.register("Alice".into(), &mut ids);
        registry.withdraw(a).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.active_count(), 0);
        assert!(registry.get(a).is_ok());
    }
}
