use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::{
    error::TournamentError,
    identifiers::{IdSource, MatchId, PlayerId},
    matches::Match,
};

/// Owns every match in the tournament, keyed by id, plus the opponent-history set used by Swiss
/// pairing to avoid rematches.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct MatchRegistry {
    matches: HashMap<MatchId, Match>,
    /// Which players each player has already faced (byes are not recorded here, since a bye has
    /// no opponent to avoid repeating)
    opponents: HashMap<PlayerId, HashSet<PlayerId>>,
}

impl MatchRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self {
            matches: HashMap::new(),
            opponents: HashMap::new(),
        }
    }

    /// Inserts an already-constructed match (used by the pairing/bracket builders, which mint
    /// their own ids up front so routing edges can reference each other)
    pub fn insert(&mut self, m: Match) {
        self.matches.insert(m.id, m);
    }

    /// Builds and inserts a fresh, empty match for `round`/`match_number`, returning its id
    pub fn create(&mut self, round: u32, match_number: u32, ids: &mut impl IdSource<Match>) -> MatchId {
        loop {
            let id = ids.next_id();
            if !self.matches.contains_key(&id) {
                let mut m = Match::new(round, match_number);
                m.id = id;
                self.matches.insert(id, m);
                return id;
            }
        }
    }

    /// Looks up a match by id
    pub fn get(&self, id: MatchId) -> Result<&Match, TournamentError> {
        self.matches.get(&id).ok_or(TournamentError::UnknownMatch)
    }

    /// Looks up a match by id, mutably
    pub fn get_mut(&mut self, id: MatchId) -> Result<&mut Match, TournamentError> {
        self.matches.get_mut(&id).ok_or(TournamentError::UnknownMatch)
    }

    /// All matches, in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = &Match> {
        self.matches.values()
    }

    /// All matches scheduled for `round`
    pub fn round(&self, round: u32) -> impl Iterator<Item = &Match> {
        self.matches.values().filter(move |m| m.round == round)
    }

    /// All matches scheduled for `round`, mutably
    pub fn round_mut(&mut self, round: u32) -> impl Iterator<Item = &mut Match> {
        self.matches.values_mut().filter(move |m| m.round == round)
    }

    /// Whether any match is currently active
    pub fn has_active(&self) -> bool {
        self.matches.values().any(|m| m.active)
    }

    /// Records that `a` and `b` have now played each other, for future rematch avoidance
    pub fn record_opponents(&mut self, a: PlayerId, b: PlayerId) {
        self.opponents.entry(a).or_default().insert(b);
        self.opponents.entry(b).or_default().insert(a);
    }

    /// Undoes `record_opponents`, used when a result is erased
    pub fn forget_opponents(&mut self, a: PlayerId, b: PlayerId) {
        if let Some(set) = self.opponents.get_mut(&a) {
            set.remove(&b);
        }
        if let Some(set) = self.opponents.get_mut(&b) {
            set.remove(&a);
        }
    }

    /// Whether `a` and `b` have already played
    pub fn have_played(&self, a: PlayerId, b: PlayerId) -> bool {
        self.opponents.get(&a).is_some_and(|set| set.contains(&b))
    }

    /// The full opponent-history map, for pairing algorithms that need to see it directly
    pub fn opponents(&self) -> &HashMap<PlayerId, HashSet<PlayerId>> {
        &self.opponents
    }

    /// Clears `player` out of every scheduled match after `after_round`, used when a
    /// double-round-robin player withdraws mid-event
    pub fn clear_future_slots(&mut self, after_round: u32, player: PlayerId) {
        for m in self.matches.values_mut().filter(|m| m.round > after_round) {
            m.clear_slot(player);
        }
    }

    /// The set of finished-match source ids that feed `target`'s slots, via either routing edge.
    /// Used by withdrawal collapse to find the other upstream match feeding an orphaned node.
    pub fn sources_feeding(&self, target: MatchId) -> Vec<MatchId> {
        self.matches
            .values()
            .filter(|m| m.winners_path == Some(target) || m.losers_path == Some(target))
            .map(|m| m.id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifiers::UuidSource;
    use uuid::Uuid;

    #[test]
    fn create_assigns_unique_ids_and_preserves_round() {
        let mut reg = MatchRegistry::new();
        let mut ids = UuidSource;
        let a = reg.create(1, 0, &mut ids);
        let b = reg.create(1, 1, &mut ids);
        assert_ne!(a, b);
        assert_eq!(reg.round(1).count(), 2);
    }

    #[test]
    fn opponent_history_is_symmetric_and_reversible() {
        let mut reg = MatchRegistry::new();
        let a: PlayerId = Uuid::new_v4().into();
        let b: PlayerId = Uuid::new_v4().into();
        reg.record_opponents(a, b);
        assert!(reg.have_played(a, b));
        assert!(reg.have_played(b, a));
        reg.forget_opponents(a, b);
        assert!(!reg.have_played(a, b));
    }
}
