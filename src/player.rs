use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use crate::identifiers::PlayerId;
use crate::{identifiers::MatchId, tiebreakers::TiebreakerReport};

/// Whether a player is still eligible to be paired in future rounds
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, Copy)]
pub enum PlayerStatus {
    /// The player can still be paired
    Active,
    /// The player has withdrawn or been removed
    Withdrawn,
}

/// What a player got out of a single match
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, Copy)]
pub enum Outcome {
    /// The player won the match
    Win,
    /// The player lost the match
    Loss,
    /// The match was drawn
    Draw,
    /// The player received a pairing bye
    Bye,
}

/// One entry in a player's match history. Scoreboards are always the sum of these, so that
/// reporting then erasing a result is exactly reversible.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct MatchEntry {
    /// The match this entry came from
    pub match_id: MatchId,
    /// The round the match was played in
    pub round: u32,
    /// The opponent faced, or `None` for a bye
    pub opponent: Option<PlayerId>,
    /// Win, loss, draw, or bye
    pub outcome: Outcome,
    /// Match points earned from this single match
    pub match_points: f64,
    /// Game points earned from this single match
    pub game_points: f64,
    /// Games won in this match
    pub games_won: u32,
    /// Games lost in this match
    pub games_lost: u32,
    /// Games drawn in this match
    pub draws: u32,
}

/// A registered competitor and their running scoreboard.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Player {
    /// The player's id
    pub id: PlayerId,
    /// Display name
    pub alias: String,
    /// Seed used for initial sorting and bracket placement; 0 means unseeded
    pub seed: u32,
    /// Byes pre-awarded to the player before the event started (Swiss only)
    pub initial_byes: u32,
    /// Number of matches played, including byes
    pub match_count: u32,
    /// Total match points earned
    pub match_points: f64,
    /// Number of games played
    pub game_count: u32,
    /// Total game points earned
    pub game_points: f64,
    /// Whether the player is still eligible for future pairing
    pub status: PlayerStatus,
    /// Whether the player has already received a pairing bye this event
    pub pairing_bye: bool,
    /// Ordered per-match history
    pub results: Vec<MatchEntry>,
    /// Tiebreaker statistics, recomputed before every call to `standings`
    pub tiebreakers: TiebreakerReport,
}

impl Player {
    /// Creates a new, unseeded player
    pub fn new(alias: String) -> Self {
        Player {
            id: PlayerId::new(Uuid::new_v4()),
            alias,
            seed: 0,
            initial_byes: 0,
            match_count: 0,
            match_points: 0.0,
            game_count: 0,
            game_points: 0.0,
            status: PlayerStatus::Active,
            pairing_bye: false,
            results: Vec::new(),
            tiebreakers: TiebreakerReport::default(),
        }
    }

    /// Whether the player can still be paired into future matches
    pub fn can_play(&self) -> bool {
        self.status == PlayerStatus::Active
    }

    /// Appends a result entry and folds it into the running scoreboard
    pub fn record_result(&mut self, entry: MatchEntry) {
        self.match_count += 1;
        self.match_points += entry.match_points;
        self.game_count += entry.games_won + entry.games_lost + entry.draws;
        self.game_points += entry.game_points;
        if entry.outcome == Outcome::Bye {
            self.pairing_bye = true;
        }
        self.results.push(entry);
    }

    /// Removes the most recent result entry matching `match_id` and reverses its effect on the
    /// scoreboard. Returns the removed entry, if any.
    pub fn erase_result(&mut self, match_id: MatchId) -> Option<MatchEntry> {
        let idx = self.results.iter().position(|e| e.match_id == match_id)?;
        let entry = self.results.remove(idx);
        self.match_count -= 1;
        self.match_points -= entry.match_points;
        self.game_count -= entry.games_won + entry.games_lost + entry.draws;
        self.game_points -= entry.game_points;
        if entry.outcome == Outcome::Bye {
            self.pairing_bye = self.results.iter().any(|e| e.outcome == Outcome::Bye);
        }
        Some(entry)
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.alias)
    }
}

impl fmt::Display for PlayerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerStatus::Active => write!(f, "active"),
            PlayerStatus::Withdrawn => write!(f, "withdrawn"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(match_id: MatchId, outcome: Outcome, mp: f64, gw: u32, gl: u32) -> MatchEntry {
        MatchEntry {
            match_id,
            round: 1,
            opponent: None,
            outcome,
            match_points: mp,
            game_points: gw as f64,
            games_won: gw,
            games_lost: gl,
            draws: 0,
        }
    }

    #[test]
    fn record_then_erase_is_a_no_op() {
        let mut p = Player::new("Alice".into());
        let before = p.clone();
        let m = MatchId::new(Uuid::new_v4());
        p.record_result(entry(m, Outcome::Win, 1.0, 2, 0));
        assert_eq!(p.match_count, 1);
        assert_eq!(p.match_points, 1.0);
        let erased = p.erase_result(m).unwrap();
        assert_eq!(erased.match_id, m);
        assert_eq!(p.match_count, before.match_count);
        assert_eq!(p.match_points, before.match_points);
        assert_eq!(p.game_count, before.game_count);
        assert_eq!(p.results, before.results);
    }

    #[test]
    fn bye_flag_tracks_history() {
        let mut p = Player::new("Bob".into());
        let m = MatchId::new(Uuid::new_v4());
        p.record_result(entry(m, Outcome::Bye, 1.0, 0, 0));
        assert!(p.pairing_bye);
        p.erase_result(m);
        assert!(!p.pairing_bye);
    }
}
