use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use crate::identifiers::MatchId;
use crate::identifiers::PlayerId;

/// The raw game-win tally reported for a match
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchResult {
    /// Games won by `player_one`
    pub player_one_wins: u32,
    /// Games won by `player_two`
    pub player_two_wins: u32,
    /// Games that were drawn
    pub draws: u32,
}

impl MatchResult {
    /// Builds a result, used by the standard (non-elimination) reporting path
    pub fn new(player_one_wins: u32, player_two_wins: u32, draws: u32) -> Self {
        Self {
            player_one_wins,
            player_two_wins,
            draws,
        }
    }
}

/// Two player slots playing out a single game (or several games) against each other, a round
/// number, a recorded result, and, for elimination formats, the two edges the winner and loser
/// advance along.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// The match's id
    pub id: MatchId,
    /// The round the match belongs to
    pub round: u32,
    /// Ordinal position within the round; 0 when the format doesn't track it
    pub match_number: u32,
    /// The first player slot
    pub player_one: Option<PlayerId>,
    /// The second player slot. `None` here (with `player_one` filled) is a bye; both `None` is a
    /// reserved placeholder used while building a round-robin schedule.
    pub player_two: Option<PlayerId>,
    /// Whether the match is awaiting a result. A match is active iff both slots are filled and no
    /// result has been recorded for it yet, except that round-robin delays activation of future
    /// rounds until the controller advances into them.
    pub active: bool,
    /// The recorded result, if any
    pub result: Option<MatchResultRecord>,
    /// Where the winner advances to in an elimination bracket; `None` means this match, if it is
    /// the tournament's designated decider, ends the tournament when won
    pub winners_path: Option<MatchId>,
    /// Where the loser advances to in a double-elimination bracket; `None` means the loser is
    /// simply eliminated
    pub losers_path: Option<MatchId>,
    /// Set when a withdrawal collapse has bypassed this match entirely; a voided match is never
    /// played and never counts toward "any match still active"
    pub voided: bool,
}

/// A recorded result together with which outcome each slot got, so erasing a result doesn't need
/// to re-derive win/loss/draw from the raw score.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchResultRecord {
    /// The raw game tally
    pub score: MatchResult,
}

impl Match {
    /// Creates a new, empty match
    pub fn new(round: u32, match_number: u32) -> Self {
        Match {
            id: MatchId::new(Uuid::new_v4()),
            round,
            match_number,
            player_one: None,
            player_two: None,
            active: false,
            result: None,
            winners_path: None,
            losers_path: None,
            voided: false,
        }
    }

    /// A bye is a match with exactly one filled slot
    pub fn is_bye(&self) -> bool {
        self.player_one.is_some() != self.player_two.is_some()
    }

    /// A reserved placeholder used only transiently while a round-robin schedule is built
    pub fn is_placeholder(&self) -> bool {
        self.player_one.is_none() && self.player_two.is_none()
    }

    /// Whether the match currently has a recorded result
    pub fn is_decided(&self) -> bool {
        self.result.is_some()
    }

    /// The present player in a bye match
    pub fn bye_recipient(&self) -> Option<PlayerId> {
        self.is_bye().then(|| self.player_one.or(self.player_two)).flatten()
    }

    /// Returns the two participants, in slot order, skipping empty slots
    pub fn participants(&self) -> impl Iterator<Item = PlayerId> {
        [self.player_one, self.player_two].into_iter().flatten()
    }

    /// Fills the first empty slot with `player`, activating the match once both are filled.
    /// Returns `false` if both slots were already occupied.
    pub fn fill_next_slot(&mut self, player: PlayerId) -> bool {
        if self.player_one.is_none() {
            self.player_one = Some(player);
        } else if self.player_two.is_none() {
            self.player_two = Some(player);
        } else {
            return false;
        }
        self.active = self.player_one.is_some() && self.player_two.is_some() && self.result.is_none();
        true
    }

    /// Clears whichever slot holds `player`. Used by erase/withdrawal rewiring.
    pub fn clear_slot(&mut self, player: PlayerId) {
        if self.player_one == Some(player) {
            self.player_one = None;
        } else if self.player_two == Some(player) {
            self.player_two = None;
        }
        self.active = false;
    }
}
