use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tournament::TournamentStatus;

/// All the errors that can occur when applying an operation to a tournament. Every variant is
/// raised before any mutation takes place, so an error always leaves the tournament exactly as it
/// was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TournamentError {
    /// The tournament's player limit has already been reached
    PlayerLimitReached,
    /// The operation isn't valid for the tournament's current status
    WrongStatus(TournamentStatus),
    /// There aren't enough registered players for the format to start
    NotEnoughPlayers {
        /// The minimum the format requires
        required: u32,
        /// How many are actually registered
        have: u32,
    },
    /// The specified player couldn't be found
    UnknownPlayer,
    /// The specified match couldn't be found
    UnknownMatch,
    /// A player with that id is already registered
    DuplicatePlayer,
    /// The specified player isn't one of the two slots in the specified match
    PlayerNotInMatch,
    /// The match has already been decided or isn't fillable yet
    MatchNotActive,
    /// An elimination result supplied the same number of wins for both slots
    EqualScoresInElimination,
    /// `eraseResult` was called on a match that has no result to erase
    NothingToErase,
    /// `eraseResult` (directly, or via `reportResult` re-reporting) was called on a bye; a bye
    /// isn't a contested result and can't be un-awarded
    EraseOnBye,
    /// A routing invariant was violated; this indicates a bug in the bracket construction or
    /// collapse logic, never a bad caller input
    RoutingInvariantViolated(&'static str),
}

impl fmt::Display for TournamentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use TournamentError::*;
        match self {
            PlayerLimitReached => write!(f, "player limit reached"),
            WrongStatus(status) => write!(f, "operation not valid while tournament is {status}"),
            NotEnoughPlayers { required, have } => {
                write!(f, "need at least {required} players, have {have}")
            }
            UnknownPlayer => write!(f, "unknown player"),
            UnknownMatch => write!(f, "unknown match"),
            DuplicatePlayer => write!(f, "a player with that id is already registered"),
            PlayerNotInMatch => write!(f, "player is not in that match"),
            MatchNotActive => write!(f, "match is not active"),
            EqualScoresInElimination => write!(f, "elimination matches cannot end in a tie"),
            NothingToErase => write!(f, "match has no result to erase"),
            EraseOnBye => write!(f, "cannot erase a bye"),
            RoutingInvariantViolated(msg) => write!(f, "routing invariant violated: {msg}"),
        }
    }
}

impl std::error::Error for TournamentError {}
