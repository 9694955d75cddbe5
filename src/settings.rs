use core::fmt;

use serde::{Deserialize, Serialize};

use crate::tiebreakers::Tiebreaker;

/// Which bracket/schedule shape a tournament is running
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Single-elimination bracket
    SingleElimination,
    /// Double-elimination bracket
    DoubleElimination,
    /// Swiss rounds
    Swiss,
    /// Single round-robin
    RoundRobin,
    /// Double round-robin
    DoubleRoundRobin,
}

/// What happens to a late-arriving player's already-missed Swiss rounds
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatchUpPolicy {
    /// Award a win for each missed round
    Byes,
    /// Award nothing for each missed round, but count the games as played
    Losses,
}

/// Whether, and how, the field is cut before an elimination playoff stage
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub enum Cut {
    /// No cut; everyone advances
    None,
    /// Keep the top `limit` players by standing
    Rank {
        /// How many players survive the cut
        limit: u32,
    },
    /// Keep every player with at least `limit` match points
    Points {
        /// The match-point threshold to survive the cut
        limit: f64,
    },
}

/// How seeds are sorted immediately before `start` builds the first round/bracket
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedSorting {
    /// Leave registration order as-is
    None,
    /// Lowest seed number first
    Ascending,
    /// Highest seed number first
    Descending,
}

/// Full configuration for a tournament, fixed at `start` apart from the deltas in
/// `TournamentSetting`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TournamentConfig {
    /// The bracket/schedule shape
    pub format: Format,
    /// Seed sorting applied at `start`
    pub sorting: SeedSorting,
    /// Whether an elimination stage awards a third-place match
    pub consolation: bool,
    /// Maximum registered players; 0 = unbounded
    pub player_limit: u32,
    /// Match points awarded for a win
    pub points_for_win: f64,
    /// Match points awarded for a draw
    pub points_for_draw: f64,
    /// Swiss round count; 0 = auto = ceil(log2(n))
    pub rounds: u32,
    /// Optional elimination playoff stage appended after Swiss/round-robin
    pub playoffs: Option<Format>,
    /// Games per match; used only to compute forfeit scores
    pub best_of: u32,
    /// How the field is cut before playoffs
    pub cut: Cut,
    /// Tiebreaker precedence, most significant first
    pub tiebreakers: Vec<Tiebreaker>,
    /// How late Swiss arrivals are credited for rounds they missed
    pub catch_up: CatchUpPolicy,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        TournamentConfig {
            format: Format::Swiss,
            sorting: SeedSorting::None,
            consolation: false,
            player_limit: 0,
            points_for_win: 1.0,
            points_for_draw: 0.5,
            rounds: 0,
            playoffs: None,
            best_of: 3,
            cut: Cut::None,
            tiebreakers: vec![
                Tiebreaker::OpponentMatchWinPercent,
                Tiebreaker::GameWinPercent,
                Tiebreaker::OpponentGameWinPercent,
            ],
            catch_up: CatchUpPolicy::Losses,
        }
    }
}

/// A single configuration change applied after construction, mirroring the fields of
/// `TournamentConfig`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum TournamentSetting {
    /// Change the seed sorting rule
    Sorting(SeedSorting),
    /// Turn the elimination third-place match on or off
    Consolation(bool),
    /// Change the player cap
    PlayerLimit(u32),
    /// Change the win-points value
    PointsForWin(f64),
    /// Change the draw-points value
    PointsForDraw(f64),
    /// Change the configured Swiss round count
    Rounds(u32),
    /// Change the playoff format
    Playoffs(Option<Format>),
    /// Change the best-of count
    BestOf(u32),
    /// Change the cut rule
    Cut(Cut),
    /// Replace the tiebreaker precedence list
    Tiebreakers(Vec<Tiebreaker>),
    /// Change the late-arrival catch-up policy
    CatchUp(CatchUpPolicy),
}

impl TournamentConfig {
    /// Applies a single setting delta
    pub fn apply(&mut self, setting: TournamentSetting) {
        use TournamentSetting::*;
        match setting {
            Sorting(s) => self.sorting = s,
            Consolation(b) => self.consolation = b,
            PlayerLimit(n) => self.player_limit = n,
            PointsForWin(p) => self.points_for_win = p,
            PointsForDraw(p) => self.points_for_draw = p,
            Rounds(n) => self.rounds = n,
            Playoffs(f) => self.playoffs = f,
            BestOf(n) => self.best_of = n,
            Cut(c) => self.cut = c,
            Tiebreakers(ts) => self.tiebreakers = ts,
            CatchUp(p) => self.catch_up = p,
        }
    }

    /// Game-wins needed to win a forfeited match outright: `ceil(best_of / 2)`
    pub fn forfeit_wins(&self) -> u32 {
        (self.best_of + 1) / 2
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Format::SingleElimination => "single elimination",
            Format::DoubleElimination => "double elimination",
            Format::Swiss => "swiss",
            Format::RoundRobin => "round robin",
            Format::DoubleRoundRobin => "double round robin",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forfeit_wins_rounds_up() {
        let mut cfg = TournamentConfig::default();
        cfg.best_of = 3;
        assert_eq!(cfg.forfeit_wins(), 2);
        cfg.best_of = 5;
        assert_eq!(cfg.forfeit_wins(), 3);
    }

    #[test]
    fn apply_replaces_a_single_field() {
        let mut cfg = TournamentConfig::default();
        cfg.apply(TournamentSetting::PointsForWin(3.0));
        assert_eq!(cfg.points_for_win, 3.0);
        assert_eq!(cfg.points_for_draw, 0.5);
    }
}
