use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{
    identifiers::{MatchId, PlayerId},
    player::Player,
};

/// The floor applied to every percentage-based statistic, per spec, to dampen outliers produced
/// by very short histories.
const MIN_PERCENT: f64 = 1.0 / 3.0;

/// The nine statistics, in the order a tournament's configured precedence list picks from.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tiebreaker {
    /// `gamePoints / (gameCount * pointsForWin)`, floored
    GameWinPercent,
    /// `matchPoints / (matchCount * pointsForWin)`, floored
    MatchWinPercent,
    /// Mean of opponents' match win %, each computed with the match against this player removed
    OpponentMatchWinPercent,
    /// Mean of opponents' game win %
    OpponentGameWinPercent,
    /// Mean over opponents of their own opponent match win %
    OpponentOpponentMatchWinPercent,
    /// Sum of opponents' match points
    Solkoff,
    /// Solkoff minus the single highest and single lowest opponent match-point totals
    MedianBuchholz,
    /// Sum over results of opponent match points weighted win=1, draw=1/2, loss=0
    SonnebornBerger,
    /// Sum of the running match-point total after each of the player's own rounds
    Cumulative,
}

/// All nine computed statistics for one player, plus the opponent-cumulative variant the spec
/// asks to keep alongside cumulative.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct TiebreakerReport {
    /// Game win %
    pub game_win_percent: f64,
    /// Match win %
    pub match_win_percent: f64,
    /// Opponent match win %
    pub opponent_match_win_percent: f64,
    /// Opponent game win %
    pub opponent_game_win_percent: f64,
    /// Opponent-opponent match win %
    pub opponent_opponent_match_win_percent: f64,
    /// Solkoff
    pub solkoff: f64,
    /// Median Buchholz
    pub median_buchholz: f64,
    /// Sonneborn-Berger
    pub sonneborn_berger: f64,
    /// Cumulative
    pub cumulative: f64,
    /// Sum of opponents' cumulative values
    pub opponent_cumulative: f64,
}

impl TiebreakerReport {
    /// Looks up a single statistic by its `Tiebreaker` discriminant, for use by `sort`'s
    /// configurable precedence list.
    pub fn value(&self, tb: Tiebreaker) -> f64 {
        match tb {
            Tiebreaker::GameWinPercent => self.game_win_percent,
            Tiebreaker::MatchWinPercent => self.match_win_percent,
            Tiebreaker::OpponentMatchWinPercent => self.opponent_match_win_percent,
            Tiebreaker::OpponentGameWinPercent => self.opponent_game_win_percent,
            Tiebreaker::OpponentOpponentMatchWinPercent => self.opponent_opponent_match_win_percent,
            Tiebreaker::Solkoff => self.solkoff,
            Tiebreaker::MedianBuchholz => self.median_buchholz,
            Tiebreaker::SonnebornBerger => self.sonneborn_berger,
            Tiebreaker::Cumulative => self.cumulative,
        }
    }
}

fn percent(points: f64, count: u32, points_for_win: f64) -> f64 {
    if count == 0 || points_for_win <= 0.0 {
        return MIN_PERCENT;
    }
    (points / (count as f64 * points_for_win)).max(MIN_PERCENT)
}

fn match_win_percent_excluding(player: &Player, exclude: MatchId, points_for_win: f64) -> f64 {
    let mut points = player.match_points;
    let mut count = player.match_count;
    if let Some(entry) = player.results.iter().find(|e| e.match_id == exclude) {
        points -= entry.match_points;
        count = count.saturating_sub(1);
    }
    percent(points, count, points_for_win)
}

fn outcome_weight(outcome: crate::player::Outcome) -> f64 {
    use crate::player::Outcome::*;
    match outcome {
        Win | Bye => 1.0,
        Draw => 0.5,
        Loss => 0.0,
    }
}

/// Recomputes every player's `tiebreakers` record from their current scoreboards and history.
/// Run this freshly before every `standings()` call rather than maintaining it incrementally, per
/// spec, since withdrawal and result erasure both change opponents' histories out from under a
/// player who never itself changed.
pub fn compute(players: &mut [Player], points_for_win: f64) {
    let own: Vec<(f64, f64)> = players
        .iter()
        .map(|p| {
            (
                percent(p.match_points, p.match_count, points_for_win),
                percent(p.game_points, p.game_count, points_for_win),
            )
        })
        .collect();

    let index_of = |id: PlayerId, players: &[Player]| players.iter().position(|p| p.id == id);

    let opponent_stage: Vec<(f64, f64)> = players
        .iter()
        .map(|p| {
            let mut omw_sum = 0.0;
            let mut ogw_sum = 0.0;
            let mut n = 0u32;
            for entry in &p.results {
                let Some(opp_id) = entry.opponent else { continue };
                let Some(j) = index_of(opp_id, players) else { continue };
                omw_sum += match_win_percent_excluding(&players[j], entry.match_id, points_for_win);
                ogw_sum += own[j].1;
                n += 1;
            }
            if n == 0 {
                (MIN_PERCENT, MIN_PERCENT)
            } else {
                (omw_sum / n as f64, ogw_sum / n as f64)
            }
        })
        .collect();

    let cumulative: Vec<f64> = players
        .iter()
        .map(|p| {
            let mut running = 0.0;
            let mut total = 0.0;
            for entry in &p.results {
                running += entry.match_points;
                total += running;
            }
            total
        })
        .collect();

    let mut reports = Vec::with_capacity(players.len());
    for (i, player) in players.iter().enumerate() {
        let mut oomw_sum = 0.0;
        let mut solkoff = 0.0;
        let mut sb = 0.0;
        let mut opp_cumulative = 0.0;
        let mut opponent_points = Vec::new();
        let mut n = 0u32;
        for entry in &player.results {
            let Some(opp_id) = entry.opponent else { continue };
            let Some(j) = index_of(opp_id, players) else { continue };
            oomw_sum += opponent_stage[j].0;
            solkoff += players[j].match_points;
            sb += players[j].match_points * outcome_weight(entry.outcome);
            opp_cumulative += cumulative[j];
            opponent_points.push(players[j].match_points);
            n += 1;
        }
        let oomw = if n == 0 { MIN_PERCENT } else { oomw_sum / n as f64 };
        let median_buchholz = if opponent_points.len() >= 2 {
            let max = opponent_points.iter().cloned().fold(f64::MIN, f64::max);
            let min = opponent_points.iter().cloned().fold(f64::MAX, f64::min);
            solkoff - max - min
        } else {
            solkoff
        };

        let idx = i;
        let report = TiebreakerReport {
            game_win_percent: own[idx].1,
            match_win_percent: own[idx].0,
            opponent_match_win_percent: opponent_stage[idx].0,
            opponent_game_win_percent: opponent_stage[idx].1,
            opponent_opponent_match_win_percent: oomw,
            solkoff,
            median_buchholz,
            sonneborn_berger: sb,
            cumulative: cumulative[idx],
            opponent_cumulative: opp_cumulative,
        };
        reports.push(report);
    }
    for (player, report) in players.iter_mut().zip(reports) {
        player.tiebreakers = report;
    }
}

fn versus_aggregate(player: &Player, cohort: &HashSet<PlayerId>) -> f64 {
    player
        .results
        .iter()
        .filter(|e| e.opponent.map(|o| cohort.contains(&o)).unwrap_or(false))
        .map(|e| e.match_points)
        .sum()
}

/// Orders `players` by `matchPoints` descending, then each tiebreaker in `order` descending, then
/// original input order. Groups that remain exactly tied through every key are then re-ordered
/// internally by the `versus` head-to-head aggregate among just that cohort.
pub fn sort(players: &mut Vec<Player>, order: &[Tiebreaker]) {
    let original: Vec<PlayerId> = players.iter().map(|p| p.id).collect();
    let rank_of = |id: PlayerId| original.iter().position(|&o| o == id).unwrap_or(usize::MAX);

    players.sort_by(|a, b| {
        b.match_points
            .partial_cmp(&a.match_points)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| {
                order.iter().fold(std::cmp::Ordering::Equal, |acc, &tb| {
                    acc.then_with(|| {
                        b.tiebreakers
                            .value(tb)
                            .partial_cmp(&a.tiebreakers.value(tb))
                            .unwrap_or(std::cmp::Ordering::Equal)
                    })
                })
            })
            .then_with(|| rank_of(a.id).cmp(&rank_of(b.id)))
    });

    let key = |p: &Player| -> Vec<u64> {
        std::iter::once(p.match_points)
            .chain(order.iter().map(|&tb| p.tiebreakers.value(tb)))
            .map(|v| v.to_bits())
            .collect()
    };

    let mut i = 0;
    while i < players.len() {
        let mut j = i + 1;
        while j < players.len() && key(&players[j]) == key(&players[i]) {
            j += 1;
        }
        if j - i > 1 {
            let cohort: HashSet<PlayerId> = players[i..j].iter().map(|p| p.id).collect();
            players[i..j].sort_by(|a, b| {
                versus_aggregate(b, &cohort)
                    .partial_cmp(&versus_aggregate(a, &cohort))
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| rank_of(a.id).cmp(&rank_of(b.id)))
            });
        }
        i = j;
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::player::{MatchEntry, Outcome};

    fn winning_entry(match_id: MatchId, opponent: PlayerId) -> MatchEntry {
        MatchEntry {
            match_id,
            round: 1,
            opponent: Some(opponent),
            outcome: Outcome::Win,
            match_points: 1.0,
            game_points: 2.0,
            games_won: 2,
            games_lost: 0,
            draws: 0,
        }
    }

    #[test]
    fn percent_is_floored_at_one_third() {
        assert_eq!(percent(0.0, 10, 1.0), MIN_PERCENT);
        assert_eq!(percent(1.0, 10, 1.0), MIN_PERCENT);
    }

    #[test]
    fn solkoff_sums_opponent_match_points() {
        let mut a = Player::new("A".into());
        let mut b = Player::new("B".into());
        let mut c = Player::new("C".into());
        let m1 = MatchId::new(Uuid::new_v4());
        let m2 = MatchId::new(Uuid::new_v4());
        a.record_result(winning_entry(m1, b.id));
        a.record_result(winning_entry(m2, c.id));
        b.record_result(MatchEntry { match_points: 0.0, ..winning_entry(m1, a.id) });
        c.record_result(MatchEntry { match_points: 1.0, ..winning_entry(m2, a.id) });

        let mut players = vec![a, b, c];
        compute(&mut players, 1.0);
        assert_eq!(players[0].tiebreakers.solkoff, 0.0 + 1.0);
    }

    #[test]
    fn byes_contribute_zero_to_solkoff() {
        let mut a = Player::new("A".into());
        let m = MatchId::new(Uuid::new_v4());
        a.record_result(MatchEntry {
            match_id: m,
            round: 1,
            opponent: None,
            outcome: Outcome::Bye,
            match_points: 1.0,
            game_points: 2.0,
            games_won: 2,
            games_lost: 0,
            draws: 0,
        });
        let mut players = vec![a];
        compute(&mut players, 1.0);
        assert_eq!(players[0].tiebreakers.solkoff, 0.0);
    }

    #[test]
    fn versus_breaks_an_exact_tie() {
        let mut a = Player::new("A".into());
        let mut b = Player::new("B".into());
        let m = MatchId::new(Uuid::new_v4());
        a.record_result(MatchEntry { match_points: 1.0, ..winning_entry(m, b.id) });
        b.record_result(MatchEntry { match_points: 0.0, ..winning_entry(m, a.id) });
        a.match_points = 3.0;
        b.match_points = 3.0;
        let mut players = vec![b, a];
        compute(&mut players, 1.0);
        sort(&mut players, &[]);
        assert_eq!(players[0].alias, "A");
    }
}
