use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::{
    identifiers::PlayerId,
    pairings::pair_with_escalating_tolerance,
    player::Player,
};

/// The outcome of pairing one Swiss round: head-to-head pairs plus at most one bye.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct SwissRound {
    /// Two-player pairs for this round
    pub pairs: Vec<(PlayerId, PlayerId)>,
    /// The player receiving a bye this round, if the active count is odd
    pub bye: Option<PlayerId>,
}

const MAX_REPEAT_TOLERANCE: u64 = 4;

/// Pairs one round of Swiss. `active_players` need not be pre-sorted; this groups them by
/// `matchPoints` internally, pairs within each score group (floating the odd one out down into
/// the next group), and, when the active count is odd, pre-assigns a bye to the lowest-ranked
/// player who hasn't already had one before pairing the rest.
pub fn swiss_round(
    active_players: &[Player],
    opponents: &HashMap<PlayerId, HashSet<PlayerId>>,
) -> SwissRound {
    let mut sorted: Vec<&Player> = active_players.iter().collect();
    sorted.sort_by(|a, b| {
        b.match_points
            .partial_cmp(&a.match_points)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let bye = if sorted.len() % 2 == 1 {
        sorted
            .iter()
            .rev()
            .find(|p| !p.pairing_bye)
            .or_else(|| sorted.last())
            .map(|p| p.id)
    } else {
        None
    };

    let mut groups: Vec<Vec<PlayerId>> = Vec::new();
    let mut current_points: Option<f64> = None;
    for p in sorted.iter().filter(|p| Some(p.id) != bye) {
        match current_points {
            Some(pts) if pts == p.match_points => groups.last_mut().unwrap().push(p.id),
            _ => {
                groups.push(vec![p.id]);
                current_points = Some(p.match_points);
            }
        }
    }

    let mut pairs = Vec::new();
    let mut floating: Vec<PlayerId> = Vec::new();
    for group in groups {
        let mut pool = floating;
        pool.extend(group);
        let pairings = pair_with_escalating_tolerance(pool, opponents, MAX_REPEAT_TOLERANCE);
        for pair in pairings.paired {
            pairs.push((pair[0], pair[1]));
        }
        floating = pairings.rejected;
    }

    // Leftover floaters (can only happen if every remaining matchup within tolerance is already
    // exhausted) get one final, high-tolerance pass across the whole remaining pool.
    if floating.len() > 1 {
        let pairings = pair_with_escalating_tolerance(floating, opponents, MAX_REPEAT_TOLERANCE * 4);
        for pair in pairings.paired {
            pairs.push((pair[0], pair[1]));
        }
        floating = pairings.rejected;
    }
    debug_assert!(floating.len() <= 1);

    SwissRound { pairs, bye }
}

/// Default round count when `rounds = 0` ("auto"): the ceiling of log2 of the active player count.
pub fn auto_round_count(player_count: u32) -> u32 {
    if player_count <= 1 {
        return 0;
    }
    (player_count as f64).log2().ceil() as u32
}
