//! Seeded single/double-elimination bracket construction and the routing fix-ups triggered by
//! mid-bracket withdrawal. No repo in the corpus this crate was learned from implements bracket
//! play, so this module is original engineering against standard published double-elimination
//! bracket construction: seed into the standard recursive "fold" order, route winners bracket
//! losers into a losers bracket sized to match each winners round, and converge both finalists on
//! a grand final.

use crate::{
    error::TournamentError,
    identifiers::{IdSource, MatchId, PlayerId},
    match_registry::MatchRegistry,
    matches::Match,
};

/// The standard bracket seeding order: for a bracket of `size` slots (a power of two), returns
/// the sequence of seed numbers (1-indexed) in bracket position order, so that the two highest
/// seeds can only meet in the final and so on recursively.
pub fn seed_order(size: usize) -> Vec<u32> {
    assert!(size.is_power_of_two() && size >= 2);
    let mut order: Vec<u32> = vec![1, 2];
    while order.len() < size {
        let next_size = (order.len() * 2) as u32;
        let mut next = Vec::with_capacity(order.len() * 2);
        for &s in &order {
            next.push(s);
            next.push(next_size + 1 - s);
        }
        order = next;
    }
    order
}

/// A fully wired single-elimination bracket (optionally with a third-place match).
pub struct SingleEliminationBracket {
    /// Every match in the bracket
    pub matches: Vec<Match>,
    /// The match whose winner ends the tournament
    pub decider: MatchId,
}

/// A fully wired double-elimination bracket: winners bracket, losers bracket, and a grand final.
pub struct DoubleEliminationBracket {
    /// Every match in both brackets plus the grand final
    pub matches: Vec<Match>,
    /// The grand final's id
    pub grand_final: MatchId,
    /// Whether the winners-bracket champion occupies `player_one` (vs `player_two`) in the grand
    /// final; needed to tell, once the grand final is decided, whether the result calls for a
    /// bracket-reset match
    pub wb_champion_is_player_one: bool,
}

fn seeded_slot(seeds: &[PlayerId], seed_number: u32) -> Option<PlayerId> {
    seeds.get(seed_number as usize - 1).copied()
}

/// Builds a single-elimination bracket for `seeds` (already in seed order, best first). Bracket
/// size is the next power of two at or above `seeds.len()`; seeds beyond `seeds.len()` are empty
/// slots, which produce first-round byes for the top `2*size - n` seeds. When `consolation` is
/// set, the two semi-final losers feed a third-place match.
pub fn build_single_elimination(
    seeds: &[PlayerId],
    consolation: bool,
    ids: &mut impl IdSource<Match>,
) -> SingleEliminationBracket {
    let n = seeds.len().max(1);
    let size = n.next_power_of_two().max(2);
    let order = seed_order(size);
    let num_rounds = size.trailing_zeros();

    let mut round_ids: Vec<Vec<MatchId>> = Vec::with_capacity(num_rounds as usize);
    let mut matches = Vec::new();
    let mut count = size / 2;
    for r in 0..num_rounds {
        let mut this_round = Vec::with_capacity(count);
        for i in 0..count {
            let id = ids.next_id();
            this_round.push(id);
            let mut m = Match::new(r + 1, i as u32);
            m.id = id;
            matches.push(m);
        }
        round_ids.push(this_round);
        count /= 2;
    }

    for (i, m) in matches.iter_mut().take(size / 2).enumerate() {
        m.player_one = seeded_slot(seeds, order[2 * i]);
        m.player_two = seeded_slot(seeds, order[2 * i + 1]);
        m.active = m.player_one.is_some() && m.player_two.is_some();
    }

    for r in 0..(num_rounds as usize).saturating_sub(1) {
        for (i, &match_id) in round_ids[r].iter().enumerate() {
            let target = round_ids[r + 1][i / 2];
            find_mut(&mut matches, match_id).winners_path = Some(target);
        }
    }

    let decider = *round_ids
        .last()
        .and_then(|r| r.first())
        .expect("at least one round exists");

    if consolation && round_ids.len() >= 2 {
        let semis = &round_ids[round_ids.len() - 2];
        if semis.len() == 2 {
            let third_place_id = ids.next_id();
            let mut third_place = Match::new(num_rounds, 1);
            third_place.id = third_place_id;
            for &semi_id in semis {
                find_mut(&mut matches, semi_id).losers_path = Some(third_place_id);
            }
            matches.push(third_place);
        }
    }

    SingleEliminationBracket { matches, decider }
}

/// Builds a double-elimination bracket for `seeds`. The winners bracket is seeded exactly as in
/// `build_single_elimination`; each winners match's loser drops into a losers bracket sized to
/// absorb it, with a pure reduction round following each "merge" round to keep the losers bracket
/// converging at the same pace as the winners bracket. Both finalists meet in a grand final
/// (`winners_path = None`); the caller is responsible for creating a bracket-reset match if the
/// losers-bracket finalist wins the grand final.
///
/// Losers-bracket feeders are paired by matching index rather than by seed distance, so this does
/// not guarantee the maximal rematch-delaying separation a fully seed-aware "fold" routing would;
/// see DESIGN.md.
pub fn build_double_elimination(seeds: &[PlayerId], ids: &mut impl IdSource<Match>) -> DoubleEliminationBracket {
    let n = seeds.len().max(1);
    let size = n.next_power_of_two().max(2);
    let order = seed_order(size);
    let num_wb_rounds = size.trailing_zeros() as usize;

    let mut wb_round_ids: Vec<Vec<MatchId>> = Vec::with_capacity(num_wb_rounds);
    let mut matches = Vec::new();
    let mut count = size / 2;
    for r in 0..num_wb_rounds {
        let mut this_round = Vec::with_capacity(count);
        for i in 0..count {
            let id = ids.next_id();
            this_round.push(id);
            let mut m = Match::new(r as u32 + 1, i as u32);
            m.id = id;
            matches.push(m);
        }
        wb_round_ids.push(this_round);
        count /= 2;
    }
    for (i, m) in matches.iter_mut().take(size / 2).enumerate() {
        m.player_one = seeded_slot(seeds, order[2 * i]);
        m.player_two = seeded_slot(seeds, order[2 * i + 1]);
        m.active = m.player_one.is_some() && m.player_two.is_some();
    }
    for r in 0..num_wb_rounds.saturating_sub(1) {
        for (i, &match_id) in wb_round_ids[r].iter().enumerate() {
            let target = wb_round_ids[r + 1][i / 2];
            find_mut(&mut matches, match_id).winners_path = Some(target);
        }
    }

    let wb_final = wb_round_ids[num_wb_rounds - 1][0];

    if num_wb_rounds < 2 {
        // Degenerate bracket (2 players): no losers bracket, the single match is its own decider
        // and its loser has nowhere to go, matching a normal single-elimination final.
        let grand_final = wb_final;
        return DoubleEliminationBracket {
            matches,
            grand_final,
            wb_champion_is_player_one: true,
        };
    }

    // Losers-bracket round 1: pure, pairs winners-round-1 losers against each other.
    let lb_round1_size = size / 4;
    let mut lb_rounds: Vec<Vec<MatchId>> = Vec::new();
    let mut round1 = Vec::with_capacity(lb_round1_size.max(1));
    for j in 0..lb_round1_size.max(1) {
        let id = ids.next_id();
        round1.push(id);
        let mut m = Match::new(num_wb_rounds as u32 + 1, j as u32);
        m.id = id;
        matches.push(m);
    }
    for (j, &lb_id) in round1.iter().enumerate() {
        let src_a = wb_round_ids[0][2 * j];
        let src_b = wb_round_ids[0][2 * j + 1];
        find_mut(&mut matches, src_a).losers_path = Some(lb_id);
        find_mut(&mut matches, src_b).losers_path = Some(lb_id);
    }
    lb_rounds.push(round1);

    let total_lb_rounds = 2 * (num_wb_rounds - 1);
    let mut prev_winners = lb_rounds[0].clone();
    let mut lb_round_number = num_wb_rounds as u32 + 2;
    for i in 2..=total_lb_rounds {
        if i % 2 == 0 {
            // Merge round: previous losers-bracket winners face this winners-round's losers.
            let wb_round = i / 2; // 1-indexed winners round whose losers join here
            let feeders = &wb_round_ids[wb_round]; // wb_round_ids is 0-indexed, so this is round wb_round+1
            let size = prev_winners.len();
            let mut this_round = Vec::with_capacity(size);
            for j in 0..size {
                let id = ids.next_id();
                this_round.push(id);
                let mut m = Match::new(lb_round_number, j as u32);
                m.id = id;
                matches.push(m);
            }
            for j in 0..size {
                let target = this_round[j];
                find_mut(&mut matches, prev_winners[j]).winners_path = Some(target);
                find_mut(&mut matches, feeders[j]).losers_path = Some(target);
            }
            lb_rounds.push(this_round.clone());
            prev_winners = this_round;
        } else {
            // Reduction round: pure losers-bracket, halves the field, no new entrants.
            let size = prev_winners.len() / 2;
            let mut this_round = Vec::with_capacity(size);
            for j in 0..size {
                let id = ids.next_id();
                this_round.push(id);
                let mut m = Match::new(lb_round_number, j as u32);
                m.id = id;
                matches.push(m);
            }
            for j in 0..size {
                let target = this_round[j];
                find_mut(&mut matches, prev_winners[2 * j]).winners_path = Some(target);
                find_mut(&mut matches, prev_winners[2 * j + 1]).winners_path = Some(target);
            }
            lb_rounds.push(this_round.clone());
            prev_winners = this_round;
        }
        lb_round_number += 1;
    }

    let lb_final = prev_winners[0];
    let grand_final_id = ids.next_id();
    let mut grand_final = Match::new(lb_round_number, 0);
    grand_final.id = grand_final_id;
    matches.push(grand_final);

    find_mut(&mut matches, wb_final).winners_path = Some(grand_final_id);
    find_mut(&mut matches, lb_final).winners_path = Some(grand_final_id);

    DoubleEliminationBracket {
        matches,
        grand_final: grand_final_id,
        wb_champion_is_player_one: true,
    }
}

fn find_mut(matches: &mut [Match], id: MatchId) -> &mut Match {
    matches.iter_mut().find(|m| m.id == id).expect("routing target always exists")
}

/// Applies the §4.4 collapse fix-up after a player has withdrawn from `forfeited_match` and that
/// match's loser slot, which the withdrawing player would have occupied, is left permanently
/// empty. If the downstream node already has its other slot filled by some prior occupant, that
/// occupant is advanced directly into the downstream node's own winners-path target and the node
/// is voided. Otherwise the other match that feeds the downstream node is rewired to point
/// straight at the downstream node's winners-path target, bypassing it entirely.
pub fn collapse_losers_path_orphan(
    registry: &mut MatchRegistry,
    forfeited_match: MatchId,
) -> Result<(), TournamentError> {
    let Some(target_id) = registry.get(forfeited_match)?.losers_path else {
        return Ok(());
    };
    void_and_bypass(registry, target_id, Some(forfeited_match))
}

/// Applies the same collapse when a player withdraws while sitting alone in `match_id`, before an
/// opponent ever arrived to fill the other slot (e.g. she lost a winners'-bracket match, was
/// routed into a losers'-bracket match, and withdraws before the parallel bracket produces her
/// next opponent). `match_id` itself is voided; the still-undecided match that would have supplied
/// the opponent is rewired straight to `match_id`'s own downstream target, so that opponent
/// advances cleanly instead of inheriting a phantom bye.
pub fn collapse_pending_match(
    registry: &mut MatchRegistry,
    match_id: MatchId,
    withdrawing: PlayerId,
) -> Result<(), TournamentError> {
    registry.get_mut(match_id)?.clear_slot(withdrawing);
    void_and_bypass(registry, match_id, None)
}

/// Shared collapse logic: void `target_id` and either advance its lone occupant past it, or, if it
/// has no occupant at all, rewire whichever of its still-undecided feeders (other than `exclude`)
/// to point straight at its own downstream target.
fn void_and_bypass(registry: &mut MatchRegistry, target_id: MatchId, exclude: Option<MatchId>) -> Result<(), TournamentError> {
    let target = registry.get(target_id)?.clone();
    let grandparent = target.winners_path;
    let occupant = target.participants().next();

    match occupant {
        Some(occupant) => {
            if let Some(next_id) = grandparent {
                registry.get_mut(next_id)?.fill_next_slot(occupant);
            }
        }
        None => {
            let other_source = registry.sources_feeding(target_id).into_iter().find(|&id| {
                Some(id) != exclude && registry.get(id).map(|m| m.result.is_none()).unwrap_or(false)
            });
            if let Some(source_id) = other_source {
                let source = registry.get_mut(source_id)?;
                if source.winners_path == Some(target_id) {
                    source.winners_path = grandparent;
                }
                if source.losers_path == Some(target_id) {
                    source.losers_path = grandparent;
                }
            }
        }
    }

    let target = registry.get_mut(target_id)?;
    target.active = false;
    target.voided = true;
    Ok(())
}
