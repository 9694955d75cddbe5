use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::identifiers::PlayerId;

/// The result of one pass of pairing: players who were grouped into two-person matches, and
/// players left over for the caller to deal with (float to the next group, or award a bye).
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Pairings {
    /// Each entry is exactly two player ids
    pub paired: Vec<Vec<PlayerId>>,
    /// Players that couldn't be placed in this pass
    pub rejected: Vec<PlayerId>,
}

/// Greedily pairs players two at a time, picking from the front of `plyrs` and scanning forward
/// for the first partner whose number of shared past opponents with the match built so far is at
/// most `repeat_tolerance`. A player who finds no compatible partner is rejected rather than
/// forcing a bad pairing; the caller retries at a higher tolerance, which *is* "relax the
/// no-repeat constraint on the fewest edges possible": each retry concedes one more rematch before
/// giving up on the whole group.
pub fn greedy_pairings(
    plyrs: impl IntoIterator<Item = PlayerId>,
    opponents: &HashMap<PlayerId, HashSet<PlayerId>>,
    repeat_tolerance: u64,
) -> Pairings {
    let mut plyrs: VecDeque<PlayerId> = plyrs.into_iter().collect();
    let mut digest = Pairings {
        paired: Vec::with_capacity(plyrs.len() / 2 + 1),
        rejected: Vec::new(),
    };

    while plyrs.len() >= 2 {
        let first = plyrs.pop_front().expect("len checked above");
        let mut partner = None;
        for (i, candidate) in plyrs.iter().enumerate() {
            if compatible(opponents, first, *candidate, repeat_tolerance) {
                partner = Some(i);
                break;
            }
        }
        match partner {
            Some(i) => {
                let other = plyrs.remove(i).expect("index came from this deque");
                digest.paired.push(vec![first, other]);
            }
            None => digest.rejected.push(first),
        }
    }
    digest.rejected.extend(plyrs);
    digest
}

fn compatible(
    opponents: &HashMap<PlayerId, HashSet<PlayerId>>,
    a: PlayerId,
    b: PlayerId,
    repeat_tolerance: u64,
) -> bool {
    let already_played = opponents.get(&a).is_some_and(|set| set.contains(&b));
    !already_played || repeat_tolerance >= 1
}

/// Runs `greedy_pairings` at escalating tolerance (0, 1, 2, ...) until every player still in the
/// pool is paired or `max_tolerance` is exhausted, whichever comes first. Used by Swiss pairing
/// within a single score group.
pub fn pair_with_escalating_tolerance(
    plyrs: impl IntoIterator<Item = PlayerId>,
    opponents: &HashMap<PlayerId, HashSet<PlayerId>>,
    max_tolerance: u64,
) -> Pairings {
    let plyrs: Vec<PlayerId> = plyrs.into_iter().collect();
    let mut tolerance = 0;
    loop {
        let attempt = greedy_pairings(plyrs.iter().copied(), opponents, tolerance);
        if attempt.rejected.len() <= 1 || tolerance >= max_tolerance {
            return attempt;
        }
        tolerance += 1;
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn ids(n: usize) -> Vec<PlayerId> {
        std::iter::repeat_with(|| PlayerId::new(Uuid::new_v4())).take(n).collect()
    }

    #[test]
    fn pairs_everyone_with_no_history() {
        let players = ids(8);
        let pairings = greedy_pairings(players.iter().copied(), &HashMap::new(), 0);
        assert_eq!(pairings.paired.len(), 4);
        assert!(pairings.rejected.is_empty());
    }

    #[test]
    fn odd_count_rejects_exactly_one() {
        let players = ids(5);
        let pairings = greedy_pairings(players.iter().copied(), &HashMap::new(), 0);
        assert_eq!(pairings.paired.len(), 2);
        assert_eq!(pairings.rejected.len(), 1);
    }

    #[test]
    fn escalating_tolerance_eventually_repairs_a_full_history() {
        let players = ids(4);
        let mut opponents = HashMap::new();
        // Everyone has already played everyone; only escalating tolerance can pair them.
        for &a in &players {
            let set: HashSet<_> = players.iter().copied().filter(|&b| b != a).collect();
            opponents.insert(a, set);
        }
        let pairings = pair_with_escalating_tolerance(players.iter().copied(), &opponents, 3);
        assert_eq!(pairings.paired.len(), 2);
        assert!(pairings.rejected.is_empty());
    }
}
