use crate::identifiers::PlayerId;

/// Builds a full round-robin schedule using the circle method: seat `players[0]` and rotate the
/// rest around it one position per round. With an odd count, a phantom seat is inserted and
/// whoever sits opposite it that round gets a bye (`None`).
///
/// Returns one `Vec` of pairs per round; a pair is `(Some(a), Some(b))` for a real match or
/// `(Some(a), None)` for a bye. `doubled` additionally appends a second full cycle with each
/// pair's sides swapped, for double round-robin.
pub fn circle_method(players: &[PlayerId], doubled: bool) -> Vec<Vec<(Option<PlayerId>, Option<PlayerId>)>> {
    if players.len() < 2 {
        return Vec::new();
    }

    let mut seats: Vec<Option<PlayerId>> = players.iter().map(|&p| Some(p)).collect();
    if seats.len() % 2 == 1 {
        seats.push(None);
    }
    let n = seats.len();
    let rounds_needed = n - 1;

    let mut rounds = Vec::with_capacity(rounds_needed);
    for _ in 0..rounds_needed {
        let mut pairs = Vec::with_capacity(n / 2);
        for i in 0..n / 2 {
            pairs.push((seats[i], seats[n - 1 - i]));
        }
        rounds.push(pairs);
        // Fix seat 0, rotate everyone else one position.
        let last = seats.pop().unwrap();
        seats.insert(1, last);
    }

    if doubled {
        let swapped: Vec<_> = rounds
            .iter()
            .map(|round| round.iter().map(|&(a, b)| (b, a)).collect())
            .collect();
        rounds.extend(swapped);
    }

    rounds
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn ids(n: usize) -> Vec<PlayerId> {
        std::iter::repeat_with(|| PlayerId::new(Uuid::new_v4())).take(n).collect()
    }

    #[test]
    fn four_players_play_three_rounds_of_two_matches() {
        let players = ids(4);
        let rounds = circle_method(&players, false);
        assert_eq!(rounds.len(), 3);
        for round in &rounds {
            assert_eq!(round.len(), 2);
            for (a, b) in round {
                assert!(a.is_some() && b.is_some());
            }
        }
    }

    #[test]
    fn everyone_plays_everyone_exactly_once() {
        let players = ids(5);
        let rounds = circle_method(&players, false);
        assert_eq!(rounds.len(), 5);
        let mut seen: std::collections::HashSet<(PlayerId, PlayerId)> = std::collections::HashSet::new();
        let mut bye_counts: std::collections::HashMap<PlayerId, u32> = std::collections::HashMap::new();
        for round in &rounds {
            for (a, b) in round {
                match (a, b) {
                    (Some(x), Some(y)) => {
                        let key = if Uuid::from(*x) < Uuid::from(*y) { (*x, *y) } else { (*y, *x) };
                        assert!(seen.insert(key), "rematch detected");
                    }
                    (Some(x), None) | (None, Some(x)) => {
                        *bye_counts.entry(*x).or_insert(0) += 1;
                    }
                    (None, None) => panic!("double phantom seat"),
                }
            }
        }
        assert_eq!(seen.len(), 5 * 4 / 2);
        assert_eq!(bye_counts.values().sum::<u32>(), 5);
    }

    #[test]
    fn doubled_round_robin_plays_both_sides() {
        let players = ids(4);
        let rounds = circle_method(&players, true);
        assert_eq!(rounds.len(), 6);
    }
}
