mod common;

use tourney_core::settings::TournamentConfig;

/// Decides every currently-active match in `round` by letting `player_one` win, mirroring an
/// "all favourites win" Swiss run.
fn decide_round(t: &mut tourney_core::tournament::Tournament, round: u32) {
    let ids: Vec<_> = t.matches().filter(|m| m.round == round && m.active).map(|m| m.id).collect();
    for id in ids {
        let winner = t.get_match(id).unwrap().player_one.unwrap();
        common::win(t, id, winner);
    }
}

#[test]
fn eight_player_swiss_auto_schedules_three_rounds_and_solkoff_matches_opponent_totals() {
    let (mut t, _ids) = common::spoof_started(TournamentConfig::default(), 8);
    for round in 1..=3 {
        decide_round(&mut t, round);
        if round < 3 {
            t.next_round().unwrap();
        }
    }

    let standings = t.standings(true);
    let winner = standings.iter().find(|p| p.match_points == 3.0).expect("an undefeated player exists");
    assert_eq!(winner.results.len(), 3);

    // Solkoff is the sum of the winner's three opponents' own final match points; verify the
    // computed statistic against an independent re-derivation from recorded history rather than
    // re-deriving it the same way the implementation does.
    let expected: f64 = winner
        .results
        .iter()
        .map(|entry| {
            let opponent = entry.opponent.expect("no byes in an 8-player event");
            standings.iter().find(|p| p.id == opponent).unwrap().match_points
        })
        .sum();
    assert_eq!(winner.tiebreakers.solkoff, expected);
}

#[test]
fn nine_player_swiss_gives_round_two_bye_to_someone_new() {
    let (mut t, _ids) = common::spoof_started(TournamentConfig::default(), 9);
    let round1: Vec<_> = t.matches().filter(|m| m.round == 1).collect();
    assert_eq!(round1.len(), 5);
    assert_eq!(round1.iter().filter(|m| m.is_bye()).count(), 1);
    let first_bye = round1.iter().find(|m| m.is_bye()).unwrap();
    let first_recipient = first_bye.bye_recipient().unwrap();
    assert_eq!(t.player(first_recipient).unwrap().match_points, 1.0);
    assert!(t.player(first_recipient).unwrap().pairing_bye);

    decide_round(&mut t, 1);
    t.next_round().unwrap();

    let second_bye = t.matches().find(|m| m.round == 2 && m.is_bye()).expect("odd count still produces a bye");
    assert_ne!(second_bye.bye_recipient(), Some(first_recipient));
}
