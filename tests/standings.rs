mod common;

use tourney_core::settings::TournamentConfig;

#[test]
fn standings_rank_winners_above_losers() {
    let (mut t, _ids) = common::spoof_started(TournamentConfig::default(), 8);
    let round1: Vec<_> = t.matches().filter(|m| m.round == 1).map(|m| m.id).collect();
    for match_id in round1 {
        let winner = t.get_match(match_id).unwrap().player_one.unwrap();
        common::win(&mut t, match_id, winner);
    }
    let standings = t.standings(true);
    assert_eq!(standings.len(), 8);
    for window in standings.windows(2) {
        assert!(window[0].match_points >= window[1].match_points);
    }
    assert_eq!(standings[0].match_points, 1.0);
    assert_eq!(standings[standings.len() - 1].match_points, 0.0);
}

#[test]
fn withdrawn_players_are_dropped_from_active_only_standings_but_not_from_the_registry() {
    let (mut t, ids) = common::spoof_started(TournamentConfig::default(), 8);
    t.remove_player(ids[0]).unwrap();
    let active_standings = t.standings(true);
    assert!(active_standings.iter().all(|p| p.id != ids[0]));
    assert!(t.player(ids[0]).is_ok());
}
