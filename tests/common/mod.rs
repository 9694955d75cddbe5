use tourney_core::{
    identifiers::PlayerId,
    settings::TournamentConfig,
    tournament::Tournament,
};

/// Spoofs up a tournament with `n` registered players and the given config, without starting it.
pub fn spoof(config: TournamentConfig, n: usize) -> (Tournament, Vec<PlayerId>) {
    let mut t = Tournament::new(config);
    let ids = (0..n).map(|i| t.add_player(format!("Player {i}")).unwrap()).collect();
    (t, ids)
}

/// Spoofs up and starts a tournament with `n` registered players.
pub fn spoof_started(config: TournamentConfig, n: usize) -> (Tournament, Vec<PlayerId>) {
    let (mut t, ids) = spoof(config, n);
    t.start().unwrap();
    (t, ids)
}

/// Reports a clean 2-0 win for whichever slot holds `winner` in `match_id`.
pub fn win(t: &mut Tournament, match_id: tourney_core::identifiers::MatchId, winner: PlayerId) {
    let m = t.get_match(match_id).unwrap();
    let result = if m.player_one == Some(winner) {
        tourney_core::matches::MatchResult::new(2, 0, 0)
    } else {
        tourney_core::matches::MatchResult::new(0, 2, 0)
    };
    t.report_result(match_id, result).unwrap();
}
