mod common;

use tourney_core::{error::TournamentError, settings::TournamentConfig, tournament::TournamentStatus};

#[test]
fn registering_past_the_player_limit_is_rejected() {
    let config = TournamentConfig {
        player_limit: 2,
        ..Default::default()
    };
    let (mut t, _) = common::spoof(config, 2);
    assert_eq!(t.add_player("Late".into()), Err(TournamentError::PlayerLimitReached));
}

#[test]
fn swiss_refuses_to_start_under_eight_players() {
    let (mut t, _) = common::spoof(TournamentConfig::default(), 7);
    assert!(matches!(t.start(), Err(TournamentError::NotEnoughPlayers { required: 8, have: 7 })));
}

#[test]
fn round_robin_only_needs_four_players() {
    let config = TournamentConfig {
        format: tourney_core::settings::Format::RoundRobin,
        ..Default::default()
    };
    let (mut t, _) = common::spoof(config, 4);
    assert!(t.start().is_ok());
}

#[test]
fn late_swiss_arrival_gets_catch_up_losses() {
    let (mut t, _ids) = common::spoof_started(TournamentConfig::default(), 8);
    let match_id = t.matches().find(|m| m.round == 1).unwrap().id;
    let winner = t.get_match(match_id).unwrap().player_one.unwrap();
    common::win(&mut t, match_id, winner);
    for m in t.matches().filter(|m| m.round == 1).map(|m| m.id).collect::<Vec<_>>() {
        if t.get_match(m).unwrap().result.is_none() {
            let w = t.get_match(m).unwrap().player_one.unwrap();
            common::win(&mut t, m, w);
        }
    }
    t.next_round().unwrap();
    let newcomer = t.add_player("Newcomer".into()).unwrap();
    let player = t.player(newcomer).unwrap();
    assert_eq!(player.match_count, 1);
    assert_eq!(player.match_points, 0.0);
}

#[test]
fn cannot_add_players_once_elimination_is_active() {
    let config = TournamentConfig {
        format: tourney_core::settings::Format::SingleElimination,
        ..Default::default()
    };
    let (mut t, _) = common::spoof_started(config, 4);
    assert_eq!(t.status, TournamentStatus::Active);
    assert!(matches!(t.add_player("Late".into()), Err(TournamentError::WrongStatus(_))));
}
