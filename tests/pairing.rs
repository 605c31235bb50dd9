//! Integration tests for the pairing engine: completeness, byes, brackets, rematches.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use swiss_tournament_web::logic::count_rematches;
use swiss_tournament_web::{
    check_pairings, generate_next_round_with_rng, generate_pairings_with_rng, record_match_result,
    start_tournament_with_rng, Match, MatchResult, Opponent, Pairing, PairingQuality, Player,
    PlayerId, Tournament,
};

fn tournament_with_players(n: usize) -> Tournament {
    let mut t = Tournament::new();
    for i in 1..=n {
        t.add_player(format!("P{i}")).unwrap();
    }
    t
}

/// Player 1 of every real pairing wins 2-0.
fn report_round(t: &mut Tournament) {
    let round = t.current_round;
    let pairings = t.pairings.clone();
    for p in pairings {
        if let Opponent::Player(p2) = p.player2 {
            record_match_result(t, round, p.player1, p2, 2, 0).unwrap();
        }
    }
}

fn meet(a: &mut Player, b: &mut Player, round: u32, a_games: u32, b_games: u32) {
    let (ra, rb) = swiss_tournament_web::models::score_games(a_games, b_games);
    a.record_match(Match {
        round,
        opponent: Opponent::Player(b.id),
        result: ra,
        games_won: a_games,
        games_lost: b_games,
        games_drawn: 0,
    });
    b.record_match(Match {
        round,
        opponent: Opponent::Player(a.id),
        result: rb,
        games_won: b_games,
        games_lost: a_games,
        games_drawn: 0,
    });
}

fn has_pair(pairings: &[Pairing], a: PlayerId, b: PlayerId) -> bool {
    pairings.iter().any(|p| p.involves(a) && p.involves(b))
}

#[test]
fn round_one_covers_every_player_exactly_once() {
    let mut rng = StdRng::seed_from_u64(7);
    for n in 2..=11 {
        let players: Vec<Player> = (0..n).map(|i| Player::new(format!("P{i}"))).collect();
        let round = generate_pairings_with_rng(&players, 1, &mut rng).unwrap();
        assert!(check_pairings(&players, &round.pairings).is_ok());
        assert_eq!(round.pairings.len(), (n + 1) / 2);
        let byes = round.pairings.iter().filter(|p| p.is_bye()).count();
        assert_eq!(byes, n % 2);
        assert_eq!(round.quality, PairingQuality::Bracketed);
    }
}

#[test]
fn five_players_round_one_bye_is_awarded_immediately() {
    let mut t = tournament_with_players(5);
    start_tournament_with_rng(&mut t, &mut StdRng::seed_from_u64(1)).unwrap();
    let byes: Vec<&Pairing> = t.pairings.iter().filter(|p| p.is_bye()).collect();
    assert_eq!(byes.len(), 1);
    let holder = t.player(byes[0].player1).unwrap();
    assert_eq!(holder.points, 3);
    assert_eq!(holder.games_played, 2);
    assert_eq!(holder.game_wins, 2);
    assert_eq!(holder.matches[0].result, MatchResult::Win);
    assert!(holder.has_had_bye());
}

#[test]
fn top_bracket_pairs_together_and_bye_goes_to_lowest() {
    let mut a = Player::new("A");
    let mut b = Player::new("B");
    let mut c = Player::new("C");
    let mut d = Player::new("D");
    let mut e = Player::new("E");
    a.record_match(Match::bye(1));
    meet(&mut b, &mut c, 1, 2, 0);
    meet(&mut d, &mut e, 1, 1, 1);
    let ids = [a.id, b.id, c.id, d.id, e.id];
    let players = vec![a, b, c, d, e];

    let round = generate_pairings_with_rng(&players, 2, &mut StdRng::seed_from_u64(3)).unwrap();
    assert_eq!(round.quality, PairingQuality::Bracketed);
    assert_eq!(round.bye(), Some(ids[4]));
    assert!(has_pair(&round.pairings, ids[0], ids[1]));
    assert!(has_pair(&round.pairings, ids[2], ids[3]));
    assert_eq!(count_rematches(&players, &round.pairings), 0);
}

#[test]
fn odd_bracket_floats_its_lowest_player_down() {
    let mut players: Vec<Player> = ["A", "B", "C", "D", "E", "F"]
        .iter()
        .map(|n| Player::new(*n))
        .collect();
    let ids: Vec<PlayerId> = players.iter().map(|p| p.id).collect();
    let (top, bottom) = players.split_at_mut(3);
    for i in 0..3 {
        meet(&mut top[i], &mut bottom[i], 1, 2, 0);
    }

    let round = generate_pairings_with_rng(&players, 2, &mut StdRng::seed_from_u64(9)).unwrap();
    assert_eq!(round.quality, PairingQuality::Bracketed);
    assert_eq!(round.bye(), None);
    // A and B stay in the 3-point bracket; C floats into the 0-point bracket.
    assert!(has_pair(&round.pairings, ids[0], ids[1]));
    assert!(has_pair(&round.pairings, ids[2], ids[4]));
    assert!(has_pair(&round.pairings, ids[3], ids[5]));
}

#[test]
fn unavoidable_rematch_falls_back_instead_of_failing() {
    let mut a = Player::new("A");
    let mut b = Player::new("B");
    meet(&mut a, &mut b, 1, 2, 1);
    let players = vec![a, b];
    let round = generate_pairings_with_rng(&players, 2, &mut StdRng::seed_from_u64(0)).unwrap();
    assert_eq!(round.quality, PairingQuality::Rematches(1));
    assert_eq!(round.pairings.len(), 1);
    assert!(check_pairings(&players, &round.pairings).is_ok());
}

#[test]
fn bracket_rematch_is_repaired_across_the_pool() {
    // A and B (3 points) already met, as did C and D (0 points) in a double loss;
    // A-C and B-D are fresh, so a clean round exists outside the brackets.
    let mut a = Player::new("A");
    let mut b = Player::new("B");
    let mut c = Player::new("C");
    let mut d = Player::new("D");
    a.record_match(Match::bye(1));
    b.record_match(Match::bye(2));
    meet(&mut a, &mut b, 3, 1, 1);
    meet(&mut c, &mut d, 3, 1, 0);
    let players = vec![a, b, c, d];

    let round = generate_pairings_with_rng(&players, 4, &mut StdRng::seed_from_u64(5)).unwrap();
    assert_eq!(round.quality, PairingQuality::Repaired);
    assert_eq!(count_rematches(&players, &round.pairings), 0);
    assert!(check_pairings(&players, &round.pairings).is_ok());
}

#[test]
fn no_rematches_while_fresh_pairings_exist() {
    for (n, rounds) in [(4, 3), (8, 4), (6, 2)] {
        let mut rng = StdRng::seed_from_u64(n as u64);
        let mut t = tournament_with_players(n);
        start_tournament_with_rng(&mut t, &mut rng).unwrap();
        for _ in 0..rounds {
            assert_eq!(count_rematches(&t.players, &t.pairings), 0, "round {}", t.current_round);
            assert!(check_pairings(&t.players, &t.pairings).is_ok());
            report_round(&mut t);
            if t.current_round < rounds as u32 {
                generate_next_round_with_rng(&mut t, &mut rng).unwrap();
            }
        }
    }
}

#[test]
fn nobody_gets_a_second_bye_while_others_have_none() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut t = tournament_with_players(5);
    start_tournament_with_rng(&mut t, &mut rng).unwrap();
    let mut holders = HashSet::new();
    for round in 1..=5u32 {
        let pairing = t.pairings.iter().find(|p| p.is_bye()).copied().unwrap();
        assert!(holders.insert(pairing.player1), "second bye in round {}", round);
        report_round(&mut t);
        if round < 5 {
            generate_next_round_with_rng(&mut t, &mut rng).unwrap();
        }
    }
    assert_eq!(holders.len(), 5);
    assert!(t.players.iter().all(|p| p.has_had_bye()));

    // Everyone has had one now; the sixth round still gets a bye.
    generate_next_round_with_rng(&mut t, &mut rng).unwrap();
    assert_eq!(t.pairings.iter().filter(|p| p.is_bye()).count(), 1);
    assert!(check_pairings(&t.players, &t.pairings).is_ok());
}
