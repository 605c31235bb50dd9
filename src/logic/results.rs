//! Match results: scoring, byes, and retroactive edits.

use crate::models::{
    score_games, Match, Opponent, Player, PlayerId, Tournament, TournamentError, TournamentStatus,
    GAMES_TO_WIN,
};

/// Record (or re-record) the result of `p1` vs `p2` in `round`.
///
/// Any result already stored for either player in that round is rolled back
/// first, so repeating a call is harmless. Editing a round before the current
/// one rebuilds the roster from that round's snapshot, drops every later round
/// from history and rewinds `current_round`; later rounds must be paired again.
///
/// Matches are best of three, so each side reports at most 2 game wins and at
/// most 3 games are played in total. Anything else, such as 3-0 or 2-2, is
/// refused with `InvalidScore`.
pub fn record_match_result(
    tournament: &mut Tournament,
    round: u32,
    p1: PlayerId,
    p2: PlayerId,
    p1_games: u32,
    p2_games: u32,
) -> Result<(), TournamentError> {
    if tournament.status != TournamentStatus::Running {
        return Err(TournamentError::InvalidState);
    }
    if round == 0 || round > tournament.current_round {
        return Err(TournamentError::InvalidRound(round));
    }
    if p1 == p2 {
        return Err(TournamentError::SamePlayer(p1));
    }
    if p1_games > GAMES_TO_WIN
        || p2_games > GAMES_TO_WIN
        || p1_games + p2_games > 2 * GAMES_TO_WIN - 1
    {
        return Err(TournamentError::InvalidScore { p1_games, p2_games });
    }

    let is_edit = round < tournament.current_round;
    let snapshot = tournament.history.get(&round);
    let pairings = match snapshot {
        Some(h) if is_edit => &h.pairings,
        None if is_edit => return Err(TournamentError::InvalidRound(round)),
        _ => &tournament.pairings,
    };
    if !pairings.iter().any(|p| p.involves(p1) && p.involves(p2)) {
        return Err(TournamentError::NotPaired { round });
    }

    let mut next = tournament.clone();
    let mut roster = match (is_edit, snapshot) {
        (true, Some(h)) => h.players.clone(),
        _ => std::mem::take(&mut next.players),
    };
    for id in [p1, p2] {
        if !roster.iter().any(|p| p.id == id) {
            return Err(TournamentError::PlayerNotFound(id));
        }
    }

    reverse_round_match(&mut roster, round, p1);
    reverse_round_match(&mut roster, round, p2);

    let (p1_result, p2_result) = score_games(p1_games, p2_games);
    for (id, opponent, result, won, lost) in [
        (p1, p2, p1_result, p1_games, p2_games),
        (p2, p1, p2_result, p2_games, p1_games),
    ] {
        if let Some(player) = roster.iter_mut().find(|p| p.id == id) {
            player.record_match(Match {
                round,
                opponent: Opponent::Player(opponent),
                result,
                games_won: won,
                games_lost: lost,
                games_drawn: 0,
            });
        }
    }

    if is_edit {
        let discarded = next.history.split_off(&(round + 1));
        if let Some(h) = next.history.get_mut(&round) {
            h.players = roster.clone();
            next.pairings = h.pairings.clone();
        }
        next.current_round = round;
        if next.viewing_round.is_some_and(|r| r >= round) {
            next.viewing_round = None;
        }
        log::info!(
            "Edited round {} result; discarded {} later round(s)",
            round,
            discarded.len()
        );
    }
    next.players = roster;

    *tournament = next;
    Ok(())
}

/// Roll back `id`'s match in `round`, along with the opponent's side of it.
pub(crate) fn reverse_round_match(players: &mut [Player], round: u32, id: PlayerId) {
    let Some(removed) = players
        .iter_mut()
        .find(|p| p.id == id)
        .and_then(|p| p.unrecord_round(round))
    else {
        return;
    };
    if let Opponent::Player(other) = removed.opponent {
        if let Some(o) = players.iter_mut().find(|p| p.id == other) {
            if o.match_in_round(round).map(|m| m.opponent) == Some(Opponent::Player(id)) {
                o.unrecord_round(round);
            }
        }
    }
}

/// Award the round's bye: an automatic 2-0 win worth full match points.
pub(crate) fn apply_bye(
    players: &mut [Player],
    round: u32,
    id: PlayerId,
) -> Result<(), TournamentError> {
    reverse_round_match(players, round, id);
    let player = players
        .iter_mut()
        .find(|p| p.id == id)
        .ok_or(TournamentError::PlayerNotFound(id))?;
    player.record_match(Match::bye(round));
    Ok(())
}
