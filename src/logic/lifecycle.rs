//! Tournament lifecycle: start, next round, manual pairings, navigation, reset.
//!
//! Each transition works on a copy of the tournament and swaps it in only on
//! success, so a refused operation leaves the state exactly as it was.

use crate::logic::pairing::{check_pairings, generate_pairings_with_rng, PairingQuality};
use crate::logic::results::{apply_bye, reverse_round_match};
use crate::models::{
    Opponent, Pairing, PlayerId, RoundHistory, Tournament, TournamentError, TournamentStatus,
};
use rand::Rng;

/// Minimum roster size to start.
pub const MIN_PLAYERS: usize = 2;

/// Start the tournament with engine-generated round 1 pairings.
pub fn start_tournament(tournament: &mut Tournament) -> Result<(), TournamentError> {
    start_tournament_with_rng(tournament, &mut rand::thread_rng())
}

pub fn start_tournament_with_rng<R: Rng + ?Sized>(
    tournament: &mut Tournament,
    rng: &mut R,
) -> Result<(), TournamentError> {
    ensure_can_start(tournament)?;
    let round = generate_pairings_with_rng(&tournament.players, 1, rng)?;
    log_quality(1, round.quality);

    let mut next = tournament.clone();
    begin_round(&mut next, 1, round.pairings)?;
    next.status = TournamentStatus::Running;
    log::info!("Tournament started with {} players", next.players.len());
    *tournament = next;
    Ok(())
}

/// Start the tournament with organizer-supplied round 1 pairings.
pub fn start_tournament_with_pairings(
    tournament: &mut Tournament,
    pairings: Vec<Pairing>,
) -> Result<(), TournamentError> {
    ensure_can_start(tournament)?;
    check_pairings(&tournament.players, &pairings)
        .map_err(|defect| TournamentError::InvalidPairings(defect.to_string()))?;

    let mut next = tournament.clone();
    begin_round(&mut next, 1, pairings)?;
    next.status = TournamentStatus::Running;
    log::info!(
        "Tournament started with {} players (manual pairings)",
        next.players.len()
    );
    *tournament = next;
    Ok(())
}

fn ensure_can_start(tournament: &Tournament) -> Result<(), TournamentError> {
    if tournament.status != TournamentStatus::Registration {
        return Err(TournamentError::InvalidState);
    }
    if tournament.players.len() < MIN_PLAYERS {
        return Err(TournamentError::NotEnoughPlayers);
    }
    Ok(())
}

/// Close the current round and pair the next one.
///
/// Every non-bye match of the current round must have a result.
pub fn generate_next_round(tournament: &mut Tournament) -> Result<(), TournamentError> {
    generate_next_round_with_rng(tournament, &mut rand::thread_rng())
}

pub fn generate_next_round_with_rng<R: Rng + ?Sized>(
    tournament: &mut Tournament,
    rng: &mut R,
) -> Result<(), TournamentError> {
    if tournament.status != TournamentStatus::Running {
        return Err(TournamentError::InvalidState);
    }
    if !tournament.round_complete() {
        return Err(TournamentError::IncompleteResults);
    }

    let round = tournament.current_round + 1;
    let generated = generate_pairings_with_rng(&tournament.players, round, rng)?;
    log_quality(round, generated.quality);

    let mut next = tournament.clone();
    next.history.insert(
        next.current_round,
        RoundHistory {
            pairings: next.pairings.clone(),
            players: next.players.clone(),
        },
    );
    begin_round(&mut next, round, generated.pairings)?;
    log::info!("Round {} paired", round);
    *tournament = next;
    Ok(())
}

/// Install a round's pairings, award its bye, and snapshot it.
fn begin_round(
    tournament: &mut Tournament,
    round: u32,
    pairings: Vec<Pairing>,
) -> Result<(), TournamentError> {
    if let Some(bye) = pairings.iter().find(|p| p.is_bye()) {
        apply_bye(&mut tournament.players, round, bye.player1)?;
    }
    tournament.current_round = round;
    tournament.pairings = pairings;
    tournament.viewing_round = None;
    tournament.history.insert(
        round,
        RoundHistory {
            pairings: tournament.pairings.clone(),
            players: tournament.players.clone(),
        },
    );
    Ok(())
}

/// Replace the current round's pairings wholesale.
///
/// Moving the bye reverses the old holder's automatic win and awards the new
/// one. Refused once any real match of the round has been reported.
pub fn update_pairings(
    tournament: &mut Tournament,
    pairings: Vec<Pairing>,
) -> Result<(), TournamentError> {
    if tournament.status != TournamentStatus::Running {
        return Err(TournamentError::InvalidState);
    }
    check_pairings(&tournament.players, &pairings)
        .map_err(|defect| TournamentError::InvalidPairings(defect.to_string()))?;
    let round = tournament.current_round;
    let reported = tournament.players.iter().any(|p| {
        p.match_in_round(round)
            .is_some_and(|m| m.opponent != Opponent::Bye)
    });
    if reported {
        return Err(TournamentError::ResultsAlreadyRecorded);
    }

    let old_bye = bye_holder(&tournament.pairings);
    let new_bye = bye_holder(&pairings);

    let mut next = tournament.clone();
    if old_bye != new_bye {
        if let Some(id) = old_bye {
            reverse_round_match(&mut next.players, round, id);
        }
        if let Some(id) = new_bye {
            apply_bye(&mut next.players, round, id)?;
        }
        log::info!("Round {} bye moved", round);
    }
    next.pairings = pairings;
    next.history.insert(
        round,
        RoundHistory {
            pairings: next.pairings.clone(),
            players: next.players.clone(),
        },
    );
    *tournament = next;
    Ok(())
}

fn bye_holder(pairings: &[Pairing]) -> Option<PlayerId> {
    pairings.iter().find(|p| p.is_bye()).map(|p| p.player1)
}

/// Point the UI at a past round (or back at live state with `None`).
/// Never touches players, pairings, or round counters.
pub fn view_round(tournament: &mut Tournament, round: Option<u32>) -> Result<(), TournamentError> {
    if let Some(r) = round {
        if !tournament.history.contains_key(&r) {
            return Err(TournamentError::InvalidRound(r));
        }
    }
    tournament.viewing_round = round;
    Ok(())
}

/// Close a running tournament. Standings stay available.
pub fn finish_tournament(tournament: &mut Tournament) -> Result<(), TournamentError> {
    if tournament.status != TournamentStatus::Running {
        return Err(TournamentError::InvalidState);
    }
    tournament.status = TournamentStatus::Finished;
    log::info!("Tournament finished after {} round(s)", tournament.current_round);
    Ok(())
}

/// Throw everything away, from any state.
pub fn reset_tournament(tournament: &mut Tournament) {
    *tournament = Tournament::new();
    log::info!("Tournament reset");
}

fn log_quality(round: u32, quality: PairingQuality) {
    match quality {
        PairingQuality::Bracketed => log::debug!("Round {} paired within score brackets", round),
        PairingQuality::Repaired => {
            log::info!("Round {} paired across brackets to avoid rematches", round)
        }
        PairingQuality::Rematches(n) => {
            log::warn!("Round {} could not avoid rematches; {} rematch(es) paired", round, n)
        }
    }
}
