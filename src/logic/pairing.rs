//! Swiss pairing: bye selection, score brackets, and rematch avoidance.

use crate::logic::standings::calculate_standings;
use crate::models::{Pairing, Player, PlayerId, TournamentError};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{HashMap, HashSet};

/// Upper bound on backtracking steps for one matching search.
const SEARCH_BUDGET: usize = 100_000;

/// How hard the engine had to work to pair a round.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PairingQuality {
    /// Every bracket paired without rematches (floaters included).
    Bracketed,
    /// Brackets could not avoid a rematch, but pairing across the whole pool could.
    Repaired,
    /// No rematch-free pairing was found; this many rematches were allowed.
    Rematches(usize),
}

/// Pairings for one round plus how they were obtained.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoundPairings {
    pub pairings: Vec<Pairing>,
    pub quality: PairingQuality,
}

impl RoundPairings {
    pub fn bye(&self) -> Option<PlayerId> {
        self.pairings.iter().find(|p| p.is_bye()).map(|p| p.player1)
    }
}

/// Why a pairing set does not cover the roster.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PairingDefect {
    Missing(PlayerId),
    Duplicate(PlayerId),
    Unknown(PlayerId),
    SelfPaired(PlayerId),
    /// A bye was given with an even roster, or none with an odd one.
    ByeMismatch,
    MultipleByes,
}

impl PairingDefect {
    pub fn player(&self) -> Option<PlayerId> {
        match self {
            PairingDefect::Missing(id)
            | PairingDefect::Duplicate(id)
            | PairingDefect::Unknown(id)
            | PairingDefect::SelfPaired(id) => Some(*id),
            PairingDefect::ByeMismatch | PairingDefect::MultipleByes => None,
        }
    }
}

impl std::fmt::Display for PairingDefect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PairingDefect::Missing(id) => write!(f, "player {} is not paired", id),
            PairingDefect::Duplicate(id) => write!(f, "player {} is paired more than once", id),
            PairingDefect::Unknown(id) => write!(f, "player {} is not registered", id),
            PairingDefect::SelfPaired(id) => write!(f, "player {} is paired with themselves", id),
            PairingDefect::ByeMismatch => {
                write!(f, "a bye is needed exactly when the player count is odd")
            }
            PairingDefect::MultipleByes => write!(f, "only one bye is allowed per round"),
        }
    }
}

/// Check that every player appears in exactly one pairing and the bye is used correctly.
pub fn check_pairings(players: &[Player], pairings: &[Pairing]) -> Result<(), PairingDefect> {
    let roster: HashSet<PlayerId> = players.iter().map(|p| p.id).collect();
    let mut seen = HashSet::new();
    let mut byes = 0;
    for pairing in pairings {
        if pairing.player2.player_id() == Some(pairing.player1) {
            return Err(PairingDefect::SelfPaired(pairing.player1));
        }
        if pairing.is_bye() {
            byes += 1;
        }
        for id in pairing.player_ids() {
            if !roster.contains(&id) {
                return Err(PairingDefect::Unknown(id));
            }
            if !seen.insert(id) {
                return Err(PairingDefect::Duplicate(id));
            }
        }
    }
    if let Some(missing) = players.iter().find(|p| !seen.contains(&p.id)) {
        return Err(PairingDefect::Missing(missing.id));
    }
    if byes > 1 {
        return Err(PairingDefect::MultipleByes);
    }
    if (byes == 1) != (players.len() % 2 == 1) {
        return Err(PairingDefect::ByeMismatch);
    }
    Ok(())
}

/// Pair a round.
///
/// 1. Rank by standings; round 1 is shuffled since nobody has a score yet.
/// 2. Odd roster: the lowest-ranked player without a bye sits out
///    (the lowest-ranked player overall once everyone has had one).
/// 3. Pair score brackets top-down, floating the odd player down.
/// 4. If a bracket was forced into a rematch, retry across the whole pool,
///    then fall back to the bracket result with rematches allowed.
pub fn generate_pairings_with_rng<R: Rng + ?Sized>(
    players: &[Player],
    round: u32,
    rng: &mut R,
) -> Result<RoundPairings, TournamentError> {
    let standings = calculate_standings(players);
    let mut ranked: Vec<&Player> = standings.iter().map(|s| &s.player).collect();
    if round <= 1 {
        ranked.shuffle(rng);
    }

    let bye = if ranked.len() % 2 == 1 {
        let idx = select_bye(&ranked);
        Some(ranked.remove(idx).id)
    } else {
        None
    };

    let (pairs, quality) = pair_pool(&ranked);
    let mut pairings: Vec<Pairing> = pairs.into_iter().map(|(a, b)| Pairing::new(a, b)).collect();
    if let Some(id) = bye {
        pairings.push(Pairing::bye(id));
    }

    if let Err(defect) = check_pairings(players, &pairings) {
        log::error!("Round {} pairing is incomplete: {}", round, defect);
        debug_assert!(false, "incomplete pairing: {defect}");
        let id = defect.player().or(bye).unwrap_or_default();
        return Err(TournamentError::IncompletePairing(id));
    }
    Ok(RoundPairings { pairings, quality })
}

/// Index of the player who gets the bye.
fn select_bye(ranked: &[&Player]) -> usize {
    ranked
        .iter()
        .rposition(|p| !p.has_had_bye())
        .unwrap_or(ranked.len() - 1)
}

/// Pair an even-sized, rank-ordered pool.
fn pair_pool(ranked: &[&Player]) -> (Vec<(PlayerId, PlayerId)>, PairingQuality) {
    let mut pairs = Vec::new();
    let mut rematches = 0;
    let mut floaters: Vec<&Player> = Vec::new();
    for group in ranked.chunk_by(|a, b| a.points == b.points) {
        let mut bracket = std::mem::take(&mut floaters);
        bracket.extend_from_slice(group);
        let outcome = pair_bracket(&bracket);
        pairs.extend(outcome.pairs);
        rematches += outcome.rematches;
        floaters.extend(outcome.floater);
    }
    debug_assert!(floaters.is_empty(), "even pool left a floater");

    if rematches == 0 {
        return (pairs, PairingQuality::Bracketed);
    }
    let mut budget = SEARCH_BUDGET;
    if let Some(global) = search_without_rematch(ranked, Preference::Nearest, &mut budget) {
        return (global, PairingQuality::Repaired);
    }
    (pairs, PairingQuality::Rematches(rematches))
}

struct BracketOutcome<'a> {
    pairs: Vec<(PlayerId, PlayerId)>,
    floater: Option<&'a Player>,
    rematches: usize,
}

/// Pair one score bracket. An odd bracket floats its lowest-ranked player
/// that still lets the rest pair cleanly.
fn pair_bracket<'a>(bracket: &[&'a Player]) -> BracketOutcome<'a> {
    let mut budget = SEARCH_BUDGET;
    if bracket.len() % 2 == 1 {
        for idx in (0..bracket.len()).rev() {
            let rest = without(bracket, idx);
            if let Some(pairs) = search_without_rematch(&rest, Preference::Fold, &mut budget) {
                return BracketOutcome {
                    pairs,
                    floater: Some(bracket[idx]),
                    rematches: 0,
                };
            }
        }
        let last = bracket.len() - 1;
        let (pairs, rematches) = pair_allowing_rematches(&without(bracket, last));
        return BracketOutcome {
            pairs,
            floater: Some(bracket[last]),
            rematches,
        };
    }

    match search_without_rematch(bracket, Preference::Fold, &mut budget) {
        Some(pairs) => BracketOutcome {
            pairs,
            floater: None,
            rematches: 0,
        },
        None => {
            let (pairs, rematches) = pair_allowing_rematches(bracket);
            BracketOutcome {
                pairs,
                floater: None,
                rematches,
            }
        }
    }
}

/// Opponent preference for the top remaining player.
#[derive(Clone, Copy)]
enum Preference {
    /// Top half against bottom half (1 v n/2+1, 2 v n/2+2, ...).
    Fold,
    /// Closest rank first.
    Nearest,
}

impl Preference {
    /// Candidate indices into the `rest` slice (everyone after the top player).
    fn candidates(self, rest: usize) -> Vec<usize> {
        match self {
            Preference::Nearest => (0..rest).collect(),
            Preference::Fold => {
                let mid = (rest + 1) / 2 - 1;
                (mid..rest).chain((0..mid).rev()).collect()
            }
        }
    }
}

/// Backtracking search for a perfect matching with no rematches.
fn search_without_rematch(
    pool: &[&Player],
    preference: Preference,
    budget: &mut usize,
) -> Option<Vec<(PlayerId, PlayerId)>> {
    let mut out = Vec::with_capacity(pool.len() / 2);
    if backtrack(pool, preference, budget, &mut out) {
        Some(out)
    } else {
        None
    }
}

fn backtrack(
    pool: &[&Player],
    preference: Preference,
    budget: &mut usize,
    out: &mut Vec<(PlayerId, PlayerId)>,
) -> bool {
    let Some((top, rest)) = pool.split_first() else {
        return true;
    };
    if rest.is_empty() || *budget == 0 {
        return false;
    }
    *budget -= 1;
    for idx in preference.candidates(rest.len()) {
        let opponent = rest[idx];
        if top.has_played(opponent.id) {
            continue;
        }
        out.push((top.id, opponent.id));
        if backtrack(&without(rest, idx), preference, budget, out) {
            return true;
        }
        out.pop();
    }
    false
}

/// Greedy pairing in fold order that takes a rematch only when nothing else is left.
fn pair_allowing_rematches(pool: &[&Player]) -> (Vec<(PlayerId, PlayerId)>, usize) {
    let mut remaining: Vec<&Player> = pool.to_vec();
    let mut pairs = Vec::new();
    let mut rematches = 0;
    while remaining.len() >= 2 {
        let top = remaining.remove(0);
        let candidates = Preference::Fold.candidates(remaining.len());
        let idx = candidates
            .iter()
            .copied()
            .find(|&i| !top.has_played(remaining[i].id))
            .unwrap_or_else(|| {
                rematches += 1;
                candidates[0]
            });
        let opponent = remaining.remove(idx);
        pairs.push((top.id, opponent.id));
    }
    (pairs, rematches)
}

fn without<'a>(pool: &[&'a Player], idx: usize) -> Vec<&'a Player> {
    pool.iter()
        .enumerate()
        .filter(|(i, _)| *i != idx)
        .map(|(_, p)| *p)
        .collect()
}

/// Count pairings that repeat an earlier match-up.
pub fn count_rematches(players: &[Player], pairings: &[Pairing]) -> usize {
    let by_id: HashMap<PlayerId, &Player> = players.iter().map(|p| (p.id, p)).collect();
    pairings
        .iter()
        .filter(|pairing| match (by_id.get(&pairing.player1), pairing.player2.player_id()) {
            (Some(p1), Some(p2)) => p1.has_played(p2),
            _ => false,
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_prefers_the_matching_bottom_half_seat() {
        // 6 players: top sees 5 others, ideal partner is seat 4 overall (index 2 of rest).
        assert_eq!(Preference::Fold.candidates(5), vec![2, 3, 4, 1, 0]);
        assert_eq!(Preference::Fold.candidates(1), vec![0]);
        assert_eq!(Preference::Fold.candidates(3), vec![1, 2, 0]);
    }

    #[test]
    fn bye_goes_to_lowest_ranked_without_one() {
        let mut players: Vec<Player> = (0..3).map(|i| Player::new(format!("P{i}"))).collect();
        players[2].record_match(crate::models::Match::bye(1));
        let ranked: Vec<&Player> = players.iter().collect();
        assert_eq!(select_bye(&ranked), 1);
    }

    #[test]
    fn bye_falls_back_to_last_when_everyone_had_one() {
        let mut players: Vec<Player> = (0..3).map(|i| Player::new(format!("P{i}"))).collect();
        for p in &mut players {
            p.record_match(crate::models::Match::bye(1));
        }
        let ranked: Vec<&Player> = players.iter().collect();
        assert_eq!(select_bye(&ranked), 2);
    }

    #[test]
    fn greedy_fallback_counts_forced_rematches() {
        let mut a = Player::new("A");
        let mut b = Player::new("B");
        let m = |round, id| crate::models::Match {
            round,
            opponent: crate::models::Opponent::Player(id),
            result: crate::models::MatchResult::Loss,
            games_won: 0,
            games_lost: 0,
            games_drawn: 0,
        };
        a.record_match(m(1, b.id));
        b.record_match(m(1, a.id));
        let (pairs, rematches) = pair_allowing_rematches(&[&a, &b]);
        assert_eq!(pairs, vec![(a.id, b.id)]);
        assert_eq!(rematches, 1);
    }
}
