//! Tournament, TournamentStatus, and round history.

use crate::logic::calculate_standings;
use crate::models::game::Pairing;
use crate::models::player::{Player, PlayerId, StandingsPlayer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Errors that can occur during tournament operations.
///
/// Every operation that returns one of these leaves the tournament untouched.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TournamentError {
    /// Tournament is not in a state that allows this action.
    InvalidState,
    /// Need at least 2 players to start.
    NotEnoughPlayers,
    /// Player not found in the roster.
    PlayerNotFound(PlayerId),
    /// A player with this name already exists (names are unique, case-insensitive).
    DuplicatePlayerName,
    /// Player name is empty after trimming.
    EmptyPlayerName,
    /// Round is not the current round or one already played.
    InvalidRound(u32),
    /// Reported games are not a possible best-of-three score.
    InvalidScore { p1_games: u32, p2_games: u32 },
    /// A player cannot be paired against themselves.
    SamePlayer(PlayerId),
    /// The two players did not meet in that round.
    NotPaired { round: u32 },
    /// Not every match of the current round has a result.
    IncompleteResults,
    /// A manual pairing set does not cover the roster exactly once.
    InvalidPairings(String),
    /// The round already has reported results, so its pairings are fixed.
    ResultsAlreadyRecorded,
    /// The pairing engine left a player out. This is a bug, not a user error.
    IncompletePairing(PlayerId),
}

impl std::fmt::Display for TournamentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TournamentError::InvalidState => write!(f, "Invalid state for this action"),
            TournamentError::NotEnoughPlayers => write!(f, "Need at least 2 players to start"),
            TournamentError::PlayerNotFound(_) => write!(f, "Player not found"),
            TournamentError::DuplicatePlayerName => {
                write!(f, "A player with this name already exists")
            }
            TournamentError::EmptyPlayerName => write!(f, "Player name must not be empty"),
            TournamentError::InvalidRound(round) => write!(f, "Round {} cannot be edited", round),
            TournamentError::InvalidScore { p1_games, p2_games } => {
                write!(f, "{}-{} is not a valid best-of-three score", p1_games, p2_games)
            }
            TournamentError::SamePlayer(_) => write!(f, "A player cannot play against themselves"),
            TournamentError::NotPaired { round } => {
                write!(f, "These players were not paired in round {}", round)
            }
            TournamentError::IncompleteResults => write!(f, "Not all matches have a result"),
            TournamentError::InvalidPairings(reason) => write!(f, "Invalid pairings: {}", reason),
            TournamentError::ResultsAlreadyRecorded => {
                write!(f, "Results were already reported for this round")
            }
            TournamentError::IncompletePairing(id) => {
                write!(f, "Pairing engine left player {} unpaired", id)
            }
        }
    }
}

impl std::error::Error for TournamentError {}

/// Current phase of the tournament.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    /// Adding and removing players; no round generated yet.
    #[default]
    Registration,
    /// Rounds are being paired and reported.
    Running,
    /// Closed by the organizer; read-only.
    Finished,
}

/// Snapshot of one round: its pairings and the whole roster as it stood.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct RoundHistory {
    pub pairings: Vec<Pairing>,
    pub players: Vec<Player>,
}

/// Full tournament state: roster, current round, history, and phase.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    /// Roster in registration order.
    pub players: Vec<Player>,
    /// 0 until the tournament starts.
    pub current_round: u32,
    /// Current round's pairings.
    pub pairings: Vec<Pairing>,
    pub status: TournamentStatus,
    pub history: BTreeMap<u32, RoundHistory>,
    /// Round being looked at in the UI. Never affects computation.
    #[serde(default)]
    pub viewing_round: Option<u32>,
}

impl Tournament {
    /// Create a new tournament in Registration with no players.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    /// Register a player (Registration only). Names must be unique (case-insensitive).
    pub fn add_player(&mut self, name: impl Into<String>) -> Result<PlayerId, TournamentError> {
        if self.status != TournamentStatus::Registration {
            return Err(TournamentError::InvalidState);
        }
        let name = name.into();
        let name_trimmed = name.trim();
        if name_trimmed.is_empty() {
            return Err(TournamentError::EmptyPlayerName);
        }
        let is_duplicate = self
            .players
            .iter()
            .any(|p| p.name.eq_ignore_ascii_case(name_trimmed));
        if is_duplicate {
            return Err(TournamentError::DuplicatePlayerName);
        }
        let player = Player::new(name_trimmed);
        let id = player.id;
        self.players.push(player);
        Ok(id)
    }

    /// Remove a player by id (only valid in Registration).
    pub fn remove_player(&mut self, player_id: PlayerId) -> Result<(), TournamentError> {
        if self.status != TournamentStatus::Registration {
            return Err(TournamentError::InvalidState);
        }
        let idx = self
            .players
            .iter()
            .position(|p| p.id == player_id)
            .ok_or(TournamentError::PlayerNotFound(player_id))?;
        self.players.remove(idx);
        Ok(())
    }

    /// Live roster ranked with tiebreakers.
    pub fn standings(&self) -> Vec<StandingsPlayer> {
        calculate_standings(&self.players)
    }

    /// Snapshot of a past (or the current) round.
    pub fn round_view(&self, round: u32) -> Option<&RoundHistory> {
        self.history.get(&round)
    }

    /// What the UI should show: the viewed round's snapshot, or live state.
    pub fn displayed_round(&self) -> (&[Pairing], &[Player]) {
        match self.viewing_round.and_then(|r| self.history.get(&r)) {
            Some(h) => (&h.pairings, &h.players),
            None => (&self.pairings, &self.players),
        }
    }

    /// True when every non-bye pairing of the current round has a reported result.
    pub fn round_complete(&self) -> bool {
        let round = self.current_round;
        self.pairings.iter().filter(|p| !p.is_bye()).all(|p| {
            self.player(p.player1)
                .is_some_and(|pl| pl.match_in_round(round).is_some())
        })
    }
}
