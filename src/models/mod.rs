//! Data structures for the Swiss tournament: players, matches, pairings, tournament state.

mod game;
mod player;
mod tournament;

pub use game::{score_games, Match, MatchResult, Opponent, Pairing, GAMES_TO_WIN, WIN_POINTS};
pub use player::{Player, PlayerId, StandingsPlayer};
pub use tournament::{RoundHistory, Tournament, TournamentError, TournamentStatus};
