//! Player and StandingsPlayer data structures.

use crate::models::game::{Match, MatchResult, Opponent};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a player (used in pairings and lookups).
pub type PlayerId = Uuid;

/// A registered player and everything they have played so far.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub points: u32,
    /// One entry per round played, in play order.
    pub matches: Vec<Match>,
    /// Everyone faced so far, byes included. May repeat after a forced rematch.
    pub opponent_ids: Vec<Opponent>,
    pub game_wins: u32,
    pub games_played: u32,
}

impl Player {
    /// Create a new player with the given name. Other fields start at zero/empty.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            points: 0,
            matches: Vec::new(),
            opponent_ids: Vec::new(),
            game_wins: 0,
            games_played: 0,
        }
    }

    pub fn has_played(&self, other: PlayerId) -> bool {
        self.opponent_ids.contains(&Opponent::Player(other))
    }

    pub fn has_had_bye(&self) -> bool {
        self.opponent_ids.contains(&Opponent::Bye)
    }

    pub fn match_in_round(&self, round: u32) -> Option<&Match> {
        self.matches.iter().find(|m| m.round == round)
    }

    /// Append a match and fold it into the running totals.
    pub fn record_match(&mut self, m: Match) {
        self.points += m.result.points();
        self.game_wins += m.games_won;
        self.games_played += m.games_played();
        self.opponent_ids.push(m.opponent);
        self.matches.push(m);
    }

    /// Remove this player's match for `round` and roll its totals back.
    /// Returns the removed match, if there was one.
    pub fn unrecord_round(&mut self, round: u32) -> Option<Match> {
        let idx = self.matches.iter().position(|m| m.round == round)?;
        let m = self.matches.remove(idx);
        self.points = self.points.saturating_sub(m.result.points());
        self.game_wins = self.game_wins.saturating_sub(m.games_won);
        self.games_played = self.games_played.saturating_sub(m.games_played());
        if let Some(pos) = self.opponent_ids.iter().rposition(|o| *o == m.opponent) {
            self.opponent_ids.remove(pos);
        }
        Some(m)
    }

    /// Game-win rate; 0 before any game is played.
    pub fn gw_percentage(&self) -> f64 {
        if self.games_played == 0 {
            0.0
        } else {
            f64::from(self.game_wins) / f64::from(self.games_played)
        }
    }

    /// Match-win rate over real matches only (byes excluded).
    pub fn match_win_rate(&self) -> f64 {
        let (wins, played) = self
            .matches
            .iter()
            .filter(|m| !m.opponent.is_bye())
            .fold((0u32, 0u32), |(w, n), m| {
                (w + u32::from(m.result == MatchResult::Win), n + 1)
            });
        if played == 0 {
            0.0
        } else {
            f64::from(wins) / f64::from(played)
        }
    }
}

/// A player with the tiebreaker statistics derived from the whole roster.
/// Always recomputed; never stored as authoritative state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StandingsPlayer {
    #[serde(flatten)]
    pub player: Player,
    pub omw_percentage: f64,
    pub gw_percentage: f64,
    pub ogw_percentage: f64,
}

impl StandingsPlayer {
    /// Wins, losses, draws across all matches (byes count as wins).
    pub fn record(&self) -> (u32, u32, u32) {
        self.player
            .matches
            .iter()
            .fold((0, 0, 0), |(w, l, d), m| match m.result {
                MatchResult::Win => (w + 1, l, d),
                MatchResult::Loss => (w, l + 1, d),
                MatchResult::Draw => (w, l, d + 1),
            })
    }
}

impl std::ops::Deref for StandingsPlayer {
    type Target = Player;

    fn deref(&self) -> &Player {
        &self.player
    }
}
