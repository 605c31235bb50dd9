//! Match records, opponents, and round pairings.

use crate::models::player::PlayerId;
use serde::{Deserialize, Serialize};

/// Points awarded for a match win (and for a bye).
pub const WIN_POINTS: u32 = 3;

/// Games a player must win to take a best-of-three match.
pub const GAMES_TO_WIN: u32 = 2;

/// Who a player faced in a round: another registered player, or nobody.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Opponent {
    Player(PlayerId),
    Bye,
}

impl Opponent {
    pub fn is_bye(&self) -> bool {
        matches!(self, Opponent::Bye)
    }

    /// The opponent's id, or None for a bye.
    pub fn player_id(&self) -> Option<PlayerId> {
        match self {
            Opponent::Player(id) => Some(*id),
            Opponent::Bye => None,
        }
    }
}

impl From<PlayerId> for Opponent {
    fn from(id: PlayerId) -> Self {
        Opponent::Player(id)
    }
}

/// Outcome of a match from one player's point of view.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchResult {
    Win,
    Loss,
    Draw,
}

impl MatchResult {
    /// Match points credited for this result. Only wins score.
    pub fn points(self) -> u32 {
        match self {
            MatchResult::Win => WIN_POINTS,
            MatchResult::Loss | MatchResult::Draw => 0,
        }
    }
}

/// One player's record of a single round.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub round: u32,
    pub opponent: Opponent,
    pub result: MatchResult,
    pub games_won: u32,
    pub games_lost: u32,
    pub games_drawn: u32,
}

impl Match {
    /// The automatic win recorded for a bye: 2-0 in games.
    pub fn bye(round: u32) -> Self {
        Self {
            round,
            opponent: Opponent::Bye,
            result: MatchResult::Win,
            games_won: GAMES_TO_WIN,
            games_lost: 0,
            games_drawn: 0,
        }
    }

    pub fn games_played(&self) -> u32 {
        self.games_won + self.games_lost + self.games_drawn
    }
}

/// Scores a best-of-three from the reported games.
///
/// A side that reaches two game wins takes the match; every other split
/// (1-1, 1-0, 0-0) is a loss for both players.
pub fn score_games(p1_games: u32, p2_games: u32) -> (MatchResult, MatchResult) {
    if p1_games >= GAMES_TO_WIN && p1_games > p2_games {
        (MatchResult::Win, MatchResult::Loss)
    } else if p2_games >= GAMES_TO_WIN && p2_games > p1_games {
        (MatchResult::Loss, MatchResult::Win)
    } else {
        (MatchResult::Loss, MatchResult::Loss)
    }
}

/// Two players (or one player and the bye) meeting in a round.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct Pairing {
    pub player1: PlayerId,
    pub player2: Opponent,
}

impl Pairing {
    pub fn new(player1: PlayerId, player2: PlayerId) -> Self {
        Self {
            player1,
            player2: Opponent::Player(player2),
        }
    }

    pub fn bye(player: PlayerId) -> Self {
        Self {
            player1: player,
            player2: Opponent::Bye,
        }
    }

    pub fn is_bye(&self) -> bool {
        self.player2.is_bye()
    }

    /// Whether `id` sits on either side of this pairing.
    pub fn involves(&self, id: PlayerId) -> bool {
        self.player1 == id || self.player2.player_id() == Some(id)
    }

    /// Real players in this pairing (one for a bye, two otherwise).
    pub fn player_ids(&self) -> impl Iterator<Item = PlayerId> {
        std::iter::once(self.player1).chain(self.player2.player_id())
    }
}
