//! Standings: match points plus OMW%, GW% and OGW% tiebreakers.

use crate::models::{Player, PlayerId, StandingsPlayer};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Lowest match-win rate an opponent contributes to OMW%.
pub const MATCH_WIN_FLOOR: f64 = 0.33;

/// Rank the roster.
///
/// 1. GW% = game wins / games played.
/// 2. OMW% = mean over real opponents of their match-win rate, floored at 0.33.
/// 3. OGW% = mean over real opponents of their GW% (no floor).
/// 4. Sort by points, OMW%, GW%, OGW% (all descending).
///
/// The sort is stable, so players equal on all four keep registration order.
pub fn calculate_standings(players: &[Player]) -> Vec<StandingsPlayer> {
    let by_id: HashMap<PlayerId, &Player> = players.iter().map(|p| (p.id, p)).collect();

    let mut standings: Vec<StandingsPlayer> = players
        .iter()
        .map(|player| {
            let opponents: Vec<&Player> = player
                .opponent_ids
                .iter()
                .filter_map(|o| o.player_id())
                .filter_map(|id| by_id.get(&id).copied())
                .collect();
            StandingsPlayer {
                omw_percentage: mean(
                    opponents
                        .iter()
                        .map(|o| o.match_win_rate().max(MATCH_WIN_FLOOR)),
                ),
                gw_percentage: player.gw_percentage(),
                ogw_percentage: mean(opponents.iter().map(|o| o.gw_percentage())),
                player: player.clone(),
            }
        })
        .collect();

    standings.sort_by(compare_standings);
    standings
}

/// Descending by points, then OMW%, GW%, OGW%.
pub fn compare_standings(a: &StandingsPlayer, b: &StandingsPlayer) -> Ordering {
    b.player
        .points
        .cmp(&a.player.points)
        .then_with(|| b.omw_percentage.total_cmp(&a.omw_percentage))
        .then_with(|| b.gw_percentage.total_cmp(&a.gw_percentage))
        .then_with(|| b.ogw_percentage.total_cmp(&a.ogw_percentage))
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0u32), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / f64::from(n)
    }
}
