//! Tournament business logic: standings, pairing, results, lifecycle.

mod lifecycle;
mod pairing;
mod results;
mod standings;

pub use lifecycle::{
    finish_tournament, generate_next_round, generate_next_round_with_rng, reset_tournament,
    start_tournament, start_tournament_with_pairings, start_tournament_with_rng, update_pairings,
    view_round, MIN_PLAYERS,
};
pub use pairing::{
    check_pairings, count_rematches, generate_pairings_with_rng, PairingDefect, PairingQuality,
    RoundPairings,
};
pub use results::record_match_result;
pub use standings::{calculate_standings, compare_standings, MATCH_WIN_FLOOR};
