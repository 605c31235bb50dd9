//! Swiss tournament organizer: library with models, pairing/standings logic, and persistence.

pub mod export;
pub mod logic;
pub mod models;
pub mod persistence;

pub use export::{export_file_name, standings_to_csv};
pub use logic::{
    calculate_standings, check_pairings, finish_tournament, generate_next_round,
    generate_next_round_with_rng, generate_pairings_with_rng,
    record_match_result, reset_tournament, start_tournament, start_tournament_with_pairings,
    start_tournament_with_rng, update_pairings, view_round, PairingQuality, RoundPairings,
};
pub use models::{
    Match, MatchResult, Opponent, Pairing, Player, PlayerId, RoundHistory, StandingsPlayer,
    Tournament, TournamentError, TournamentStatus,
};
pub use persistence::{
    export_state, import_state, FileStore, KeyValueStore, MemoryStore, PersistenceError,
    StateStore,
};
