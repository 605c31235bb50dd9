//! Tournament state adapter over a key/value store, plus import/export.

use crate::models::Tournament;
use crate::persistence::{KeyValueStore, PersistenceError};

/// Key the live tournament is saved under.
pub const TOURNAMENT_STORAGE_KEY: &str = "swiss-tournament-state";

/// Loads and saves the whole tournament as one JSON blob.
#[derive(Debug)]
pub struct StateStore<S> {
    store: S,
}

impl<S: KeyValueStore> StateStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn inner(&self) -> &S {
        &self.store
    }

    /// The saved tournament, or None when nothing usable is stored.
    /// Unreadable or corrupt data is logged and treated as absent.
    pub fn load(&self) -> Option<Tournament> {
        let raw = match self.store.get(TOURNAMENT_STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("Failed to read saved tournament: {}", e);
                return None;
            }
        };
        match import_state(&raw) {
            Ok(t) => Some(t),
            Err(e) => {
                log::warn!("Discarding saved tournament: {}", e);
                None
            }
        }
    }

    pub fn save(&self, tournament: &Tournament) -> Result<(), PersistenceError> {
        let json = serde_json::to_string(tournament)?;
        self.store.set(TOURNAMENT_STORAGE_KEY, &json)
    }

    pub fn clear(&self) -> Result<(), PersistenceError> {
        self.store.remove(TOURNAMENT_STORAGE_KEY)
    }
}

/// Full-fidelity, human-readable dump of the tournament.
pub fn export_state(tournament: &Tournament) -> Result<String, PersistenceError> {
    Ok(serde_json::to_string_pretty(tournament)?)
}

/// Decode an exported tournament.
///
/// The JSON must be an object with `players`, `status` and `history`; anything
/// else is rejected before decoding. The caller keeps its live state on error.
pub fn import_state(text: &str) -> Result<Tournament, PersistenceError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    let obj = value
        .as_object()
        .ok_or_else(|| PersistenceError::InvalidState("expected a JSON object".to_string()))?;
    for key in ["players", "status", "history"] {
        if !obj.contains_key(key) {
            return Err(PersistenceError::InvalidState(format!("missing `{}`", key)));
        }
    }
    Ok(serde_json::from_str(text)?)
}
