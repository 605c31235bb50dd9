//! Saving and loading tournament state: key/value stores, the state adapter, import/export.

mod state;
mod store;

pub use state::{export_state, import_state, StateStore, TOURNAMENT_STORAGE_KEY};
pub use store::{FileStore, KeyValueStore, MemoryStore};

/// Errors from the persistence layer. Never raised by the tournament logic itself.
#[derive(Debug)]
pub enum PersistenceError {
    Io(std::io::Error),
    Serialization(serde_json::Error),
    /// Decoded JSON is not a tournament (missing roster, status, or history).
    InvalidState(String),
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersistenceError::Io(e) => write!(f, "Storage error: {}", e),
            PersistenceError::Serialization(e) => write!(f, "Malformed tournament data: {}", e),
            PersistenceError::InvalidState(reason) => write!(f, "Not a tournament: {}", reason),
        }
    }
}

impl std::error::Error for PersistenceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PersistenceError::Io(e) => Some(e),
            PersistenceError::Serialization(e) => Some(e),
            PersistenceError::InvalidState(_) => None,
        }
    }
}

impl From<std::io::Error> for PersistenceError {
    fn from(e: std::io::Error) -> Self {
        PersistenceError::Io(e)
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(e: serde_json::Error) -> Self {
        PersistenceError::Serialization(e)
    }
}
