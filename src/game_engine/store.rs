//! Persistence port for sessions.
//!
//! A [`SessionStore`] is a string key/value store in the shape of browser
//! local storage. Sessions write to it after every mutation and read from it
//! once on restore. Writes are best effort: a failed write is logged and the
//! in-memory session carries on.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use crate::game_engine::error::{EngineError, EngineResult};

/// Storage keys used by the caller and player sessions.
pub mod keys {
    pub const SESSION_ID: &str = "uuid";
    pub const DRAWN_NUMBERS: &str = "generatedNumbers";
    pub const WINNERS: &str = "winners";
    pub const CURRENT_TICKET: &str = "currentTicket";
    pub const CLICKED_NUMBERS: &str = "clickedNumbers";
    pub const SAVED_TICKETS: &str = "savedTickets";
}

pub trait SessionStore {
    fn get(&self, key: &str) -> EngineResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> EngineResult<()>;
    fn remove(&mut self, key: &str) -> EngineResult<()>;
}

impl<S: SessionStore + ?Sized> SessionStore for Box<S> {
    fn get(&self, key: &str) -> EngineResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> EngineResult<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> EngineResult<()> {
        (**self).remove(key)
    }
}

/// Read and decode a JSON value. `Ok(None)` when the key is absent.
pub fn read_json<T: DeserializeOwned>(
    store: &(impl SessionStore + ?Sized),
    key: &str,
) -> EngineResult<Option<T>> {
    match store.get(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

pub fn write_json<T: Serialize + ?Sized>(
    store: &mut (impl SessionStore + ?Sized),
    key: &str,
    value: &T,
) -> EngineResult<()> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}

/// Fire-and-forget write: failures are logged, never returned.
pub fn write_json_quietly<T: Serialize + ?Sized>(
    store: &mut (impl SessionStore + ?Sized),
    key: &str,
    value: &T,
) {
    if let Err(e) = write_json(store, key, value) {
        warn!(key, error = %e, "failed to persist session state");
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> EngineResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> EngineResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> EngineResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// File-backed store
// ---------------------------------------------------------------------------

/// One `<key>.json` file per key inside `dir`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStore { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl SessionStore for FileStore {
    fn get(&self, key: &str) -> EngineResult<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> EngineResult<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> EngineResult<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(EngineError::from(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trips_json() {
        let mut store = MemoryStore::new();
        write_json(&mut store, keys::DRAWN_NUMBERS, &vec![7u8, 14, 21]).unwrap();
        let back: Option<Vec<u8>> = read_json(&store, keys::DRAWN_NUMBERS).unwrap();
        assert_eq!(back, Some(vec![7, 14, 21]));

        store.remove(keys::DRAWN_NUMBERS).unwrap();
        let gone: Option<Vec<u8>> = read_json(&store, keys::DRAWN_NUMBERS).unwrap();
        assert_eq!(gone, None);
    }

    #[test]
    fn malformed_json_is_corrupt_state() {
        let mut store = MemoryStore::new();
        store.set(keys::WINNERS, "{not json").unwrap();
        let res: EngineResult<Option<Vec<u8>>> = read_json(&store, keys::WINNERS);
        assert!(matches!(res, Err(EngineError::CorruptPersistedState(_))));
    }

    #[test]
    fn file_store_persists_between_instances() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("session"));
        assert_eq!(store.get(keys::SESSION_ID).unwrap(), None);

        store.set(keys::SESSION_ID, "\"abc\"").unwrap();
        let reopened = FileStore::new(dir.path().join("session"));
        assert_eq!(reopened.get(keys::SESSION_ID).unwrap().as_deref(), Some("\"abc\""));

        store.remove(keys::SESSION_ID).unwrap();
        store.remove(keys::SESSION_ID).unwrap();
        assert_eq!(reopened.get(keys::SESSION_ID).unwrap(), None);
    }

    #[test]
    fn unreadable_path_is_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the key file should be makes the read fail.
        fs::create_dir_all(dir.path().join("uuid.json")).unwrap();
        let store = FileStore::new(dir.path());
        assert!(matches!(
            store.get(keys::SESSION_ID),
            Err(EngineError::PersistenceUnavailable(_))
        ));
    }
}
