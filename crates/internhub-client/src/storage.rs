//! Persistent key/value storage for the client session.
//!
//! # Purpose
//! The session service depends on [`SessionStorage`] rather than on any
//! process-wide store, so callers choose where the session lives: in memory
//! for tests and short-lived tools, or in a JSON file for CLIs that should
//! stay signed in across runs.
//!
//! # Key invariants
//! - Values are JSON. The identity lives under [`USER_KEY`] as the
//!   `{id, email, name, role, department?}` object and the bearer token under
//!   [`SESSION_TOKEN_KEY`] as a string.
//! - `FileSessionStorage` replaces the file atomically (write then rename).
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

pub const USER_KEY: &str = "user";
pub const SESSION_TOKEN_KEY: &str = "session_token";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io: {0}")]
    Io(#[from] io::Error),
    #[error("stored session is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("storage lock poisoned")]
    Poisoned,
}

pub trait SessionStorage: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<Value>, StorageError>;
    fn store(&self, key: &str, value: Value) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<S: SessionStorage + ?Sized> SessionStorage for std::sync::Arc<S> {
    fn load(&self, key: &str) -> Result<Option<Value>, StorageError> {
        (**self).load(key)
    }

    fn store(&self, key: &str, value: Value) -> Result<(), StorageError> {
        (**self).store(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    entries: Mutex<HashMap<String, Value>>,
}

impl SessionStorage for MemorySessionStorage {
    fn load(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn store(&self, key: &str, value: Value) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}

/// One JSON object per file, keyed by storage key.
#[derive(Debug)]
pub struct FileSessionStorage {
    path: PathBuf,
    guard: Mutex<()>,
}

impl FileSessionStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<Map<String, Value>, StorageError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(err) => return Err(err.into()),
        };
        if contents.trim().is_empty() {
            return Ok(Map::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    fn write_map(&self, map: &Map<String, Value>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(map)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl SessionStorage for FileSessionStorage {
    fn load(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let _guard = self.guard.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(self.read_map()?.remove(key))
    }

    fn store(&self, key: &str, value: Value) -> Result<(), StorageError> {
        let _guard = self.guard.lock().map_err(|_| StorageError::Poisoned)?;
        let mut map = self.read_map()?;
        map.insert(key.to_string(), value);
        self.write_map(&map)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.guard.lock().map_err(|_| StorageError::Poisoned)?;
        // An unreadable file is replaced rather than left in place.
        let mut map = self.read_map().unwrap_or_default();
        map.remove(key);
        self.write_map(&map)
    }
}
