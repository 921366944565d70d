//! Key-value store backends
//!
//! The store trait is deliberately whole-record: callers read a record,
//! modify it, write it back. `InMemoryStore` is the default;
//! `JsonFileStore` keeps one JSON file per key so the CLI survives restarts.

use crate::MemoryError;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Pluggable whole-record storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, MemoryError>;
    fn put(&self, key: &str, value: String) -> Result<(), MemoryError>;
    fn remove(&self, key: &str) -> Result<(), MemoryError>;
}

/// Default store: a guarded map, gone when the process exits.
#[derive(Default)]
pub struct InMemoryStore {
    records: RwLock<HashMap<String, String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, MemoryError> {
        Ok(self.records.read().get(key).cloned())
    }

    fn put(&self, key: &str, value: String) -> Result<(), MemoryError> {
        self.records.write().insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), MemoryError> {
        self.records.write().remove(key);
        Ok(())
    }
}

/// One JSON file per key under a root directory.
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, MemoryError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Keys are internal identifiers; anything outside the safe set is
        // percent-free escaped with '_'.
        let safe: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.root.join(format!("{safe}.json"))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, MemoryError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn put(&self, key: &str, value: String) -> Result<(), MemoryError> {
        std::fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), MemoryError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
